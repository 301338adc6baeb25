//! Network-first executor for same-origin requests.
//!
//! Chain: fetch -> on 200 store a clone into the dynamic generation ->
//! return the network response; on transport failure -> store-agnostic
//! match -> stored root document (navigation) / SVG placeholder (image) /
//! generic 503.

use std::sync::Arc;

use async_trait::async_trait;
use brolly_client::Network;
use brolly_core::store::key::compute_cache_key;
use brolly_core::{RequestDescriptor, ResponseRecord, StoreDb};

use crate::fallback::{self, FallbackKind};
use crate::strategy::RequestHandler;

pub struct NetworkFirst {
    store: StoreDb,
    network: Arc<dyn Network>,
    dynamic_store: String,
    /// URL of the precached root document, served to offline navigations.
    offline_url: String,
}

impl NetworkFirst {
    pub fn new(store: StoreDb, network: Arc<dyn Network>, dynamic_store: String, offline_url: String) -> Self {
        Self { store, network, dynamic_store, offline_url }
    }

    async fn serve_fallback(&self, request: &RequestDescriptor) -> ResponseRecord {
        if request.is_navigation {
            let key = compute_cache_key("GET", &self.offline_url);
            match self.store.match_any(&key).await {
                Ok(Some(root_document)) => return root_document,
                Ok(None) => tracing::warn!("root document {} was never precached", self.offline_url),
                Err(e) => tracing::warn!("store lookup for root document failed: {e}"),
            }
        } else if request.accepts("image") {
            return fallback::synthesize(FallbackKind::Image);
        }
        fallback::synthesize(FallbackKind::Generic { status: 503 })
    }
}

#[async_trait]
impl RequestHandler for NetworkFirst {
    async fn handle(&self, request: &RequestDescriptor) -> ResponseRecord {
        match self.network.fetch(request).await {
            Ok(response) => {
                // Only plain 200s are cached; a non-200 still reaches the
                // caller as-is.
                if response.is_ok()
                    && let Err(e) = self.store.put_response(&self.dynamic_store, request, &response).await
                {
                    tracing::warn!("failed to cache {}: {e}", request.url);
                }
                response
            }
            Err(e) => {
                tracing::debug!("network-first fetch of {} failed ({e}), trying store", request.url);
                match self.store.match_any(&request.cache_key()).await {
                    Ok(Some(stored)) => stored,
                    Ok(None) => self.serve_fallback(request).await,
                    Err(e) => {
                        // Store unavailability degrades to a miss.
                        tracing::warn!("store lookup for {} failed: {e}", request.url);
                        self.serve_fallback(request).await
                    }
                }
            }
        }
    }
}
