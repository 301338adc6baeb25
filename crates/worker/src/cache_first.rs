//! Cache-first executor for cross-origin requests.
//!
//! Chain: store-agnostic match -> on hit return immediately (freshness is
//! never checked) -> on miss fetch -> on 200 store a clone into the
//! dynamic generation -> on transport failure synthesize a substitute
//! matching the host class (font, script, generic).

use std::sync::Arc;

use async_trait::async_trait;
use brolly_client::Network;
use brolly_core::{RequestDescriptor, ResponseRecord, StoreDb};

use crate::fallback::{self, FallbackKind};
use crate::strategy::RequestHandler;

pub struct CacheFirst {
    store: StoreDb,
    network: Arc<dyn Network>,
    dynamic_store: String,
    font_patterns: Vec<String>,
    script_patterns: Vec<String>,
}

impl CacheFirst {
    pub fn new(
        store: StoreDb, network: Arc<dyn Network>, dynamic_store: String, font_patterns: Vec<String>,
        script_patterns: Vec<String>,
    ) -> Self {
        Self { store, network, dynamic_store, font_patterns, script_patterns }
    }

    fn offline_fallback(&self, request: &RequestDescriptor) -> ResponseRecord {
        let url = request.url.as_str();
        if self.font_patterns.iter().any(|p| url.contains(p.as_str())) {
            return fallback::synthesize(FallbackKind::Stylesheet);
        }
        if self.script_patterns.iter().any(|p| url.contains(p.as_str())) {
            return fallback::synthesize(FallbackKind::Script);
        }
        fallback::synthesize(FallbackKind::Generic { status: 408 })
    }
}

#[async_trait]
impl RequestHandler for CacheFirst {
    async fn handle(&self, request: &RequestDescriptor) -> ResponseRecord {
        match self.store.match_any(&request.cache_key()).await {
            Ok(Some(stored)) => return stored,
            Ok(None) => {}
            Err(e) => tracing::warn!("store lookup for {} failed: {e}", request.url),
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok()
                    && let Err(e) = self.store.put_response(&self.dynamic_store, request, &response).await
                {
                    tracing::warn!("failed to cache {}: {e}", request.url);
                }
                response
            }
            Err(e) => {
                tracing::debug!("cache-first fetch of {} failed ({e}), synthesizing", request.url);
                self.offline_fallback(request)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testnet::MockNetwork;
    use url::Url;

    const DYNAMIC: &str = "brolly-dynamic-v1";

    async fn executor() -> (CacheFirst, StoreDb, Arc<MockNetwork>) {
        let store = StoreDb::open_in_memory().await.unwrap();
        let network = Arc::new(MockNetwork::new());
        let executor = CacheFirst::new(
            store.clone(),
            network.clone(),
            DYNAMIC.to_string(),
            vec!["fonts.gstatic.com".to_string(), "fonts.googleapis.com".to_string()],
            vec!["cdnjs.cloudflare.com".to_string()],
        );
        (executor, store, network)
    }

    fn get(url: &str) -> RequestDescriptor {
        RequestDescriptor::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_hit_never_touches_network() {
        let (executor, store, network) = executor().await;
        let request = get("https://cdn.example/lib.js");
        store
            .put_response(DYNAMIC, &request, &ResponseRecord::with_content_type(200, "OK", "text/javascript", "lib"))
            .await
            .unwrap();

        let response = executor.handle(&request).await;
        assert_eq!(response.body.as_ref(), b"lib");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_caches() {
        let (executor, store, network) = executor().await;
        network.ok("https://cdn.example/lib.js", "lib-body");

        let request = get("https://cdn.example/lib.js");
        let response = executor.handle(&request).await;

        assert_eq!(response.status, 200);
        assert_eq!(network.calls(), 1);
        let stored = store.match_in_store(DYNAMIC, &request.cache_key()).await.unwrap().unwrap();
        assert_eq!(stored.body, response.body);

        // second hit is served from the store
        let again = executor.handle(&request).await;
        assert_eq!(again.body.as_ref(), b"lib-body");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_non_200_returned_uncached() {
        let (executor, store, network) = executor().await;
        network.respond(
            "https://cdn.example/gone.js",
            ResponseRecord::with_content_type(410, "Gone", "text/plain", "gone"),
        );

        let request = get("https://cdn.example/gone.js");
        let response = executor.handle(&request).await;

        assert_eq!(response.status, 410);
        assert!(store.match_in_store(DYNAMIC, &request.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_font_host_serves_empty_stylesheet() {
        let (executor, _store, network) = executor().await;
        network.go_offline();

        let response = executor.handle(&get("https://fonts.gstatic.com/s/roboto.woff2")).await;
        assert_eq!(response.content_type(), Some("text/css"));
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_offline_script_host_serves_stub() {
        let (executor, _store, network) = executor().await;
        network.go_offline();

        let response = executor
            .handle(&get("https://cdnjs.cloudflare.com/ajax/libs/lib/1.0/lib.min.js"))
            .await;
        assert_eq!(response.content_type(), Some("application/javascript"));
        assert!(std::str::from_utf8(&response.body).unwrap().contains("console.info"));
    }

    #[tokio::test]
    async fn test_offline_other_host_serves_generic_408() {
        let (executor, _store, network) = executor().await;
        network.go_offline();

        let response = executor.handle(&get("https://images.example/photo.jpg")).await;
        assert_eq!(response.status, 408);
        assert_eq!(response.content_type(), Some("text/plain"));
    }
}
