//! Cache-generation lifecycle.
//!
//! A generation is the versioned pair of stores (static + dynamic) behind
//! one deployable version of cached content. The manager owns the
//! name-to-store bindings: it creates the current generation's stores at
//! install, pre-populates the static one, and garbage-collects every other
//! store at activate.

use std::sync::Arc;

use brolly_client::Network;
use brolly_core::{Error, GenerationNames, RequestDescriptor, StoreDb};
use url::Url;

/// Lifecycle state of the generation this manager owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Uninstalled,
    /// Installed but not yet authoritative; an older generation may still
    /// be serving.
    Installed,
    Active,
}

pub struct GenerationManager {
    store: StoreDb,
    network: Arc<dyn Network>,
    names: GenerationNames,
    precache_urls: Vec<String>,
    state: GenerationState,
}

impl GenerationManager {
    pub fn new(store: StoreDb, network: Arc<dyn Network>, names: GenerationNames, precache_urls: Vec<String>) -> Self {
        Self { store, network, names, precache_urls, state: GenerationState::Uninstalled }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn names(&self) -> &GenerationNames {
        &self.names
    }

    /// Create the static store and pre-populate it with the bootstrap list.
    ///
    /// All-or-nothing: every bootstrap resource is fetched before anything
    /// is written, and any transport failure or non-success status fails
    /// the whole install. An incomplete offline bootstrap is worse than an
    /// install failure, because a prior generation keeps serving.
    ///
    /// A successful install is immediately ready for [`activate`];
    /// there is no waiting on the old generation's consumers.
    ///
    /// [`activate`]: GenerationManager::activate
    pub async fn install(&mut self) -> Result<(), Error> {
        self.store.open_store(&self.names.static_name).await?;

        let mut fetched = Vec::with_capacity(self.precache_urls.len());
        for url_str in &self.precache_urls {
            let url = Url::parse(url_str)
                .map_err(|e| Error::Bootstrap { url: url_str.clone(), reason: e.to_string() })?;
            let request = RequestDescriptor::get(url);
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::Bootstrap { url: url_str.clone(), reason: e.to_string() })?;
            if !(200..300).contains(&response.status) {
                return Err(Error::Bootstrap { url: url_str.clone(), reason: format!("status {}", response.status) });
            }
            fetched.push((request, response));
        }

        for (request, response) in &fetched {
            self.store.put_response(&self.names.static_name, request, response).await?;
        }

        self.state = GenerationState::Installed;
        tracing::info!(
            "installed generation {} ({} bootstrap resources)",
            self.names.static_name,
            self.precache_urls.len()
        );
        Ok(())
    }

    /// Make this generation authoritative and drop every other store.
    ///
    /// Takeover is immediate; there is no per-request buffering for
    /// in-flight consumers of the old generation. Running activate twice
    /// with no intervening install deletes nothing the second time.
    pub async fn activate(&mut self) -> Result<(), Error> {
        self.store.open_store(&self.names.dynamic_name).await?;

        for name in self.store.list_store_names().await? {
            if name != self.names.static_name && name != self.names.dynamic_name {
                let removed = self.store.delete_store(&name).await?;
                tracing::info!("dropped stale store {name} ({removed} records)");
            }
        }

        self.state = GenerationState::Active;
        tracing::info!("generation {} is now authoritative", self.names.static_name);
        Ok(())
    }
}
