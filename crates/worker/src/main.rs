//! brolly-worker entry point.
//!
//! Primes the offline cache: loads configuration, opens the response
//! store, installs the current generation (bootstrap precache) and
//! activates it, dropping every stale generation. Logging goes to stderr
//! as JSON.

use std::sync::Arc;

use anyhow::Result;
use brolly_client::{FetchClient, FetchConfig};
use brolly_core::{AppConfig, StoreDb};
use brolly_worker::Worker;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!("priming offline cache, generation version {}", config.version);

    let store = StoreDb::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let worker = Worker::new(&config, store.clone(), Arc::new(client))?;
    worker.handle_install().await?;
    worker.handle_activate().await?;

    for name in store.list_store_names().await? {
        let records = store.count_entries(&name).await?;
        tracing::info!("store {name}: {records} records");
    }

    Ok(())
}
