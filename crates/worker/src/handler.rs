//! The worker: event dispatch over router, executors and lifecycle.

use std::sync::Arc;

use brolly_client::Network;
use brolly_core::{AppConfig, Error, RequestDescriptor, StoreDb};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use url::Url;

use crate::cache_first::CacheFirst;
use crate::events::{Event, FetchOutcome, NotificationOptions, Notifier, PushPayload, SyncHandler};
use crate::generation::GenerationManager;
use crate::network_first::NetworkFirst;
use crate::router::{Decision, Router};
use crate::strategy::RequestHandler;

/// The interception engine: classifies every event the host runtime
/// delivers and drives the store, the network and the registered
/// capabilities accordingly.
pub struct Worker {
    router: Router,
    network_first: NetworkFirst,
    cache_first: CacheFirst,
    generations: Mutex<GenerationManager>,
    notifier: Option<Arc<dyn Notifier>>,
    sync_handler: Option<Arc<dyn SyncHandler>>,
}

impl Worker {
    pub fn new(config: &AppConfig, store: StoreDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let app_origin = Url::parse(&config.app_origin)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.app_origin, e)))?;
        let names = config.generation_names();

        Ok(Self {
            router: Router::new(app_origin, config.telemetry_patterns.clone()),
            network_first: NetworkFirst::new(
                store.clone(),
                network.clone(),
                names.dynamic_name.clone(),
                config.offline_url.clone(),
            ),
            cache_first: CacheFirst::new(
                store.clone(),
                network.clone(),
                names.dynamic_name.clone(),
                config.font_patterns.clone(),
                config.script_patterns.clone(),
            ),
            generations: Mutex::new(GenerationManager::new(store, network, names, config.precache_urls.clone())),
            notifier: None,
            sync_handler: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_sync_handler(mut self, handler: Arc<dyn SyncHandler>) -> Self {
        self.sync_handler = Some(handler);
        self
    }

    /// Install the current generation.
    ///
    /// On failure the prior active generation keeps serving; nothing here
    /// becomes authoritative.
    pub async fn handle_install(&self) -> Result<(), Error> {
        self.generations.lock().await.install().await
    }

    /// Make the current generation authoritative.
    pub async fn handle_activate(&self) -> Result<(), Error> {
        self.generations.lock().await.activate().await
    }

    /// Route one intercepted request through its strategy.
    pub async fn handle_fetch(&self, request: &RequestDescriptor) -> FetchOutcome {
        match self.router.classify(request) {
            Decision::Ignore => FetchOutcome::Passthrough,
            Decision::NetworkFirst => FetchOutcome::Respond(self.network_first.handle(request).await),
            Decision::CacheFirst => FetchOutcome::Respond(self.cache_first.handle(request).await),
        }
    }

    /// Forward a background-sync trigger to the registered hook.
    pub async fn handle_sync(&self, tag: &str) {
        match &self.sync_handler {
            Some(handler) => {
                if let Err(e) = handler.on_sync(tag).await {
                    tracing::error!("sync hook for tag {tag} failed: {e}");
                }
            }
            None => tracing::debug!("sync event for tag {tag} ignored: no hook registered"),
        }
    }

    /// Show a notification for a push payload.
    pub async fn handle_push(&self, payload: &str) {
        let Some(notifier) = &self.notifier else {
            tracing::debug!("push event ignored: no notifier registered");
            return;
        };

        let push: PushPayload = serde_json::from_str(payload).unwrap_or_else(|e| {
            tracing::warn!("malformed push payload ({e}), showing raw text");
            PushPayload { title: "brolly".to_string(), body: payload.to_string(), icon: None, tag: None }
        });

        let options = NotificationOptions { body: push.body, icon: push.icon, tag: push.tag };
        notifier.show_notification(&push.title, &options).await;
    }

    /// A notification was clicked; nothing to do in core beyond logging.
    pub async fn handle_notification_click(&self, action: &str) {
        tracing::info!("notification clicked: {action}");
    }

    /// Consume events until the channel closes.
    ///
    /// Every event handler runs as an independent task; before returning,
    /// all in-flight handlers are drained so no async chain is cut short.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<Event>) {
        let mut pending = JoinSet::new();

        while let Some(event) = events.recv().await {
            let worker = Arc::clone(&self);
            pending.spawn(async move { worker.dispatch(event).await });

            // reap handlers that already finished
            while let Some(result) = pending.try_join_next() {
                if let Err(e) = result {
                    tracing::error!("event handler panicked: {e}");
                }
            }
        }

        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                tracing::error!("event handler panicked: {e}");
            }
        }
    }

    async fn dispatch(&self, event: Event) {
        match event {
            Event::Install => {
                if let Err(e) = self.handle_install().await {
                    tracing::error!("install failed: {e}");
                }
            }
            Event::Activate => {
                if let Err(e) = self.handle_activate().await {
                    tracing::error!("activate failed: {e}");
                }
            }
            Event::Fetch { request, reply } => {
                let outcome = self.handle_fetch(&request).await;
                if reply.send(outcome).is_err() {
                    tracing::debug!("fetch caller went away before the response was ready");
                }
            }
            Event::Sync { tag } => self.handle_sync(&tag).await,
            Event::Push { payload } => self.handle_push(&payload).await,
            Event::NotificationClick { action } => self.handle_notification_click(&action).await,
        }
    }
}
