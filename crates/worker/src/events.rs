//! Lifecycle events and the out-of-core capabilities they trigger.
//!
//! The host runtime drives the worker by sending [`Event`]s; the worker
//! replies to fetch events over a oneshot channel and forwards sync/push
//! events to caller-registered capabilities.

use async_trait::async_trait;
use brolly_core::{Error, RequestDescriptor, ResponseRecord};
use serde::Deserialize;
use tokio::sync::oneshot;

/// One event delivered by the host runtime.
#[derive(Debug)]
pub enum Event {
    /// Install the current generation (pre-populate the static store).
    Install,
    /// Make the current generation authoritative and drop stale stores.
    Activate,
    /// An intercepted outgoing request; the outcome is sent on `reply`.
    Fetch {
        request: RequestDescriptor,
        reply: oneshot::Sender<FetchOutcome>,
    },
    /// A background-sync trigger fired for the given tag.
    Sync { tag: String },
    /// A push message arrived with a JSON payload.
    Push { payload: String },
    /// The user clicked a previously shown notification.
    NotificationClick { action: String },
}

/// Result of handling one intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the request goes straight to the network.
    Passthrough,
    /// Intercepted and answered with this response.
    Respond(ResponseRecord),
}

/// Display options for a notification.
#[derive(Debug, Clone, Default)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: Option<String>,
    pub tag: Option<String>,
}

/// Notification-display capability, consumed but not implemented here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show_notification(&self, title: &str, options: &NotificationOptions);
}

/// Application hook invoked when a background-sync trigger fires.
#[async_trait]
pub trait SyncHandler: Send + Sync {
    async fn on_sync(&self, tag: &str) -> Result<(), Error>;
}

/// Shape of a push payload.
///
/// Malformed payloads fall back to showing the raw text.
#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

fn default_title() -> String {
    "brolly".to_string()
}
