//! Scripted in-process network for strategy and lifecycle tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use brolly_client::Network;
use brolly_core::{Error, RequestDescriptor, ResponseRecord};

/// A `Network` that serves canned responses by URL and counts calls.
///
/// URLs without a canned response, and every URL while offline, fail with
/// a transport error.
#[derive(Default)]
pub struct MockNetwork {
    responses: Mutex<HashMap<String, ResponseRecord>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a 200 text/html response for a URL.
    pub fn ok(&self, url: &str, body: &str) {
        self.respond(url, ResponseRecord::with_content_type(200, "OK", "text/html", body.to_string()));
    }

    /// Script an arbitrary response for a URL.
    pub fn respond(&self, url: &str, record: ResponseRecord) {
        self.responses.lock().unwrap().insert(url.to_string(), record);
    }

    /// Make every subsequent fetch fail with a transport error.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ResponseRecord, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Transport("offline".to_string()));
        }
        self.responses
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no route to {}", request.url)))
    }
}
