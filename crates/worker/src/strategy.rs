//! Shared executor interface.

use async_trait::async_trait;
use brolly_core::{RequestDescriptor, ResponseRecord};

/// An executor for one caching strategy.
///
/// Handling is infallible by design: transient network failures, store
/// unavailability and cache misses all degrade inside the executor, and
/// the worst case is a synthesized substitute. The caller always receives
/// a well-formed response.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: &RequestDescriptor) -> ResponseRecord;
}
