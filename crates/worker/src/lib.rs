//! The brolly interception engine.
//!
//! The host runtime drives a [`handler::Worker`] with lifecycle
//! [`events::Event`]s: install/activate manage the cache generation, fetch
//! events are classified by the [`router`] and served by the two strategy
//! executors with [`fallback`] synthesis behind them, and sync/push events
//! are forwarded to caller-registered capabilities.

pub mod cache_first;
pub mod events;
pub mod fallback;
pub mod generation;
pub mod handler;
pub mod network_first;
pub mod router;
pub mod strategy;
#[cfg(test)]
mod testnet;

pub use events::{Event, FetchOutcome, NotificationOptions, Notifier, SyncHandler};
pub use handler::Worker;
pub use router::Decision;
