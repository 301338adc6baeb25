//! Network capability for brolly.
//!
//! This crate provides the asynchronous fetch interface the caching
//! strategies consume, and its reqwest-backed implementation.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, Network};
