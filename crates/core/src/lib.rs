//! Core types and shared functionality for brolly.
//!
//! This crate provides:
//! - The SQLite-backed response store (named stores, match/put/delete)
//! - Request/response types and cache-key hashing
//! - Unified error types
//! - Layered configuration

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{AppConfig, GenerationNames};
pub use error::Error;
pub use store::StoreDb;
pub use types::{RequestDescriptor, ResponseRecord};
