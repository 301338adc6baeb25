//! SQLite-backed response store.
//!
//! This module provides the persistent key-value response store behind the
//! caching strategies, using SQLite with async access via tokio-rusqlite.
//! It supports:
//!
//! - Multiple independently named stores in one database
//! - Content-addressed keys using SHA-256 over (method, url)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod key;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use connection::StoreDb;
