//! TTL Cache - A process-local cache-or-compute engine
//!
//! Stores values under derived keys with per-entry TTL, expires them on read
//! and in a background sweep, and lets the storage backend be swapped behind
//! a small adapter contract.

pub mod adapter;
pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod tasks;

pub use adapter::{CacheAdapter, MokaAdapter};
pub use cache::{CacheKey, CacheStats, MemoryStore, Ttl};
pub use client::{Cache, CacheOptions};
pub use config::{AdapterKind, Config};
pub use engine::CacheEngine;
pub use error::{CacheError, Result};
