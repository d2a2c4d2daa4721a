//! Adapter Module
//!
//! The storage contract the orchestrator is written against, and the
//! backends that implement it.
//!
//! # Backends
//! - `MemoryStore`: the built-in sharded store
//! - `MokaAdapter`: a shim over the `moka` concurrent cache

mod memory;
mod moka_adapter;

use async_trait::async_trait;

use crate::cache::{CacheKey, Ttl};

pub use moka_adapter::MokaAdapter;

// == Cache Adapter ==
/// Uniform four-operation storage contract.
///
/// Every operation is total. `get` reports a miss as `None`; a backend that
/// hits an internal or transport failure during lookup must also report
/// `None`. `delete` and `clear` succeed on absent keys and empty stores, and
/// `put` never fails on an unusable TTL (it falls back to the default).
#[async_trait]
pub trait CacheAdapter<V>: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns the live value for `key`, if any.
    async fn get(&self, key: &CacheKey) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn put(&self, key: CacheKey, value: V, ttl: Ttl);

    /// Removes `key` if present.
    async fn delete(&self, key: &CacheKey);

    /// Removes every entry.
    async fn clear(&self);

    /// Reclaims expired entries and returns how many were removed.
    ///
    /// Called periodically by the sweeper. Backends that manage expiry on
    /// their own may keep the default no-op.
    fn purge_expired(&self) -> usize {
        0
    }
}
