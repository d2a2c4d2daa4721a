//! Moka Adapter
//!
//! Plugs the `moka` concurrent cache in behind the adapter contract.
//! Per-entry lifetimes are carried next to the value and handed to moka
//! through its `Expiry` policy, so the TTL fallback rules match the
//! built-in store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::sync::Cache;
use moka::Expiry;

use super::CacheAdapter;
use crate::cache::{CacheKey, Ttl};

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    lifetime: Option<Duration>,
}

/// Reads the lifetime stored in each slot. Overwrites restart the clock.
struct SlotExpiry;

impl<V> Expiry<CacheKey, Slot<V>> for SlotExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        slot: &Slot<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        slot.lifetime
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        slot: &Slot<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        slot.lifetime
    }
}

// == Moka Adapter ==
/// Adapter over `moka::sync::Cache`.
pub struct MokaAdapter<V>
where
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<CacheKey, Slot<V>>,
    default_ttl: Ttl,
}

impl<V> MokaAdapter<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a moka-backed adapter.
    pub fn new(default_ttl: Ttl) -> Self {
        Self {
            cache: Cache::builder().expire_after(SlotExpiry).build(),
            default_ttl,
        }
    }

    /// Approximate number of entries held by moka.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<V> CacheAdapter<V> for MokaAdapter<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "moka"
    }

    async fn get(&self, key: &CacheKey) -> Option<V> {
        self.cache.get(key).map(|slot| slot.value)
    }

    async fn put(&self, key: CacheKey, value: V, ttl: Ttl) {
        let lifetime = ttl.resolve(self.default_ttl);
        self.cache.insert(key, Slot { value, lifetime });
    }

    async fn delete(&self, key: &CacheKey) {
        self.cache.invalidate(key);
    }

    async fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn purge_expired(&self) -> usize {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks();
        before.saturating_sub(self.cache.entry_count()) as usize
    }
}
