//! Cache Store Module
//!
//! The built-in storage engine: a sharded in-memory map with per-entry TTL,
//! expiration on read, and a fine-grained sweep for the background task.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use tracing::{debug, trace};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheKey, CacheStats, Ttl};
use crate::error::{CacheError, Result};

/// Number of independently locked shards.
const NUM_SHARDS: usize = 16;

type Shard<V> = RwLock<HashMap<CacheKey, CacheEntry<V>>>;

// == Memory Store ==
/// In-memory key/value store with TTL semantics.
///
/// Every mutation of a shard happens under that shard's write lock, so two
/// puts on the same key never interleave and a reader never sees a partial
/// entry. The last put to complete wins.
#[derive(Debug)]
pub struct MemoryStore<V> {
    /// Key-value storage split across shards
    shards: Vec<Shard<V>>,
    /// TTL applied when a put does not carry a usable one
    default_ttl: Ttl,
    /// Performance statistics
    stats: StatsRecorder,
}

impl<V: Clone> MemoryStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL for puts without a usable TTL of their own
    pub fn new(default_ttl: Ttl) -> Self {
        Self {
            shards: (0..NUM_SHARDS).map(|_| RwLock::new(HashMap::new())).collect(),
            default_ttl,
            stats: StatsRecorder::default(),
        }
    }

    fn shard(&self, key: &CacheKey) -> &Shard<V> {
        &self.shards[(key.as_u64() as usize) % NUM_SHARDS]
    }

    fn read(shard: &Shard<V>) -> RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        shard.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(shard: &Shard<V>) -> RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        shard.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An entry found past its expiration instant is removed and reported
    /// as `NotFound`, so a read may delete.
    pub fn get(&self, key: &CacheKey) -> Result<V> {
        let shard = self.shard(key);
        let now = Instant::now();

        {
            let data = Self::read(shard);
            match data.get(key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    self.stats.record_hit();
                    trace!(%key, "cache hit");
                    return Ok(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    self.stats.record_miss();
                    trace!(%key, "cache miss");
                    return Err(CacheError::NotFound(key.to_string()));
                }
            }
        }

        // Expired: upgrade to a write lock and re-check, since a put may
        // have replaced the entry in between.
        let mut data = Self::write(shard);
        if let Some(entry) = data.get(key) {
            if !entry.is_expired_at(Instant::now()) {
                self.stats.record_hit();
                return Ok(entry.value.clone());
            }
            data.remove(key);
            self.stats.record_expiration();
            debug!(%key, "removed expired entry on read");
        }
        self.stats.record_miss();
        Err(CacheError::NotFound(key.to_string()))
    }

    // == Put ==
    /// Stores a value, overwriting any existing entry for the key.
    ///
    /// Never fails: an unusable TTL falls back to the default.
    pub fn put(&self, key: CacheKey, value: V, ttl: Ttl) {
        let entry = CacheEntry::new(value, ttl.resolve(self.default_ttl));
        Self::write(self.shard(&key)).insert(key, entry);
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &CacheKey) {
        Self::write(self.shard(key)).remove(key);
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        for shard in &self.shards {
            Self::write(shard).clear();
        }
    }

    // == Contains ==
    /// Returns true if a live entry exists. Does not touch statistics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        Self::read(self.shard(key))
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    /// Returns true if any entry, live or expired, is physically stored.
    pub fn holds(&self, key: &CacheKey) -> bool {
        Self::read(self.shard(key)).contains_key(key)
    }

    // == TTL Remaining ==
    /// Remaining lifetime of a live entry in milliseconds.
    ///
    /// `None` for absent, expired, or never-expiring entries.
    pub fn ttl_remaining_ms(&self, key: &CacheKey) -> Option<u64> {
        Self::read(self.shard(key))
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::ttl_remaining_ms)
    }

    // == Sweep Expired ==
    /// Removes every entry whose expiration instant is at or before now.
    ///
    /// Works one shard at a time: due keys are collected under the read
    /// lock, then removed under a short write lock after re-checking each
    /// one. Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let mut removed = 0;

        for shard in &self.shards {
            let now = Instant::now();
            let due: Vec<CacheKey> = Self::read(shard)
                .iter()
                .filter(|(_, entry)| entry.is_due_at(now))
                .map(|(key, _)| *key)
                .collect();

            if due.is_empty() {
                continue;
            }

            let mut data = Self::write(shard);
            for key in due {
                if data.get(&key).is_some_and(|entry| entry.is_due_at(now)) {
                    data.remove(&key);
                    removed += 1;
                }
            }
        }

        self.stats.record_swept(removed);
        removed
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| Self::read(shard).len()).sum()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| Self::read(shard).is_empty())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn key(term: &str) -> CacheKey {
        CacheKey::of(term)
    }

    fn store() -> MemoryStore<String> {
        MemoryStore::new(Ttl::Millis(300_000))
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_put_and_get() {
        let store = store();

        store.put(key("key1"), "value1".to_string(), Ttl::Default);
        assert_eq!(store.get(&key("key1")).unwrap(), "value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store();
        assert!(matches!(store.get(&key("nope")), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete() {
        let store = store();

        store.put(key("key1"), "value1".to_string(), Ttl::Default);
        store.delete(&key("key1"));

        assert!(store.is_empty());
        assert!(store.get(&key("key1")).is_err());
    }

    #[test]
    fn test_store_delete_and_clear_are_idempotent() {
        let store = store();

        store.delete(&key("nonexistent"));
        store.delete(&key("nonexistent"));
        store.clear();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear() {
        let store = store();
        for i in 0..50 {
            store.put(CacheKey::of(&i), i.to_string(), Ttl::Never);
        }
        assert_eq!(store.len(), 50);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite() {
        let store = store();

        store.put(key("key1"), "value1".to_string(), Ttl::Millis(10));
        store.put(key("key1"), "value2".to_string(), Ttl::Never);

        assert_eq!(store.get(&key("key1")).unwrap(), "value2");
        assert_eq!(store.len(), 1);
        assert_eq!(store.ttl_remaining_ms(&key("key1")), None);
    }

    #[test]
    fn test_store_ttl_expiration_removes_on_read() {
        let store = store();

        store.put(key("u:1"), "A".to_string(), Ttl::Millis(50));
        assert!(store.get(&key("u:1")).is_ok());

        sleep(Duration::from_millis(100));

        assert!(store.holds(&key("u:1")));
        assert!(!store.contains(&key("u:1")));
        assert!(matches!(store.get(&key("u:1")), Err(CacheError::NotFound(_))));
        assert!(!store.holds(&key("u:1")));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_never_expires() {
        let store = MemoryStore::new(Ttl::Millis(10));

        store.put(key("forever"), 1u8, Ttl::Never);
        sleep(Duration::from_millis(30));

        assert_eq!(store.get(&key("forever")).unwrap(), 1);
    }

    #[test]
    fn test_store_invalid_ttl_uses_default() {
        let store = MemoryStore::new(Ttl::Millis(60_000));

        store.put(key("zero"), 0u8, Ttl::Millis(0));
        store.put(key("negative"), 0u8, Ttl::Millis(-5));
        store.put(key("garbage"), 0u8, Ttl::from("garbage"));

        for name in ["zero", "negative", "garbage"] {
            let remaining = store.ttl_remaining_ms(&key(name)).unwrap();
            assert!(remaining > 59_000 && remaining <= 60_000, "{name}: {remaining}");
        }
    }

    #[test]
    fn test_store_stats() {
        let store = store();

        store.put(key("key1"), "value1".to_string(), Ttl::Default);
        store.get(&key("key1")).unwrap();
        let _ = store.get(&key("nonexistent"));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_sweep_expired() {
        let store = store();

        store.put(key("short"), "a".to_string(), Ttl::Millis(10));
        store.put(key("long"), "b".to_string(), Ttl::Millis(60_000));
        store.put(key("never"), "c".to_string(), Ttl::Never);

        sleep(Duration::from_millis(30));

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(!store.holds(&key("short")));
        assert!(store.get(&key("long")).is_ok());
        assert!(store.get(&key("never")).is_ok());
        assert_eq!(store.stats().swept, 1);
    }

    #[test]
    fn test_store_sweep_empty() {
        let store = store();
        assert_eq!(store.sweep_expired(), 0);
    }
}
