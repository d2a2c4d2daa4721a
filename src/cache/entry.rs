//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// All instants come from the monotonic clock, so wall-clock adjustments
/// never shorten or extend a lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with an already resolved lifetime.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `lifetime` - How long the entry lives, None = forever
    pub fn new(value: V, lifetime: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: lifetime.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks whether a read at `now` must treat the entry as gone.
    ///
    /// An entry is still readable at exactly its expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Checks whether the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Is Due ==
    /// Checks whether a sweep at `now` should reclaim the entry.
    ///
    /// Sweeping is inclusive of the expiration instant.
    pub fn is_due_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            expires
                .saturating_duration_since(Instant::now())
                .as_millis() as u64
        })
    }
}
