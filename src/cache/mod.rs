//! Cache Module
//!
//! Provides the in-memory storage engine with TTL expiration.

mod entry;
mod key;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{CacheKey, DEFAULT_NAMESPACE};
pub use stats::CacheStats;
pub use store::MemoryStore;
pub use ttl::{Ttl, DEFAULT_TTL_MS};
