//! Cache Key Module
//!
//! Derives opaque keys from a caller term and a namespace.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace used when a call does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

// == Cache Key ==
/// Opaque 64-bit digest of a `(namespace, term)` pair.
///
/// Equal pairs always produce equal keys. Distinct pairs are not
/// guaranteed to differ; collisions are an accepted hashing trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    // == Derive ==
    /// Derives the key for `term` inside namespace `name`.
    ///
    /// Uses a fixed-key hasher so derivation is stable for the life of the
    /// process.
    pub fn derive<T: Hash + ?Sized>(name: &str, term: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        term.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Derives the key for `term` in the default namespace.
    pub fn of<T: Hash + ?Sized>(term: &T) -> Self {
        Self::derive(DEFAULT_NAMESPACE, term)
    }

    /// Wraps a raw digest.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw digest.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
