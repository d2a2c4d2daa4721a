//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Storage operations are total: only `NotFound` is ever produced by a
/// lookup, and it is an expected outcome rather than a fault. The remaining
/// variants can only surface while the engine is being started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key missing from the store, or its entry has expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The selected backend could not be brought up
    #[error("Backend failed to start: {0}")]
    Startup(String),

    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Returns true for the expected miss outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
