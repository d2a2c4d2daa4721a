//! Configuration Module
//!
//! Handles loading engine configuration from environment variables.
//! Values are read once at startup.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{Ttl, DEFAULT_TTL_MS};

/// Default time between sweeper passes.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;

// == Adapter Kind ==
/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Built-in sharded store
    #[default]
    Memory,
    /// moka-backed shim
    Moka,
}

impl FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(AdapterKind::Memory),
            "moka" => Ok(AdapterKind::Moka),
            other => Err(format!("unknown adapter '{}'", other)),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Memory => f.write_str("memory"),
            AdapterKind::Moka => f.write_str("moka"),
        }
    }
}

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TTL for entries written without a usable TTL
    pub default_ttl: Ttl,
    /// Time between sweeper passes in milliseconds
    pub sweep_interval_ms: u64,
    /// Storage backend
    pub adapter: AdapterKind,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in milliseconds, or `never` (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 5000)
    /// - `CACHE_ADAPTER` - `memory` or `moka` (default: memory)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .map(|v| Ttl::from(v.as_str()))
                .filter(Ttl::is_explicit)
                .unwrap_or(defaults.default_ttl),
            sweep_interval_ms: env::var("CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
            adapter: env::var("CACHE_ADAPTER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.adapter),
        }
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.default_ttl = ttl.into();
        self
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Selects the backend.
    pub fn with_adapter(mut self, adapter: AdapterKind) -> Self {
        self.adapter = adapter;
        self
    }

    /// Sweep interval as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Ttl::Millis(DEFAULT_TTL_MS as i64),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            adapter: AdapterKind::Memory,
        }
    }
}
