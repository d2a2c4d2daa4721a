//! TTL Module
//!
//! Per-call time-to-live values and the policy that resolves them against
//! the engine default.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Built-in default TTL in milliseconds, used when the configured default is unusable.
pub const DEFAULT_TTL_MS: u64 = 300_000;

// == TTL ==
/// A requested time-to-live.
///
/// Invalid inputs never become errors: zero, negative and unparseable values
/// all fall back to the engine default when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the engine default
    #[default]
    Default,
    /// Entry never expires
    Never,
    /// Expire after this many milliseconds (only positive values are honoured)
    Millis(i64),
}

impl Ttl {
    // == Resolve ==
    /// Resolves this TTL into a concrete lifetime.
    ///
    /// Returns `None` when the entry should never expire.
    ///
    /// # Arguments
    /// * `default` - The engine default, itself normalized if invalid
    pub fn resolve(self, default: Ttl) -> Option<Duration> {
        match self {
            Ttl::Never => None,
            Ttl::Millis(ms) if ms > 0 => Some(Duration::from_millis(ms as u64)),
            // An unusable default resolves against the built-in one, which is positive.
            _ => default.resolve(Ttl::Millis(DEFAULT_TTL_MS as i64)),
        }
    }

    /// Returns true if this value would be honoured as given rather than
    /// falling back to a default.
    pub fn is_explicit(&self) -> bool {
        match self {
            Ttl::Never => true,
            Ttl::Millis(ms) => *ms > 0,
            Ttl::Default => false,
        }
    }
}

// == Conversions ==
impl From<i64> for Ttl {
    fn from(ms: i64) -> Self {
        Ttl::Millis(ms)
    }
}

impl From<u64> for Ttl {
    fn from(ms: u64) -> Self {
        Ttl::Millis(i64::try_from(ms).unwrap_or(i64::MAX))
    }
}

impl From<i32> for Ttl {
    fn from(ms: i32) -> Self {
        Ttl::Millis(ms as i64)
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl::Millis(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

impl<T: Into<Ttl>> From<Option<T>> for Ttl {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<&str> for Ttl {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("never") || s.eq_ignore_ascii_case("infinity") {
            return Ttl::Never;
        }
        s.parse::<i64>().map(Ttl::Millis).unwrap_or_default()
    }
}

impl FromStr for Ttl {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Ttl::from(s))
    }
}

impl<'de> Deserialize<'de> for Ttl {
    /// Accepts a number, a string, or null. Any other shape is treated as
    /// the default rather than rejected.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Number(n) => n.as_i64().map(Ttl::Millis).unwrap_or_default(),
            serde_json::Value::String(s) => Ttl::from(s.as_str()),
            _ => Ttl::Default,
        })
    }
}
