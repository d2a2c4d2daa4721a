//! Cache Engine
//!
//! Owns the configured backend and its sweeper for the life of the process.
//! Built once at startup and handed to callers, who obtain [`Cache`]
//! clients from it.
//!
//! # Startup Sequence
//! 1. Validate configuration
//! 2. Check for a running tokio runtime
//! 3. Create the selected backend
//! 4. Start the background sweeper

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::{CacheAdapter, MokaAdapter};
use crate::cache::{CacheStats, MemoryStore, Ttl};
use crate::client::{Cache, CacheOptions};
use crate::config::{AdapterKind, Config};
use crate::error::{CacheError, Result};
use crate::tasks::Sweeper;

// == Cache Engine ==
/// A running cache: one backend plus its sweeper.
///
/// Dropping the engine cancels the sweeper and discards every entry once
/// the last client handle is gone.
pub struct CacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    adapter: Arc<dyn CacheAdapter<V>>,
    /// Set when the built-in store is in use, for statistics
    memory: Option<Arc<MemoryStore<V>>>,
    sweeper: Sweeper,
    config: Config,
}

impl<V> CacheEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Start ==
    /// Starts an engine with the backend selected in `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<Self> {
        let config = Self::validate(config)?;

        match config.adapter {
            AdapterKind::Memory => {
                let store = Arc::new(MemoryStore::new(config.default_ttl));
                let adapter: Arc<dyn CacheAdapter<V>> = store.clone();
                Self::launch(adapter, Some(store), config)
            }
            AdapterKind::Moka => {
                let adapter: Arc<dyn CacheAdapter<V>> =
                    Arc::new(MokaAdapter::new(config.default_ttl));
                Self::launch(adapter, None, config)
            }
        }
    }

    /// Starts an engine around a caller-supplied backend.
    ///
    /// `config.adapter` is ignored; TTL policy is the backend's own concern.
    pub fn with_adapter(adapter: Arc<dyn CacheAdapter<V>>, config: &Config) -> Result<Self> {
        let config = Self::validate(config)?;
        Self::launch(adapter, None, config)
    }

    fn validate(config: &Config) -> Result<Config> {
        if config.sweep_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be at least 1ms".to_string(),
            ));
        }

        let mut config = config.clone();
        if !config.default_ttl.is_explicit() {
            warn!(
                "Unusable default TTL {:?}, falling back to built-in default",
                config.default_ttl
            );
            config.default_ttl = Config::default().default_ttl;
        }
        Ok(config)
    }

    fn launch(
        adapter: Arc<dyn CacheAdapter<V>>,
        memory: Option<Arc<MemoryStore<V>>>,
        config: Config,
    ) -> Result<Self> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| CacheError::Startup(format!("no tokio runtime available: {}", e)))?;

        let sweeper = Sweeper::spawn(adapter.clone(), config.sweep_interval());

        info!(
            backend = adapter.name(),
            default_ttl = ?config.default_ttl,
            sweep_interval_ms = config.sweep_interval_ms,
            "Cache engine started"
        );

        Ok(Self {
            adapter,
            memory,
            sweeper,
            config,
        })
    }

    // == Clients ==
    /// Returns a client with default options.
    pub fn client(&self) -> Cache<V> {
        Cache::new(self.adapter.clone())
    }

    /// Returns a client whose calls inherit `defaults`.
    pub fn client_with(&self, defaults: CacheOptions) -> Cache<V> {
        Cache::with_defaults(self.adapter.clone(), defaults)
    }

    /// Returns the backend shared by every client.
    pub fn adapter(&self) -> Arc<dyn CacheAdapter<V>> {
        self.adapter.clone()
    }

    /// Returns the effective default TTL.
    pub fn default_ttl(&self) -> Ttl {
        self.config.default_ttl
    }

    /// Statistics for the built-in store; `None` for other backends.
    pub fn stats(&self) -> Option<CacheStats> {
        self.memory.as_ref().map(|store| store.stats())
    }

    /// Runs one sweep pass immediately and returns how many entries it removed.
    pub fn sweep_now(&self) -> usize {
        self.adapter.purge_expired()
    }

    /// Returns true while the sweeper is active.
    pub fn is_running(&self) -> bool {
        !self.sweeper.is_finished()
    }

    // == Shutdown ==
    /// Stops the sweeper and releases the engine's hold on the backend.
    pub fn shutdown(self) {
        self.sweeper.stop();
        info!(backend = self.adapter.name(), "Cache engine stopped");
    }
}
