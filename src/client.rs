//! Cache Client Module
//!
//! Fetch-or-compute over any adapter. The client derives keys from caller
//! terms and namespaces; adapters only ever see [`CacheKey`]s.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::adapter::CacheAdapter;
use crate::cache::{CacheKey, Ttl, DEFAULT_NAMESPACE};

// == Cache Options ==
/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Lifetime for values written by this call
    pub ttl: Ttl,
    /// Recompute even if a value is cached (fetch only)
    pub force: bool,
    /// Namespace mixed into key derivation
    pub name: Option<String>,
}

impl CacheOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL.
    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Forces recomputation on fetch.
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Sets the namespace.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Layers these options over `defaults`. Fields left unset here are
    /// taken from `defaults`; an unusable TTL counts as unset. `force` is
    /// never inherited.
    pub fn merge(&self, defaults: &CacheOptions) -> CacheOptions {
        CacheOptions {
            ttl: if self.ttl.is_explicit() { self.ttl } else { defaults.ttl },
            force: self.force,
            name: self.name.clone().or_else(|| defaults.name.clone()),
        }
    }

    /// The namespace in effect.
    pub fn namespace(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }
}

// == Cache ==
/// Cache client bound to one adapter and a set of default options.
///
/// Cheap to clone; clones share the same backend.
pub struct Cache<V> {
    adapter: Arc<dyn CacheAdapter<V>>,
    defaults: CacheOptions,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            defaults: self.defaults.clone(),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("adapter", &self.adapter.name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a client with default options.
    pub fn new(adapter: Arc<dyn CacheAdapter<V>>) -> Self {
        Self::with_defaults(adapter, CacheOptions::default())
    }

    /// Creates a client whose calls inherit `defaults`.
    pub fn with_defaults(adapter: Arc<dyn CacheAdapter<V>>, defaults: CacheOptions) -> Self {
        Self { adapter, defaults }
    }

    /// Returns the name of the backing adapter.
    pub fn backend(&self) -> &'static str {
        self.adapter.name()
    }

    /// Derives the key a call with `opts` would use for `term`.
    pub fn key<T: Hash + ?Sized>(&self, term: &T, opts: &CacheOptions) -> CacheKey {
        CacheKey::derive(opts.merge(&self.defaults).namespace(), term)
    }

    // == Get ==
    /// Returns the cached value for `term`, if any.
    pub async fn get<T: Hash + ?Sized>(&self, term: &T, opts: &CacheOptions) -> Option<V> {
        let key = self.key(term, opts);
        self.adapter.get(&key).await
    }

    // == Put ==
    /// Stores `value` for `term` using the TTL from `opts`.
    pub async fn put<T: Hash + ?Sized>(&self, term: &T, value: V, opts: &CacheOptions) {
        let opts = opts.merge(&self.defaults);
        let key = CacheKey::derive(opts.namespace(), term);
        self.adapter.put(key, value, opts.ttl).await;
    }

    // == Delete ==
    /// Removes the cached value for `term`, if any.
    pub async fn delete<T: Hash + ?Sized>(&self, term: &T, opts: &CacheOptions) {
        let key = self.key(term, opts);
        self.adapter.delete(&key).await;
    }

    // == Clear ==
    /// Removes every cached value in the backend, across all namespaces.
    ///
    /// Takes no options: a TTL has nothing to apply to, and entries only
    /// carry a derived key, so a namespace cannot select a subset.
    pub async fn clear(&self) {
        self.adapter.clear().await;
    }

    // == Fetch ==
    /// Returns the cached value for `term`, computing and storing it on a miss.
    ///
    /// With `force` set, the entry is deleted first so `compute` always runs.
    /// `compute` runs outside any store lock. If it fails, the error is
    /// returned unchanged and nothing is stored.
    ///
    /// The lookup, computation and store are not one atomic step: two
    /// fetches that miss on the same key concurrently will both compute
    /// and both store, and the later store wins.
    pub async fn fetch<T, F, Fut, E>(
        &self,
        term: &T,
        opts: &CacheOptions,
        compute: F,
    ) -> Result<V, E>
    where
        T: Hash + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let opts = opts.merge(&self.defaults);
        let key = CacheKey::derive(opts.namespace(), term);

        if opts.force {
            self.adapter.delete(&key).await;
        }

        if let Some(value) = self.adapter.get(&key).await {
            trace!(%key, "fetch hit");
            return Ok(value);
        }

        trace!(%key, "fetch miss, computing");
        let value = match compute().await {
            Ok(value) => value,
            Err(err) => {
                debug!(%key, "computation failed, nothing cached");
                return Err(err);
            }
        };

        self.adapter.put(key, value.clone(), opts.ttl).await;
        Ok(value)
    }

    /// Like [`Cache::fetch`] for computations that cannot fail.
    pub async fn fetch_with<T, F, Fut>(&self, term: &T, opts: &CacheOptions, compute: F) -> V
    where
        T: Hash + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let result: Result<V, std::convert::Infallible> = self
            .fetch(term, opts, || async move { Ok(compute().await) })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}
