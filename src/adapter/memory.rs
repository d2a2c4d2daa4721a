//! Adapter implementation for the built-in store.

use async_trait::async_trait;

use super::CacheAdapter;
use crate::cache::{CacheKey, MemoryStore, Ttl};

#[async_trait]
impl<V> CacheAdapter<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> Option<V> {
        MemoryStore::get(self, key).ok()
    }

    async fn put(&self, key: CacheKey, value: V, ttl: Ttl) {
        MemoryStore::put(self, key, value, ttl);
    }

    async fn delete(&self, key: &CacheKey) {
        MemoryStore::delete(self, key);
    }

    async fn clear(&self) {
        MemoryStore::clear(self);
    }

    fn purge_expired(&self) -> usize {
        self.sweep_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_adapter_contract() {
        let adapter: Arc<dyn CacheAdapter<String>> = Arc::new(MemoryStore::<String>::new(Ttl::Never));
        let key = CacheKey::of("k");

        assert_eq!(adapter.name(), "memory");
        assert_eq!(adapter.get(&key).await, None);

        adapter.put(key, "v".to_string(), Ttl::Millis(-1)).await;
        assert_eq!(adapter.get(&key).await.as_deref(), Some("v"));

        adapter.delete(&key).await;
        adapter.delete(&key).await;
        assert_eq!(adapter.get(&key).await, None);

        adapter.clear().await;
        assert_eq!(adapter.purge_expired(), 0);
    }
}
