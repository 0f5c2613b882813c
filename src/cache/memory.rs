use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};

pub struct MokaObjectCache {
    inner: Cache<String, String>,
}

impl MokaObjectCache {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        debug!(
            "Moka object cache initialized (max capacity: {}, ttl: {}s)",
            max_capacity, ttl_secs
        );
        Self { inner }
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => CacheResult::Found(value),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String) {
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{get_json, insert_json, user_cache_key};

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaObjectCache::new(100, 60);
        cache.insert_raw("k".to_string(), "v".to_string()).await;
        assert_eq!(cache.get_raw("k").await, CacheResult::Found("v".to_string()));

        cache.remove("k").await;
        assert_eq!(cache.get_raw("k").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers_drop_corrupt_entries() {
        let cache = MokaObjectCache::new(100, 60);
        let key = user_cache_key(7);
        insert_json(&cache, key.clone(), &vec![1, 2, 3]).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, &key).await, Some(vec![1, 2, 3]));

        cache.insert_raw(key.clone(), "not json".to_string()).await;
        assert_eq!(get_json::<Vec<i32>>(&cache, &key).await, None);
        assert_eq!(cache.get_raw(&key).await, CacheResult::NotFound);
    }
}
