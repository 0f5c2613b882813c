//! 对象缓存
//!
//! 目前只用于缓存已认证用户（键为 `user:{id}`），团队成员变化时由服务层主动失效。
//! 聚合统计从不经过缓存。

pub mod memory;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use memory::MokaObjectCache;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String);
    async fn remove(&self, key: &str);
}

/// 已认证用户的缓存键
pub fn user_cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

/// 读取并反序列化，内容损坏时顺便删除
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!("Dropping undecodable cache entry {}: {}", key, err);
                cache.remove(key).await;
                None
            }
        },
        CacheResult::NotFound => None,
    }
}

pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: String, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        cache.insert_raw(key, json).await;
    }
}
