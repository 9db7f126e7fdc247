use crate::cache::error::CacheError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// # Summary
/// 业务无关的带过期异步 KV 存储接口 (Port)。
///
/// # Invariants
/// - 处理原始字节，确保 Trait 是对象安全的 (Object Safe)。
/// - 条目超过其 TTL 后对读取方不可见，由实现端惰性驱逐，不依赖后台清扫。
#[async_trait]
pub trait Cache: Send + Sync {
    /// # Summary
    /// 写入原始字节数据并附带过期时长。
    ///
    /// # Logic
    /// 1. 记录写入时刻。
    /// 2. 以原子方式覆盖同名键。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    /// * `value`: 原始字节数组。
    /// * `ttl`: 条目存活时长。
    ///
    /// # Returns
    /// 成功返回 Ok，失败返回 `CacheError`。
    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// # Summary
    /// 读取原始字节数据。
    ///
    /// # Logic
    /// 1. 根据键检索存储内容。
    /// 2. 若条目已过期，视同不存在并立即驱逐。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    ///
    /// # Returns
    /// 存活条目返回 `Some(Vec<u8>)`，缺失或过期返回 `None`。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// # Summary
    /// 删除指定键。
    ///
    /// # Arguments
    /// * `key`: 待删除的唯一键。
    ///
    /// # Returns
    /// 无论键是否存在均返回 Ok。
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// # Summary
    /// 清空全部条目。
    ///
    /// # Returns
    /// 成功返回 Ok。
    async fn clear(&self) -> Result<(), CacheError>;
}

/// # Summary
/// 缓存泛型扩展接口，提供便捷的 JSON 序列化支持。
///
/// # Invariants
/// - 自动为所有实现 `Cache` 的类型提供支持。
#[async_trait]
pub trait CacheExt: Cache {
    /// # Summary
    /// 存入强类型对象。
    ///
    /// # Logic
    /// 1. 使用 JSON 序列化对象。
    /// 2. 调用底层 `set_raw` 写入。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    /// * `value`: 实现了 Serialize 的对象引用。
    /// * `ttl`: 条目存活时长。
    ///
    /// # Returns
    /// 操作结果。
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialize(e.to_string()))?;
        self.set_raw(key, bytes, ttl).await
    }

    /// # Summary
    /// 取出强类型对象。
    ///
    /// # Logic
    /// 1. 调用底层 `get_raw` 获取字节。
    /// 2. 使用 JSON 反序列化为目标类型。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    ///
    /// # Returns
    /// 反序列化后的对象或 None；条目损坏返回 `CacheError::Deserialize`，
    /// 由调用方决定降级策略。
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let val = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Deserialize(e.to_string()))?;
                Ok(Some(val))
            }
            None => Ok(None),
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
