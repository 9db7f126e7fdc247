use async_trait::async_trait;
use dashmap::DashMap;
use kanpan_core::cache::error::CacheError;
use kanpan_core::cache::port::Cache;
use std::time::{Duration, Instant};

/// 单条缓存记录：字节载荷 + 写入时刻 + 存活时长
struct Entry {
    value: Vec<u8>,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= self.ttl
    }
}

/// # Summary
/// 基于 DashMap 的带过期内存缓存实现。
///
/// # Invariants
/// - 所有操作均通过并发哈希表 `DashMap` 执行，保证多线程安全。
/// - 过期条目在下一次读取时惰性驱逐，不运行后台清扫任务。
/// - 条目属派生可重建数据，写入冲突采用 last-writer-wins。
pub struct TtlMemCache {
    // 线程安全的 KV 存储容器
    storage: DashMap<String, Entry>,
}

impl TtlMemCache {
    /// # Summary
    /// 创建一个新的 TtlMemCache 实例。
    ///
    /// # Logic
    /// 初始化底层的 DashMap 存储引擎。
    ///
    /// # Returns
    /// * `Self` - 初始化的缓存实例。
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// 当前存量条目数（含尚未被惰性驱逐的过期条目）
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for TtlMemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for TtlMemCache {
    /// # Summary
    /// 写入原始字节数据并记录写入时刻。
    ///
    /// # Logic
    /// 将 Key 与带时间戳的 Entry 一并插入哈希表。若存在同名 Key 则覆盖。
    ///
    /// # Arguments
    /// * `key`: 唯一索引。
    /// * `value`: 待存入的字节序列。
    /// * `ttl`: 条目存活时长。
    ///
    /// # Returns
    /// * `Result<(), CacheError>` - 始终返回 Ok，除非内存分配失败。
    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.storage.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    /// # Summary
    /// 读取原始字节数据，过期条目视同缺失。
    ///
    /// # Logic
    /// 1. 从哈希表中检索 Key 对应的条目。
    /// 2. 若条目年龄已达 TTL，立即移除并返回 None（无静默陈旧）。
    /// 3. 否则克隆为独立的所有权对象返回。
    ///
    /// # Arguments
    /// * `key`: 唯一索引。
    ///
    /// # Returns
    /// * `Result<Option<Vec<u8>>, CacheError>` - 存活则返回克隆的数据，否则返回 None。
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        let expired = match self.storage.get(key) {
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => return Ok(Some(entry.value.clone())),
            None => return Ok(None),
        };
        if expired {
            self.storage.remove(key);
        }
        Ok(None)
    }

    /// # Summary
    /// 删除指定键。
    ///
    /// # Arguments
    /// * `key`: 待删除的唯一索引。
    ///
    /// # Returns
    /// * `Result<(), CacheError>` - 无论键是否存在均返回 Ok。
    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove(key);
        Ok(())
    }

    /// # Summary
    /// 清空全部条目。
    ///
    /// # Returns
    /// * `Result<(), CacheError>` - 始终返回 Ok。
    async fn clear(&self) -> Result<(), CacheError> {
        self.storage.clear();
        Ok(())
    }
}
