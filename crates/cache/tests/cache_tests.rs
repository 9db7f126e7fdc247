use kanpan_cache::mem::TtlMemCache;
use kanpan_core::cache::port::{Cache, CacheExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TestItem {
    id: u32,
    name: String,
}

const LONG_TTL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_mem_cache_raw_ops() {
    let cache = TtlMemCache::new();
    let key = "raw_key";
    let value = vec![1, 2, 3, 4];

    // 测试存取
    cache.set_raw(key, value.clone(), LONG_TTL).await.unwrap();
    let result = cache.get_raw(key).await.unwrap().unwrap();
    assert_eq!(result, value);

    // 测试删除
    cache.del(key).await.unwrap();
    let result = cache.get_raw(key).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_mem_cache_typed_ops() {
    let cache = TtlMemCache::new();
    let key = "typed_key";
    let item = TestItem {
        id: 42,
        name: "Kanpan".to_string(),
    };

    // 使用 CacheExt 提供的 set 方法
    cache.set(key, &item, LONG_TTL).await.unwrap();

    // 使用 CacheExt 提供的 get 方法
    let result: TestItem = cache.get(key).await.unwrap().unwrap();
    assert_eq!(result, item);
}

#[tokio::test]
async fn test_mem_cache_ttl_expiry_and_lazy_eviction() {
    let cache = TtlMemCache::new();
    let key = "short_lived";

    cache
        .set_raw(key, vec![9, 9], Duration::from_millis(30))
        .await
        .unwrap();
    assert!(cache.get_raw(key).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(60)).await;

    // 过期后读取视同缺失，并立即驱逐条目
    assert!(cache.get_raw(key).await.unwrap().is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_mem_cache_corrupt_entry_reports_deserialize_error() {
    let cache = TtlMemCache::new();
    let key = "corrupt";

    // 写入无法解析为 TestItem 的字节
    cache
        .set_raw(key, b"not-json".to_vec(), LONG_TTL)
        .await
        .unwrap();

    let result = cache.get::<TestItem>(key).await;
    assert!(matches!(
        result,
        Err(kanpan_core::cache::error::CacheError::Deserialize(_))
    ));
}

#[tokio::test]
async fn test_mem_cache_clear() {
    let cache = TtlMemCache::new();
    cache.set_raw("a", vec![1], LONG_TTL).await.unwrap();
    cache.set_raw("b", vec![2], LONG_TTL).await.unwrap();
    assert_eq!(cache.len(), 2);

    cache.clear().await.unwrap();
    assert!(cache.is_empty());
    assert!(cache.get_raw("a").await.unwrap().is_none());
}
