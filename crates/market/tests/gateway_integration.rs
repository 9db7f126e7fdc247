use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use kanpan_cache::mem::TtlMemCache;
use kanpan_core::cache::port::Cache;
use kanpan_core::common::time::FakeClockProvider;
use kanpan_core::common::{Adjustment, KlineInterval};
use kanpan_core::config::MarketConfig;
use kanpan_core::market::entity::{Candle, KlineQuery, SeriesSource};
use kanpan_core::market::error::MarketError;
use kanpan_core::market::port::KlineProvider;
use kanpan_feed::synth::SynthKlineProvider;
use kanpan_market::gateway::KlineGateway;
use kanpan_market::key::series_key;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// # Summary
/// 为测试提供的模拟真实数据源，记录被调用次数。
struct CountingProvider {
    calls: AtomicUsize,
    payload: Result<Vec<Candle>, ()>,
}

impl CountingProvider {
    fn with_days(days: i64) -> Self {
        let candles = (1..=days)
            .map(|d| Candle {
                time: Utc
                    .with_ymd_and_hms(2024, 1, 1, 7, 0, 0)
                    .single()
                    .expect("valid time")
                    + chrono::Duration::days(d),
                open: 100.0 + f64::from(i32::try_from(d).unwrap_or(0)),
                high: 102.0 + f64::from(i32::try_from(d).unwrap_or(0)),
                low: 99.0 + f64::from(i32::try_from(d).unwrap_or(0)),
                close: 101.0 + f64::from(i32::try_from(d).unwrap_or(0)),
                volume: 1000.0,
                amount: None,
            })
            .collect();
        Self {
            calls: AtomicUsize::new(0),
            payload: Ok(candles),
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            payload: Err(()),
        }
    }

    fn empty() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            payload: Ok(vec![]),
        }
    }

    fn malformed() -> Self {
        // high 低于 low，破坏 OHLC 不变量
        Self {
            calls: AtomicUsize::new(0),
            payload: Ok(vec![Candle {
                time: Utc::now(),
                open: 10.0,
                high: 9.0,
                low: 11.0,
                close: 10.0,
                volume: 1.0,
                amount: None,
            }]),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KlineProvider for CountingProvider {
    async fn fetch_klines(&self, _: &KlineQuery) -> Result<Vec<Candle>, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.payload {
            Ok(candles) => Ok(candles.clone()),
            Err(()) => Err(MarketError::Network("connection severed".to_string())),
        }
    }
}

fn build_gateway(real: Arc<CountingProvider>) -> (KlineGateway, Arc<TtlMemCache>) {
    let cache = Arc::new(TtlMemCache::new());
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0)
            .single()
            .expect("valid time"),
    ));
    let fallback = Arc::new(SynthKlineProvider::new(clock));
    let gateway = KlineGateway::new(
        cache.clone(),
        real,
        fallback,
        &MarketConfig {
            base_url: String::new(),
            timeout_secs: 1,
            intraday_ttl_secs: 60,
            daily_ttl_secs: 3600,
            default_limit: 200,
        },
    );
    (gateway, cache)
}

fn day_query() -> KlineQuery {
    KlineQuery::new("600519.SH", KlineInterval::Day1, Adjustment::Qfq)
}

#[tokio::test]
async fn test_second_fetch_within_ttl_hits_cache() {
    let real = Arc::new(CountingProvider::with_days(10));
    let (gateway, _cache) = build_gateway(real.clone());
    let query = day_query();

    let first = gateway.fetch_series(&query).await.expect("should fetch");
    let second = gateway.fetch_series(&query).await.expect("should fetch");

    // 幂等：TTL 窗口内第二次请求不再触网，且两次结果深度相等
    assert_eq!(real.call_count(), 1);
    assert_eq!(first.candles, second.candles);
    assert_eq!(first.source, SeriesSource::Real);
}

#[tokio::test]
async fn test_narrower_range_reuses_cached_full_series() {
    let real = Arc::new(CountingProvider::with_days(10));
    let (gateway, _cache) = build_gateway(real.clone());

    let broad = gateway.fetch_series(&day_query()).await.expect("should fetch");
    assert_eq!(broad.candles.len(), 10);

    let mut narrow = day_query();
    narrow.start = chrono::NaiveDate::from_ymd_opt(2024, 1, 4);
    narrow.end = chrono::NaiveDate::from_ymd_opt(2024, 1, 6);
    let subset = gateway.fetch_series(&narrow).await.expect("should fetch");

    // 窄区间请求命中宽覆盖的缓存条目：不触网，只裁剪
    assert_eq!(real.call_count(), 1);
    assert_eq!(subset.candles.len(), 3);
}

#[tokio::test]
async fn test_severed_network_degrades_to_synthetic() {
    let real = Arc::new(CountingProvider::failing());
    let (gateway, cache) = build_gateway(real.clone());
    let query = day_query();

    let series = gateway.fetch_series(&query).await.expect("must not throw");

    assert_eq!(series.source, SeriesSource::Synthetic);
    assert_eq!(series.candles.len(), query.limit);
    assert!(series.is_well_formed());
    // 合成序列不得写入缓存，下一次请求必须重试网络
    assert!(cache.is_empty());
    let _ = gateway.fetch_series(&query).await.expect("must not throw");
    assert_eq!(real.call_count(), 2);
}

#[tokio::test]
async fn test_empty_and_malformed_payloads_degrade_to_synthetic() {
    for real in [
        Arc::new(CountingProvider::empty()),
        Arc::new(CountingProvider::malformed()),
    ] {
        let (gateway, cache) = build_gateway(real);
        let series = gateway
            .fetch_series(&day_query())
            .await
            .expect("must not throw");
        assert_eq!(series.source, SeriesSource::Synthetic);
        assert!(!series.candles.is_empty());
        assert!(cache.is_empty());
    }
}

#[tokio::test]
async fn test_corrupt_cache_entry_is_evicted_and_refetched() {
    let real = Arc::new(CountingProvider::with_days(5));
    let (gateway, cache) = build_gateway(real.clone());
    let query = day_query();

    // 预置一条无法反序列化的损坏条目
    let key = series_key(&query.symbol, query.interval, query.adjustment, None, None);
    cache
        .set_raw(&key, b"garbage".to_vec(), Duration::from_secs(3600))
        .await
        .expect("should seed");

    let series = gateway.fetch_series(&query).await.expect("should fetch");
    assert_eq!(series.source, SeriesSource::Real);
    assert_eq!(real.call_count(), 1);

    // 损坏条目已被健康数据覆盖
    let second = gateway.fetch_series(&query).await.expect("should fetch");
    assert_eq!(real.call_count(), 1);
    assert_eq!(second.candles.len(), 5);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache_read() {
    let real = Arc::new(CountingProvider::with_days(5));
    let (gateway, _cache) = build_gateway(real.clone());
    let query = day_query();

    let _ = gateway.fetch_series(&query).await.expect("should fetch");
    let _ = gateway
        .fetch_series_with(&query, true)
        .await
        .expect("should fetch");
    assert_eq!(real.call_count(), 2);

    // 强刷后的结果重新写入缓存，普通请求继续命中
    let _ = gateway.fetch_series(&query).await.expect("should fetch");
    assert_eq!(real.call_count(), 2);
}

#[tokio::test]
async fn test_invalid_query_propagates_as_contract_error() {
    let real = Arc::new(CountingProvider::with_days(5));
    let (gateway, _cache) = build_gateway(real.clone());

    let mut query = day_query();
    query.symbol = String::new();
    assert!(matches!(
        gateway.fetch_series(&query).await,
        Err(MarketError::InvalidQuery(_))
    ));
    assert_eq!(real.call_count(), 0);
}
