use crate::key::series_key;
use kanpan_core::cache::port::{Cache, CacheExt};
use kanpan_core::config::MarketConfig;
use kanpan_core::market::entity::{CandleSeries, KlineQuery, SeriesSource};
use kanpan_core::market::error::MarketError;
use kanpan_core::market::port::KlineProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// # Summary
/// K 线数据网关：组合缓存、真实数据源与合成兜底数据源。
///
/// # Invariants
/// - 缓存中只存放真实行情的完整（未裁剪）序列；合成序列永不入缓存，
///   因而不可能遮蔽已缓存的真实数据。
/// - 传输/解析类失败在此层吸收并降级，调用方只会看到契约错误。
/// - 缓存实例由应用根构造并注入，多网关共享（无隐藏全局状态）。
pub struct KlineGateway {
    // 共享缓存实例
    cache: Arc<dyn Cache>,
    // 真实数据源驱动
    real: Arc<dyn KlineProvider>,
    // 合成兜底数据源驱动
    fallback: Arc<dyn KlineProvider>,
    // 日内周期条目 TTL
    intraday_ttl: Duration,
    // 日线及以上周期条目 TTL
    daily_ttl: Duration,
}

impl KlineGateway {
    /// # Summary
    /// 构造网关实例。
    ///
    /// # Arguments
    /// * `cache`: 共享缓存。
    /// * `real`: 真实数据源。
    /// * `fallback`: 合成兜底数据源。
    /// * `config`: 行情管线配置（TTL 档位）。
    ///
    /// # Returns
    /// 网关实例。
    pub fn new(
        cache: Arc<dyn Cache>,
        real: Arc<dyn KlineProvider>,
        fallback: Arc<dyn KlineProvider>,
        config: &MarketConfig,
    ) -> Self {
        Self {
            cache,
            real,
            fallback,
            intraday_ttl: Duration::from_secs(config.intraday_ttl_secs),
            daily_ttl: Duration::from_secs(config.daily_ttl_secs),
        }
    }

    /// 按周期档位选择 TTL（日内短、日线以上长）
    fn ttl_for(&self, query: &KlineQuery) -> Duration {
        if query.interval.is_intraday() {
            self.intraday_ttl
        } else {
            self.daily_ttl
        }
    }

    /// # Summary
    /// 获取 K 线序列（默认走缓存）。
    ///
    /// # Arguments
    /// * `query`: K 线查询参数。
    ///
    /// # Returns
    /// 恒有可渲染序列；仅契约错误上抛。
    pub async fn fetch_series(&self, query: &KlineQuery) -> Result<CandleSeries, MarketError> {
        self.fetch_series_with(query, false).await
    }

    /// # Summary
    /// 获取 K 线序列，可选跳过缓存读取。
    ///
    /// # Logic
    /// 1. 校验查询参数（契约错误直接上抛）。
    /// 2. 除非 `force_refresh`，先查缓存：命中则按请求日期区间裁剪返回；
    ///    条目损坏则告警、驱逐并视同未命中。
    /// 3. 未命中调用真实数据源：结构良好且非空则以完整序列入缓存
    ///    （裁剪前写入，窄区间的后续请求可复用同一条目），返回裁剪副本。
    /// 4. 失败、空载荷或结构破损则降级到合成数据源，结果标记
    ///    `Synthetic` 且不写缓存。
    ///
    /// # Arguments
    /// * `query`: K 线查询参数。
    /// * `force_refresh`: 为 true 时跳过缓存读取（仍会写入）。
    ///
    /// # Returns
    /// K 线序列。
    pub async fn fetch_series_with(
        &self,
        query: &KlineQuery,
        force_refresh: bool,
    ) -> Result<CandleSeries, MarketError> {
        query.validate()?;

        // 缓存键不含日期区间：存完整序列，读时裁剪
        let key = series_key(&query.symbol, query.interval, query.adjustment, None, None);

        if !force_refresh {
            match self.cache.get::<CandleSeries>(&key).await {
                Ok(Some(series)) => {
                    debug!(key = %key, "kline cache hit");
                    return Ok(series.clipped(query.start, query.end));
                }
                Ok(None) => {}
                Err(e) => {
                    // 损坏条目视同未命中：告警并驱逐，绝不上抛
                    warn!(key = %key, error = %e, "corrupt cache entry, evicting");
                    if let Err(del_err) = self.cache.del(&key).await {
                        warn!(key = %key, error = %del_err, "failed to evict corrupt entry");
                    }
                }
            }
        }

        // 向真实数据源请求完整序列（不带日期区间）
        let full_query = KlineQuery {
            start: None,
            end: None,
            ..query.clone()
        };

        match self.real.fetch_klines(&full_query).await {
            Ok(candles) if !candles.is_empty() => {
                let series = CandleSeries {
                    symbol: query.symbol.clone(),
                    interval: query.interval,
                    adjustment: query.adjustment,
                    source: SeriesSource::Real,
                    candles,
                };
                if series.is_well_formed() {
                    if let Err(e) = self.cache.set(&key, &series, self.ttl_for(query)).await {
                        warn!(key = %key, error = %e, "failed to cache kline series");
                    }
                    return Ok(series.clipped(query.start, query.end));
                }
                warn!(symbol = %query.symbol, "upstream payload violates OHLC invariant, falling back");
            }
            Ok(_) => {
                warn!(symbol = %query.symbol, "upstream returned empty payload, falling back");
            }
            Err(e) if e.is_recoverable() => {
                warn!(symbol = %query.symbol, error = %e, "upstream fetch failed, falling back");
            }
            Err(e) => return Err(e),
        }

        self.synthesize(query, &full_query).await
    }

    /// # Summary
    /// 合成兜底路径：产出标记为 Synthetic 的序列，不写缓存。
    async fn synthesize(
        &self,
        query: &KlineQuery,
        full_query: &KlineQuery,
    ) -> Result<CandleSeries, MarketError> {
        let candles = self.fallback.fetch_klines(full_query).await?;
        let series = CandleSeries {
            symbol: query.symbol.clone(),
            interval: query.interval,
            adjustment: query.adjustment,
            source: SeriesSource::Synthetic,
            candles,
        };
        Ok(series.clipped(query.start, query.end))
    }

    /// # Summary
    /// 清空底层缓存（委托调用，不触发任何重载）。
    pub async fn clear_cache(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "failed to clear kline cache");
        }
    }
}
