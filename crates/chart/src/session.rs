use chrono::NaiveDate;
use kanpan_board::{board_limit_pct, board_of, compute_limits};
use kanpan_core::board::entity::PriceLimit;
use kanpan_core::common::{Adjustment, KlineInterval};
use kanpan_core::indicator::entity::{IndicatorKind, IndicatorResult};
use kanpan_core::indicator::error::IndicatorError;
use kanpan_core::market::entity::{CandleSeries, KlineQuery};
use kanpan_core::market::error::MarketError;
use kanpan_market::gateway::KlineGateway;
use kanpan_market::key::indicator_key;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// # Summary
/// 会话层错误枚举：自身的状态契约错误，以及从下层透传的契约错误。
#[derive(Error, Debug)]
pub enum SessionError {
    // 尚未加载任何序列就请求派生计算
    #[error("No series loaded")]
    NoSeries,
    // 指标契约错误透传
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
    // 行情契约错误透传
    #[error(transparent)]
    Market(#[from] MarketError),
}

/// # Summary
/// 会话状态机相位：`Idle → Loading → {Ready, Failed}`，
/// 任一选择器变化都会重入 `Loading`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// 环比涨跌：绝对变动与百分比
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub change: f64,
    pub percent: f64,
}

/// # Summary
/// 指标参数集，未指定时采用常见看盘默认值。
#[derive(Debug, Clone)]
pub struct IndicatorParams {
    // MA 周期组（主图多均线）
    pub ma_periods: Vec<usize>,
    // EMA 周期组
    pub ema_periods: Vec<usize>,
    // 布林带 (周期, 倍数)
    pub boll: (usize, f64),
    // RSI 周期
    pub rsi_period: usize,
    // MACD (快, 慢, 信号)
    pub macd: (usize, usize, usize),
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_periods: vec![5, 10, 20, 30],
            ema_periods: vec![12, 26],
            boll: (20, 2.0),
            rsi_period: 14,
            macd: (12, 26, 9),
        }
    }
}

/// 会话可变状态（短临界区读写，绝不跨 await 持锁）
#[derive(Default)]
struct SessionState {
    selectors: Option<KlineQuery>,
    series: Option<CandleSeries>,
    board_rule: Option<PriceLimit>,
    loading: bool,
    error: Option<String>,
}

/// # Summary
/// 会话状态只读快照，供 UI 协作者一次性读取。
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub selectors: Option<KlineQuery>,
    pub series: Option<CandleSeries>,
    pub board_rule: Option<PriceLimit>,
    pub loading: bool,
    pub error: Option<String>,
}

/// # Summary
/// 图表会话编排器。每个图表视图各建一个会话，视图卸载时随之销毁。
///
/// # Invariants
/// - 选择器每变化一次恰好触发一轮加载循环。
/// - 陈旧响应守卫：落后的加载结果在解析时与单调递增的代际计数器
///   比对，不匹配即丢弃，会话绝不展示非当前标的的价格数据。
/// - 加载失败（契约错误）保留上一份完好序列，只翻转 error/loading。
pub struct ChartSession {
    // K 线数据网关
    gateway: Arc<KlineGateway>,
    // 会话状态
    state: RwLock<SessionState>,
    // 请求代际计数器（陈旧响应守卫）
    generation: AtomicU64,
    // 指标结果记忆化（序列替换时整体失效）
    memo: Mutex<HashMap<String, IndicatorResult>>,
    // 单次加载请求的 K 线数量
    default_limit: usize,
}

impl ChartSession {
    /// # Summary
    /// 创建图表会话。
    ///
    /// # Arguments
    /// * `gateway`: 共享的 K 线网关。
    /// * `default_limit`: 每轮加载请求的 K 线数量。
    ///
    /// # Returns
    /// 会话实例（按 Arc 共享给调用任务）。
    pub fn new(gateway: Arc<KlineGateway>, default_limit: usize) -> Self {
        Self {
            gateway,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
            memo: Mutex::new(HashMap::new()),
            default_limit,
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// # Summary
    /// 设置选择器并同步触发一轮加载循环。
    ///
    /// # Logic
    /// 1. 组装查询并递增代际计数器。
    /// 2. `loading = true`、`error = None` 后调用网关。
    /// 3. 结果解析时执行陈旧响应守卫，落后的结果直接丢弃。
    /// 4. 成功则替换序列、由末两根收盘价重算板规则、失效指标记忆；
    ///    契约错误则记录 error，保留旧序列。
    ///
    /// # Arguments
    /// * `symbol` / `interval` / `adjustment`: 选择器三元组。
    /// * `start` / `end`: 可选日期区间。
    ///
    /// # Returns
    /// 契约错误上抛（同时已记录在会话状态中）。
    pub async fn load(
        &self,
        symbol: impl Into<String>,
        interval: KlineInterval,
        adjustment: Adjustment,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), SessionError> {
        let query = KlineQuery {
            symbol: symbol.into(),
            interval,
            adjustment,
            start,
            end,
            limit: self.default_limit,
        };
        self.run_cycle(query, false).await
    }

    /// # Summary
    /// 以当前选择器重跑加载循环。
    ///
    /// # Arguments
    /// * `force_refresh`: 为 true 时本次绕过缓存读取。
    ///
    /// # Returns
    /// 尚无选择器时为空操作。
    pub async fn reload(&self, force_refresh: bool) -> Result<(), SessionError> {
        let selectors = { self.read_state().selectors.clone() };
        match selectors {
            Some(query) => self.run_cycle(query, force_refresh).await,
            None => {
                debug!("reload without selectors, ignoring");
                Ok(())
            }
        }
    }

    async fn run_cycle(&self, query: KlineQuery, force_refresh: bool) -> Result<(), SessionError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.write_state();
            state.selectors = Some(query.clone());
            state.loading = true;
            state.error = None;
        }

        let result = self.gateway.fetch_series_with(&query, force_refresh).await;

        // 陈旧响应守卫：期间有更新的加载启动过，本结果作废
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(symbol = %query.symbol, "discarding stale load result");
            return Ok(());
        }

        match result {
            Ok(series) => {
                let board_rule = Self::board_rule_of(&series);
                {
                    let mut state = self.write_state();
                    state.board_rule = board_rule;
                    state.series = Some(series);
                    state.loading = false;
                }
                self.memo
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .clear();
                Ok(())
            }
            Err(e) => {
                // 网关只会上抛契约错误；旧序列保留，不因一次失败清空好数据
                let mut state = self.write_state();
                state.error = Some(e.to_string());
                state.loading = false;
                Err(SessionError::Market(e))
            }
        }
    }

    /// 由序列末两根收盘价与板块档位推导涨跌停
    fn board_rule_of(series: &CandleSeries) -> Option<PriceLimit> {
        let prev = series.prev_close().or_else(|| series.last_close())?;
        let prev = Decimal::from_f64_retain(prev)?;
        let pct = board_limit_pct(board_of(&series.symbol));
        match compute_limits(prev, pct) {
            Ok(limit) => Some(limit),
            Err(e) => {
                warn!(symbol = %series.symbol, error = %e, "board rule computation failed");
                None
            }
        }
    }

    /// # Summary
    /// 计算（或从记忆中取出）一组技术指标。
    ///
    /// # Logic
    /// 1. 指标名归一化为大写后与类别核对：MA/EMA/BOLL 属主图叠加，
    ///    RSI/MACD 属副图振荡器，不匹配视为契约错误。
    /// 2. 记忆化键与缓存键同构（序列身份 + 指标名 + 参数签名）。
    /// 3. 引擎本身无缓存，记忆仅存活于当前序列的生命周期内。
    ///
    /// # Arguments
    /// * `kind`: 指标类别。
    /// * `names`: 指标名列表。
    /// * `params`: 参数集。
    ///
    /// # Returns
    /// 每个指标（MA/EMA 按周期展开）一个结果。
    pub fn load_indicators(
        &self,
        kind: IndicatorKind,
        names: &[&str],
        params: &IndicatorParams,
    ) -> Result<Vec<IndicatorResult>, SessionError> {
        let series = self
            .read_state()
            .series
            .clone()
            .ok_or(SessionError::NoSeries)?;

        let mut results = Vec::new();
        for name in names {
            let upper = name.to_uppercase();
            match (upper.as_str(), kind) {
                ("MA", IndicatorKind::Overlay) => {
                    for period in &params.ma_periods {
                        let values = self.memoized(&series, "MA", &period.to_string(), || {
                            Ok(IndicatorResult::Ma {
                                period: *period,
                                values: kanpan_indicator::ma(&series.candles, *period)?,
                            })
                        })?;
                        results.push(values);
                    }
                }
                ("EMA", IndicatorKind::Overlay) => {
                    for period in &params.ema_periods {
                        let values = self.memoized(&series, "EMA", &period.to_string(), || {
                            Ok(IndicatorResult::Ema {
                                period: *period,
                                values: kanpan_indicator::ema(&series.candles, *period)?,
                            })
                        })?;
                        results.push(values);
                    }
                }
                ("BOLL", IndicatorKind::Overlay) => {
                    let (period, multiplier) = params.boll;
                    let sig = format!("{}-{}", period, multiplier);
                    let values = self.memoized(&series, "BOLL", &sig, || {
                        let bands = kanpan_indicator::boll(&series.candles, period, multiplier)?;
                        Ok(IndicatorResult::Boll {
                            upper: bands.upper,
                            middle: bands.middle,
                            lower: bands.lower,
                        })
                    })?;
                    results.push(values);
                }
                ("RSI", IndicatorKind::Oscillator) => {
                    let period = params.rsi_period;
                    let values = self.memoized(&series, "RSI", &period.to_string(), || {
                        Ok(IndicatorResult::Rsi {
                            period,
                            values: kanpan_indicator::rsi(&series.candles, period)?,
                        })
                    })?;
                    results.push(values);
                }
                ("MACD", IndicatorKind::Oscillator) => {
                    let (fast, slow, signal) = params.macd;
                    let sig = format!("{}-{}-{}", fast, slow, signal);
                    let values = self.memoized(&series, "MACD", &sig, || {
                        let m = kanpan_indicator::macd(&series.candles, fast, slow, signal)?;
                        Ok(IndicatorResult::Macd {
                            dif: m.dif,
                            dea: m.dea,
                            macd: m.macd,
                        })
                    })?;
                    results.push(values);
                }
                (other, _) => {
                    return Err(SessionError::Indicator(IndicatorError::UnknownIndicator(
                        format!("{} does not belong to {:?}", other, kind),
                    )));
                }
            }
        }
        Ok(results)
    }

    /// 记忆化包装：命中返回克隆，未命中计算后存入
    fn memoized<F>(
        &self,
        series: &CandleSeries,
        name: &str,
        params: &str,
        compute: F,
    ) -> Result<IndicatorResult, SessionError>
    where
        F: FnOnce() -> Result<IndicatorResult, IndicatorError>,
    {
        let key = indicator_key(&series.symbol, series.interval, series.adjustment, name, params);
        {
            let memo = self.memo.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = memo.get(&key) {
                return Ok(hit.clone());
            }
        }
        let computed = compute()?;
        self.memo
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, computed.clone());
        Ok(computed)
    }

    /// 当前状态机相位
    pub fn phase(&self) -> SessionPhase {
        let state = self.read_state();
        if state.loading {
            SessionPhase::Loading
        } else if state.error.is_some() {
            SessionPhase::Failed
        } else if state.series.is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::Idle
        }
    }

    /// 一次性读取会话状态快照
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read_state();
        SessionSnapshot {
            selectors: state.selectors.clone(),
            series: state.series.clone(),
            board_rule: state.board_rule,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// 最新收盘价
    pub fn latest_price(&self) -> Option<f64> {
        self.read_state().series.as_ref().and_then(CandleSeries::last_close)
    }

    /// # Summary
    /// 环比涨跌：最新收盘相对前一根收盘的变动。
    ///
    /// # Returns
    /// 序列不足两根时返回 None。
    pub fn price_change(&self) -> Option<PriceChange> {
        let state = self.read_state();
        let series = state.series.as_ref()?;
        let last = series.last_close()?;
        let prev = series.prev_close()?;
        Some(PriceChange {
            change: last - prev,
            percent: (last - prev) / prev * 100.0,
        })
    }

    /// # Summary
    /// 清空会话数据（序列、板规则、错误、指标记忆），保留选择器。
    /// 不触碰共享缓存。
    pub fn clear_data(&self) {
        {
            let mut state = self.write_state();
            state.series = None;
            state.board_rule = None;
            state.error = None;
            state.loading = false;
        }
        self.memo
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// # Summary
    /// 清空共享 K 线缓存（委托网关，不触发重载）。
    pub async fn clear_cache(&self) {
        self.gateway.clear_cache().await;
    }

    #[doc(hidden)]
    pub fn memo_size(&self) -> usize {
        self.memo.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
