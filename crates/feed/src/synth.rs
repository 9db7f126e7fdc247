use async_trait::async_trait;
use kanpan_core::common::time::TimeProvider;
use kanpan_core::market::entity::{Candle, KlineQuery};
use kanpan_core::market::error::MarketError;
use kanpan_core::market::port::KlineProvider;
use std::sync::Arc;
use tracing::debug;

/// FNV-1a 64 位散列，用于从请求参数派生随机游走种子
fn fnv1a64(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// # Summary
/// xorshift64* 伪随机数发生器。
///
/// # Invariants
/// - 同一种子产生完全相同的序列（合成数据可复现的根本保证）。
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // 种子为零会使发生器停摆
        Self {
            state: if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// 产出 [0, 1) 区间的均匀浮点数（取高 24 位拼尾数）
    fn next_unit(&mut self) -> f64 {
        let bits = u32::try_from(self.next_u64() >> 40).unwrap_or(0);
        f64::from(bits) / f64::from(1u32 << 24)
    }
}

/// # Summary
/// 确定性合成 K 线数据源：网络不可用时的兜底实现。
///
/// # Invariants
/// - 相同查询参数产出逐位相同的序列（种子由参数派生）。
/// - 生成的每根 K 线都满足 OHLC 不变量（构造即保证）。
/// - 序列以 `TimeProvider::now()` 为终点、按周期间隔倒排时间。
pub struct SynthKlineProvider {
    // 时间供给器（测试中注入虚拟时钟以固定序列终点）
    time: Arc<dyn TimeProvider>,
}

impl SynthKlineProvider {
    /// # Summary
    /// 创建合成数据源。
    ///
    /// # Arguments
    /// * `time`: 时间供给器。
    ///
    /// # Returns
    /// 实例。
    pub fn new(time: Arc<dyn TimeProvider>) -> Self {
        Self { time }
    }

    /// # Summary
    /// 从证券代码派生基准价格。
    ///
    /// # Logic
    /// 代码散列落入 [5.00, 200.00) 区间，保证同一代码的合成序列
    /// 始终围绕同一价位展开。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    ///
    /// # Returns
    /// 基准价格。
    fn base_price(symbol: &str) -> f64 {
        let bucket = u32::try_from(fnv1a64(symbol) % 19_500).unwrap_or(0);
        5.0 + f64::from(bucket) / 100.0
    }
}

#[async_trait]
impl KlineProvider for SynthKlineProvider {
    /// # Summary
    /// 本地合成一条统计上合理的 K 线序列。
    ///
    /// # Logic
    /// 1. 以 (symbol, interval, adjustment, limit) 派生种子。
    /// 2. 从基准价起步做 ±2% 随机游走，逐根生成 open/close。
    /// 3. high/low 在开收盘两侧各加不超过 1.1% 的影线，保证不变量。
    /// 4. 时间轴以当前时刻为终点、按周期间隔回排，共 `limit` 根。
    ///
    /// # Arguments
    /// * `query`: K 线查询参数。
    ///
    /// # Returns
    /// 恒定成功，返回精确 `limit` 根 K 线。
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Candle>, MarketError> {
        query.validate()?;

        let seed_input = format!(
            "{}|{}|{}|{}",
            query.symbol, query.interval, query.adjustment, query.limit
        );
        let mut rng = XorShift64::new(fnv1a64(&seed_input));
        debug!(symbol = %query.symbol, interval = %query.interval, "synthesizing kline series");

        let step = query.interval.duration();
        let count = i32::try_from(query.limit).unwrap_or(i32::MAX);
        let end_time = self.time.now();

        let mut candles = Vec::with_capacity(query.limit);
        let mut prev_close = Self::base_price(&query.symbol);

        for i in 0..count {
            let open = prev_close;
            let drift = (rng.next_unit() - 0.5) * 0.04;
            let close = (open * (1.0 + drift)).max(0.01);

            let upper_wick = 0.001 + rng.next_unit() * 0.01;
            let lower_wick = 0.001 + rng.next_unit() * 0.01;
            let high = open.max(close) * (1.0 + upper_wick);
            let low = open.min(close) * (1.0 - lower_wick);

            let volume = (10_000.0 + rng.next_unit() * 90_000.0).floor();
            let amount = volume * (open + close) / 2.0;

            candles.push(Candle {
                time: end_time - step * (count - 1 - i),
                open,
                high,
                low,
                close,
                volume,
                amount: Some(amount),
            });
            prev_close = close;
        }

        Ok(candles)
    }
}
