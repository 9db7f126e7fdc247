use crate::common::{Adjustment, KlineInterval};
use crate::market::error::MarketError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `low <= min(open, close) <= max(open, close) <= high`。
/// - 价格均为正数，`volume` 与 `amount` 非负。
/// - 产出后不可变；序列刷新时整体替换而非原地修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    // K 线开始时间
    pub time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量
    pub volume: f64,
    // 成交额 (可选)
    pub amount: Option<f64>,
}

impl Candle {
    /// # Summary
    /// 校验单根 K 线是否满足 OHLC 不变量。
    ///
    /// # Logic
    /// 1. 价格必须为正且有穷。
    /// 2. `low` 不高于开收盘中的较小者，`high` 不低于较大者。
    /// 3. 成交量与成交额非负。
    ///
    /// # Returns
    /// 满足全部约束返回 true。
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if self.volume < 0.0 || self.amount.is_some_and(|a| a < 0.0) {
            return false;
        }
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// # Summary
/// 序列来源标记，区分真实行情与降级合成数据。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeriesSource {
    // 来自远端数据服务的真实行情
    Real,
    // 网络不可用时本地合成的兜底序列
    Synthetic,
}

/// # Summary
/// K 线序列实体：同一标的、同一周期、同一复权方式下按时间升序排列的
/// K 线集合。
///
/// # Invariants
/// - `candles` 时间严格递增、无重复时间戳。
/// - 创建后只读；刷新时由网关整体替换。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    // 证券代码
    pub symbol: String,
    // K 线周期
    pub interval: KlineInterval,
    // 复权方式
    pub adjustment: Adjustment,
    // 数据来源标记
    pub source: SeriesSource,
    // K 线集合（时间升序）
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// # Summary
    /// 校验整条序列是否结构良好。
    ///
    /// # Logic
    /// 1. 每根 K 线各自满足 OHLC 不变量。
    /// 2. 相邻时间戳严格递增（隐含无重复）。
    ///
    /// # Returns
    /// 结构良好返回 true。
    pub fn is_well_formed(&self) -> bool {
        self.candles.iter().all(Candle::is_valid)
            && self.candles.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// 最新收盘价
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// 倒数第二根的收盘价（昨收）
    pub fn prev_close(&self) -> Option<f64> {
        let len = self.candles.len();
        if len < 2 {
            return None;
        }
        self.candles.get(len - 2).map(|c| c.close)
    }

    /// # Summary
    /// 按日期范围裁剪出新序列，原序列保持不变。
    ///
    /// # Logic
    /// 1. 逐根比较 K 线的自然日。
    /// 2. `start` / `end` 均为闭区间端点，None 表示该侧不限。
    ///
    /// # Arguments
    /// * `start`: 起始日期（含）。
    /// * `end`: 截止日期（含）。
    ///
    /// # Returns
    /// 仅含命中区间 K 线的新序列。
    pub fn clipped(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> CandleSeries {
        if start.is_none() && end.is_none() {
            return self.clone();
        }
        let candles = self
            .candles
            .iter()
            .filter(|c| {
                let day = c.time.date_naive();
                start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
            })
            .cloned()
            .collect();
        CandleSeries {
            symbol: self.symbol.clone(),
            interval: self.interval,
            adjustment: self.adjustment,
            source: self.source,
            candles,
        }
    }
}

/// # Summary
/// K 线查询参数值对象，网关及数据源端口的统一入参。
///
/// # Invariants
/// - `symbol` 非空，`limit` 大于零，`start <= end`（由 `validate` 把关）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlineQuery {
    // 证券代码 (例如: 600519.SH)
    pub symbol: String,
    // K 线周期
    pub interval: KlineInterval,
    // 复权方式
    pub adjustment: Adjustment,
    // 起始日期（含，可选）
    pub start: Option<NaiveDate>,
    // 截止日期（含，可选）
    pub end: Option<NaiveDate>,
    // 期望的 K 线数量（合成兜底时精确生成该数量）
    pub limit: usize,
}

impl KlineQuery {
    /// # Summary
    /// 构造使用默认数量上限的查询。
    pub fn new(symbol: impl Into<String>, interval: KlineInterval, adjustment: Adjustment) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            adjustment,
            start: None,
            end: None,
            limit: 200,
        }
    }

    /// # Summary
    /// 校验查询参数合法性。
    ///
    /// # Logic
    /// 1. symbol 非空。
    /// 2. limit 大于零。
    /// 3. 起止日期若同时存在则须有序。
    ///
    /// # Returns
    /// 非法参数返回 `MarketError::InvalidQuery`。
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.symbol.trim().is_empty() {
            return Err(MarketError::InvalidQuery("empty symbol".to_string()));
        }
        if self.limit == 0 {
            return Err(MarketError::InvalidQuery("limit must be > 0".to_string()));
        }
        if let (Some(s), Some(e)) = (self.start, self.end)
            && s > e
        {
            return Err(MarketError::InvalidQuery(format!(
                "start {} after end {}",
                s, e
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(ts: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: Utc.timestamp_opt(ts, 0).single().expect("valid ts"),
            open,
            high,
            low,
            close,
            volume: 100.0,
            amount: None,
        }
    }

    #[test]
    fn test_candle_invariant() {
        assert!(candle(0, 10.0, 11.0, 9.5, 10.5).is_valid());
        // high 低于收盘价
        assert!(!candle(0, 10.0, 10.2, 9.5, 10.5).is_valid());
        // low 高于开盘价
        assert!(!candle(0, 10.0, 11.0, 10.2, 10.5).is_valid());
        // 非正价格
        assert!(!candle(0, 0.0, 11.0, 0.0, 10.5).is_valid());
    }

    #[test]
    fn test_series_well_formed_requires_ascending_time() {
        let mut series = CandleSeries {
            symbol: "600519.SH".to_string(),
            interval: KlineInterval::Day1,
            adjustment: Adjustment::Qfq,
            source: SeriesSource::Real,
            candles: vec![
                candle(86400, 10.0, 11.0, 9.5, 10.5),
                candle(172800, 10.5, 11.5, 10.0, 11.0),
            ],
        };
        assert!(series.is_well_formed());
        series.candles.swap(0, 1);
        assert!(!series.is_well_formed());
    }

    #[test]
    fn test_series_clipped_is_inclusive() {
        let series = CandleSeries {
            symbol: "600519.SH".to_string(),
            interval: KlineInterval::Day1,
            adjustment: Adjustment::Qfq,
            source: SeriesSource::Real,
            candles: (1..=5)
                .map(|d| candle(d * 86400, 10.0, 11.0, 9.5, 10.5))
                .collect(),
        };
        let start = NaiveDate::from_ymd_opt(1970, 1, 3).expect("valid date");
        let end = NaiveDate::from_ymd_opt(1970, 1, 5).expect("valid date");
        let clipped = series.clipped(Some(start), Some(end));
        assert_eq!(clipped.candles.len(), 3);
        // 原序列不受影响
        assert_eq!(series.candles.len(), 5);
    }

    #[test]
    fn test_query_validation() {
        let mut q = KlineQuery::new("600519.SH", KlineInterval::Day1, Adjustment::Qfq);
        assert!(q.validate().is_ok());
        q.limit = 0;
        assert!(matches!(
            q.validate(),
            Err(MarketError::InvalidQuery(_))
        ));
        q.limit = 10;
        q.start = NaiveDate::from_ymd_opt(2024, 5, 1);
        q.end = NaiveDate::from_ymd_opt(2024, 4, 1);
        assert!(matches!(q.validate(), Err(MarketError::InvalidQuery(_))));
        q.symbol = " ".to_string();
        q.start = None;
        q.end = None;
        assert!(matches!(q.validate(), Err(MarketError::InvalidQuery(_))));
    }
}
