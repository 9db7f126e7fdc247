use crate::board::entity::{PriceLimit, T1Status};
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 交易日历接口，可选协作者。未注入时 T+1 采用自然日算术。
pub trait TradingCalendar: Send + Sync {
    /// 判断给定日期是否为交易日
    fn is_trading_day(&self, date: NaiveDate) -> bool;
}

/// # Summary
/// 服务端交易板规则交叉校验接口（可选）。
///
/// # Invariants
/// - 本地计算器必须在无网络时独立产出与服务端一致的结果，
///   本端口仅用于在线环境下的对账。
#[async_trait]
pub trait BoardRuleProvider: Send + Sync {
    /// # Summary
    /// 查询服务端计算的涨跌停价位。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `date`: 交易日。
    /// * `prev_close`: 昨收价。
    ///
    /// # Returns
    /// 成功返回涨跌停价位。
    async fn fetch_stop_limit(
        &self,
        symbol: &str,
        date: NaiveDate,
        prev_close: f64,
    ) -> Result<PriceLimit, MarketError>;

    /// # Summary
    /// 查询服务端计算的 T+1 可卖日期。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `buy_date`: 买入日期。
    ///
    /// # Returns
    /// 成功返回交收状态。
    async fn fetch_t1_sellable(
        &self,
        symbol: &str,
        buy_date: NaiveDate,
    ) -> Result<T1Status, MarketError>;
}
