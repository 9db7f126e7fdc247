use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// A 股板块分类，决定适用的涨跌幅限制档位。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Board {
    // 沪深主板 (10%)
    Main,
    // 科创板 688xxx (20%)
    Star,
    // 创业板 300/301xxx (20%)
    ChiNext,
    // 北交所 (30%)
    Bse,
}

/// # Summary
/// 涨跌停价位实体，由昨收与限制比例推导。
///
/// # Invariants
/// - 价格按最小报价单位（0.01 元）四舍五入（round-half-up）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLimit {
    // 涨停价
    pub limit_up: Decimal,
    // 跌停价
    pub limit_down: Decimal,
    // 适用的限制比例 (0.10 表示 10%)
    pub limit_pct: Decimal,
}

/// # Summary
/// 交收制度枚举。当前市场变体恒为 T+1，T+0 仅为类型层面的前向兼容。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettlementStatus {
    TPlusOne,
    TPlusZero,
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementStatus::TPlusOne => write!(f, "T+1"),
            SettlementStatus::TPlusZero => write!(f, "T+0"),
        }
    }
}

/// # Summary
/// T+1 可卖状态实体：N 日买入的股份 N+1 日方可卖出。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct T1Status {
    // 买入日期
    pub buy_date: NaiveDate,
    // 可卖出日期
    pub sellable_date: NaiveDate,
    // 交收制度
    pub status: SettlementStatus,
}
