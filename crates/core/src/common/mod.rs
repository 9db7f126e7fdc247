pub mod time;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// K 线时间周期枚举，定义单根 K 线覆盖的时间跨度。
///
/// # Invariants
/// - 周/月周期使用名义跨度（7 天 / 30 天）进行间隔推算。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KlineInterval {
    // 1分钟
    Minute1,
    // 5分钟
    Minute5,
    // 15分钟
    Minute15,
    // 30分钟
    Minute30,
    // 1小时
    Hour1,
    // 4小时
    Hour4,
    // 1日
    Day1,
    // 1周
    Week1,
    // 1月
    Month1,
}

impl KlineInterval {
    /// # Summary
    /// 返回该周期对应的名义时间跨度。
    ///
    /// # Logic
    /// 1. 分钟/小时/日直接映射。
    /// 2. 周按 7 天、月按 30 天计（仅用于合成序列的时间间隔推算）。
    ///
    /// # Returns
    /// chrono::Duration 表示的跨度。
    pub fn duration(&self) -> Duration {
        match self {
            KlineInterval::Minute1 => Duration::minutes(1),
            KlineInterval::Minute5 => Duration::minutes(5),
            KlineInterval::Minute15 => Duration::minutes(15),
            KlineInterval::Minute30 => Duration::minutes(30),
            KlineInterval::Hour1 => Duration::hours(1),
            KlineInterval::Hour4 => Duration::hours(4),
            KlineInterval::Day1 => Duration::days(1),
            KlineInterval::Week1 => Duration::days(7),
            KlineInterval::Month1 => Duration::days(30),
        }
    }

    /// # Summary
    /// 判断该周期是否为日内周期。
    ///
    /// # Logic
    /// 小于 1 日的周期均视为日内，用于决定缓存 TTL 档位。
    ///
    /// # Returns
    /// 日内周期返回 true。
    pub fn is_intraday(&self) -> bool {
        self.duration() < Duration::days(1)
    }
}

impl FromStr for KlineInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 注意 "1M"（月）区分大小写，先于 lowercase 匹配
        if s == "1M" {
            return Ok(KlineInterval::Month1);
        }
        match s.to_lowercase().as_str() {
            "1m" | "minute1" => Ok(KlineInterval::Minute1),
            "5m" | "minute5" => Ok(KlineInterval::Minute5),
            "15m" | "minute15" => Ok(KlineInterval::Minute15),
            "30m" | "minute30" => Ok(KlineInterval::Minute30),
            "1h" | "hour1" => Ok(KlineInterval::Hour1),
            "4h" | "hour4" => Ok(KlineInterval::Hour4),
            "1d" | "day1" => Ok(KlineInterval::Day1),
            "1w" | "week1" => Ok(KlineInterval::Week1),
            "month1" => Ok(KlineInterval::Month1),
            _ => Err(format!("Unknown KlineInterval: {}", s)),
        }
    }
}

impl std::fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KlineInterval::Minute1 => write!(f, "1m"),
            KlineInterval::Minute5 => write!(f, "5m"),
            KlineInterval::Minute15 => write!(f, "15m"),
            KlineInterval::Minute30 => write!(f, "30m"),
            KlineInterval::Hour1 => write!(f, "1h"),
            KlineInterval::Hour4 => write!(f, "4h"),
            KlineInterval::Day1 => write!(f, "1d"),
            KlineInterval::Week1 => write!(f, "1w"),
            KlineInterval::Month1 => write!(f, "1M"),
        }
    }
}

/// # Summary
/// 复权方式枚举，描述价格序列对分红送股等公司行为的修正方式。
///
/// # Invariants
/// - 无特定约束。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Adjustment {
    // 前复权
    #[default]
    Qfq,
    // 后复权
    Hfq,
    // 不复权
    None,
}

impl FromStr for Adjustment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qfq" | "forward" => Ok(Adjustment::Qfq),
            "hfq" | "backward" => Ok(Adjustment::Hfq),
            "none" | "" => Ok(Adjustment::None),
            _ => Err(format!("Unknown Adjustment: {}", s)),
        }
    }
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Adjustment::Qfq => write!(f, "qfq"),
            Adjustment::Hfq => write!(f, "hfq"),
            Adjustment::None => write!(f, "none"),
        }
    }
}
