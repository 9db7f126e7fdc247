use chrono::NaiveDate;
use kanpan_core::common::{Adjustment, KlineInterval};

/// # Summary
/// 生成 K 线序列的缓存键。
///
/// # Logic
/// 纯函数：键形如 `kline_<symbol>_<interval>_<adjustment>_<start>_<end>`，
/// 缺省日期以 `-` 占位。参数完全相同的两次请求必然命中同一条目，
/// 任一参数不同则键必不同。
///
/// # Arguments
/// * `symbol`: 证券代码。
/// * `interval`: K 线周期。
/// * `adjustment`: 复权方式。
/// * `start` / `end`: 可选日期区间端点。
///
/// # Returns
/// 缓存键字符串。
pub fn series_key(
    symbol: &str,
    interval: KlineInterval,
    adjustment: Adjustment,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> String {
    format!(
        "kline_{}_{}_{}_{}_{}",
        symbol,
        interval,
        adjustment,
        start.map_or_else(|| "-".to_string(), |d| d.to_string()),
        end.map_or_else(|| "-".to_string(), |d| d.to_string()),
    )
}

/// # Summary
/// 生成指标结果的记忆化键。
///
/// # Logic
/// 在序列键维度之上追加指标名与参数签名，保证不同参数化的指标
/// 互不碰撞。
///
/// # Arguments
/// * `symbol` / `interval` / `adjustment`: 源序列身份。
/// * `name`: 指标名（如 `MA`）。
/// * `params`: 参数签名（如 `5`、`12-26-9`）。
///
/// # Returns
/// 记忆化键字符串。
pub fn indicator_key(
    symbol: &str,
    interval: KlineInterval,
    adjustment: Adjustment,
    name: &str,
    params: &str,
) -> String {
    format!(
        "indicator_{}_{}_{}_{}_{}",
        symbol, interval, adjustment, name, params
    )
}
