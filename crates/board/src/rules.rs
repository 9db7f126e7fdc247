use chrono::{Duration, NaiveDate};
use kanpan_core::board::entity::{Board, PriceLimit, SettlementStatus, T1Status};
use kanpan_core::board::error::BoardError;
use kanpan_core::board::port::TradingCalendar;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// 日历兜底上限：连续非交易日超过此数视为日历异常，停止顺延
const MAX_CALENDAR_SKIP: usize = 30;

/// # Summary
/// 根据证券代码前缀判定所属板块。
///
/// # Logic
/// 1. 去掉交易所后缀（`.SH` / `.SZ` / `.BJ`）。
/// 2. `688` 科创板；`300` / `301` 创业板；`43` / `83` / `87` / `92`
///    北交所；其余主板。
///
/// # Arguments
/// * `symbol`: 证券代码（可带交易所后缀）。
///
/// # Returns
/// 板块枚举。
pub fn board_of(symbol: &str) -> Board {
    let code = symbol.split('.').next().unwrap_or(symbol);
    if code.starts_with("688") {
        Board::Star
    } else if code.starts_with("300") || code.starts_with("301") {
        Board::ChiNext
    } else if ["43", "83", "87", "92"].iter().any(|p| code.starts_with(p)) {
        Board::Bse
    } else {
        Board::Main
    }
}

/// # Summary
/// 各板块适用的涨跌幅限制比例。
///
/// # Returns
/// 主板 10%，科创板/创业板 20%，北交所 30%。
pub fn board_limit_pct(board: Board) -> Decimal {
    match board {
        Board::Main => dec!(0.10),
        Board::Star | Board::ChiNext => dec!(0.20),
        Board::Bse => dec!(0.30),
    }
}

/// # Summary
/// 由昨收与限制比例计算涨跌停价位。
///
/// # Logic
/// 1. `limitUp = round2(prevClose * (1 + pct))`，
///    `limitDown = round2(prevClose * (1 - pct))`。
/// 2. round2 为最小报价单位（0.01 元）上的四舍五入
///    （round-half-up，`MidpointAwayFromZero`）。
///
/// # Arguments
/// * `prev_close`: 昨收价。
/// * `limit_pct`: 限制比例，(0, 1) 开区间。
///
/// # Returns
/// 涨跌停价位；非法入参返回 BoardError（契约错误）。
pub fn compute_limits(prev_close: Decimal, limit_pct: Decimal) -> Result<PriceLimit, BoardError> {
    if prev_close <= Decimal::ZERO {
        return Err(BoardError::InvalidPrice(prev_close.to_string()));
    }
    if limit_pct <= Decimal::ZERO || limit_pct >= Decimal::ONE {
        return Err(BoardError::InvalidPct(limit_pct.to_string()));
    }

    let round2 = |v: Decimal| v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(PriceLimit {
        limit_up: round2(prev_close * (Decimal::ONE + limit_pct)),
        limit_down: round2(prev_close * (Decimal::ONE - limit_pct)),
        limit_pct,
    })
}

/// # Summary
/// 计算 T+1 可卖日期：N 日买入，N+1 日起可卖。
///
/// # Logic
/// 1. 基线为自然日算术（买入日 + 1 天），不感知周末与节假日。
/// 2. 注入交易日历后顺延至下一个交易日（顺延次数有上限，防止
///    恒假日历导致死循环）。
/// 3. 当前市场变体恒返回 `T+1`，`T+0` 仅为类型层面的前向兼容。
///
/// # Arguments
/// * `buy_date`: 买入日期。
/// * `calendar`: 可选交易日历协作者。
///
/// # Returns
/// 交收状态。
pub fn compute_sellable(buy_date: NaiveDate, calendar: Option<&dyn TradingCalendar>) -> T1Status {
    let mut sellable = buy_date + Duration::days(1);
    if let Some(cal) = calendar {
        let mut skipped = 0;
        while !cal.is_trading_day(sellable) && skipped < MAX_CALENDAR_SKIP {
            sellable += Duration::days(1);
            skipped += 1;
        }
    }
    T1Status {
        buy_date,
        sellable_date: sellable,
        status: SettlementStatus::TPlusOne,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_board_classification() {
        assert_eq!(board_of("600519.SH"), Board::Main);
        assert_eq!(board_of("000001.SZ"), Board::Main);
        assert_eq!(board_of("688981.SH"), Board::Star);
        assert_eq!(board_of("300750.SZ"), Board::ChiNext);
        assert_eq!(board_of("301236"), Board::ChiNext);
        assert_eq!(board_of("832566.BJ"), Board::Bse);
        assert_eq!(board_limit_pct(Board::Main), dec!(0.10));
        assert_eq!(board_limit_pct(Board::Star), dec!(0.20));
        assert_eq!(board_limit_pct(Board::Bse), dec!(0.30));
    }

    #[test]
    fn test_compute_limits_reference_values() {
        let limits = compute_limits(dec!(100), dec!(0.10)).expect("should compute");
        assert_eq!(limits.limit_up, dec!(110.00));
        assert_eq!(limits.limit_down, dec!(90.00));
        assert_eq!(limits.limit_pct, dec!(0.10));
    }

    #[test]
    fn test_compute_limits_rounds_half_up_on_tick() {
        // 12.35 * 1.10 = 13.585 → 13.59；12.35 * 0.90 = 11.115 → 11.12
        let limits = compute_limits(dec!(12.35), dec!(0.10)).expect("should compute");
        assert_eq!(limits.limit_up, dec!(13.59));
        assert_eq!(limits.limit_down, dec!(11.12));
    }

    #[test]
    fn test_compute_limits_rejects_contract_violations() {
        assert!(matches!(
            compute_limits(dec!(0), dec!(0.10)),
            Err(BoardError::InvalidPrice(_))
        ));
        assert!(matches!(
            compute_limits(dec!(100), dec!(0)),
            Err(BoardError::InvalidPct(_))
        ));
        assert!(matches!(
            compute_limits(dec!(100), dec!(1)),
            Err(BoardError::InvalidPct(_))
        ));
    }

    #[test]
    fn test_sellable_next_calendar_day_baseline() {
        let status = compute_sellable(date(2024, 1, 2), None);
        assert_eq!(status.sellable_date, date(2024, 1, 3));
        assert_eq!(status.status, SettlementStatus::TPlusOne);
        assert_eq!(status.status.to_string(), "T+1");

        // 基线不感知周末：周五买入，次日（周六）即记为可卖
        let friday = compute_sellable(date(2024, 1, 5), None);
        assert_eq!(friday.sellable_date, date(2024, 1, 6));
    }

    struct WeekdayCalendar;
    impl TradingCalendar for WeekdayCalendar {
        fn is_trading_day(&self, d: NaiveDate) -> bool {
            !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
        }
    }

    #[test]
    fn test_sellable_with_calendar_skips_weekend() {
        let status = compute_sellable(date(2024, 1, 5), Some(&WeekdayCalendar));
        // 周五买入 → 顺延到下周一
        assert_eq!(status.sellable_date, date(2024, 1, 8));
    }
}
