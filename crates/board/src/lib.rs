//! # Kanpan Board
//!
//! A 股交易板规则计算器：涨跌停价位与 T+1 可卖日期。
//! 与服务端 `/astock/stop-limit`、`/astock/t1-sellable` 接口口径一致，
//! 离线环境下独立产出相同结果。

pub mod rules;

pub use rules::{board_limit_pct, board_of, compute_limits, compute_sellable};
