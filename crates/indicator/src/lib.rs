//! # Kanpan Indicator
//!
//! 技术指标纯函数引擎：MA / EMA / BOLL / RSI / MACD。
//! 所有函数无副作用、输出与输入等长（下标对齐同一时间戳），
//! 暖机期不足的位置以 `f64::NAN` 占位。引擎自身不做缓存，
//! 记忆化由调用方（ChartSession）负责。

pub mod engine;

pub use engine::{boll, ema, ma, macd, rsi, BollBands, MacdSeries};
