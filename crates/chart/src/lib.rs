//! # Kanpan Chart
//!
//! 图表会话编排器：持有当前选择器（标的/周期/复权），驱动
//! 「取数 → 板规则 → 指标」的加载循环，并以陈旧响应守卫保证
//! 会话永远只展示当前选择器对应的数据。

pub mod session;

pub use session::{
    ChartSession, IndicatorParams, PriceChange, SessionError, SessionPhase, SessionSnapshot,
};
