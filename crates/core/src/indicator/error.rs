use thiserror::Error;

/// # Summary
/// 技术指标域错误枚举。指标函数为纯函数，错误仅来自调用方传参缺陷
/// （契约错误），一律上抛。
#[derive(Error, Debug)]
pub enum IndicatorError {
    // 周期参数非法（为零或快慢线顺序颠倒）
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    // 倍数等数值参数非法（NaN 或非正数）
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
    // 指标名称无法识别或与指标类别不匹配
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
}
