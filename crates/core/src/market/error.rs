use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理网络、解析及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `Network` / `Parse` / `NotFound` 属于可降级错误，网关层吸收后走合成
///   兜底路径；`InvalidQuery` 属于契约错误，必须上抛暴露给开发者。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如 JSON 格式不匹配或 OHLC 不变量被破坏
    #[error("Parse error: {0}")]
    Parse(String),
    // 请求的数据未找到 (404 或内容为空)
    #[error("Data not found")]
    NotFound,
    // 调用方传入的请求参数非法（编程错误，不做降级）
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl MarketError {
    /// # Summary
    /// 判断该错误是否允许降级到合成兜底数据。
    ///
    /// # Logic
    /// 传输、解析与数据缺失类错误可降级；契约错误不可。
    ///
    /// # Returns
    /// 可降级返回 true。
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MarketError::InvalidQuery(_))
    }
}
