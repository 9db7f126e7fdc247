use thiserror::Error;

/// # Summary
/// 交易板规则域错误枚举。全部属于契约错误（调用方传参缺陷），
/// 不做降级，直接上抛。
#[derive(Error, Debug)]
pub enum BoardError {
    // 昨收价非法（非正数或非有穷值）
    #[error("Invalid previous close: {0}")]
    InvalidPrice(String),
    // 限制比例超出 (0, 1) 开区间
    #[error("Invalid limit percentage: {0}")]
    InvalidPct(String),
}
