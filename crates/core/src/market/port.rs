use crate::market::entity::{Candle, KlineQuery};
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 市场行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 返回的 K 线必须按时间升序排列。
/// - 真实数据源与合成兜底数据源实现同一端口，由网关按策略选用。
#[async_trait]
pub trait KlineProvider: Send + Sync {
    /// # Summary
    /// 获取特定证券在指定参数组合下的 K 线数据。
    ///
    /// # Logic
    /// 1. 构建数据源请求。
    /// 2. 执行抓取（或本地合成）并解析为实体。
    ///
    /// # Arguments
    /// * `query`: K 线查询参数。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 MarketError。
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Candle>, MarketError>;
}
