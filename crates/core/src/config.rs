use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub market: MarketConfig,
}

/// 行情数据管线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    // 远端行情服务根地址
    pub base_url: String,
    // HTTP 请求超时（秒）
    pub timeout_secs: u64,
    // 日内周期缓存 TTL（秒）
    pub intraday_ttl_secs: u64,
    // 日线及以上周期缓存 TTL（秒）
    pub daily_ttl_secs: u64,
    // 默认单次请求的 K 线数量
    pub default_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                base_url: "http://127.0.0.1:9000".to_string(), // Default for dev, should be overwritten by config
                timeout_secs: 10,
                intraday_ttl_secs: 60,
                daily_ttl_secs: 3600,
                default_limit: 200,
            },
        }
    }
}
