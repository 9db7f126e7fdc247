use std::sync::Arc;
use std::time::Duration;

use kanpan_cache::mem::TtlMemCache;
use kanpan_chart::ChartSession;
use kanpan_core::common::time::RealTimeProvider;
use kanpan_core::common::{Adjustment, KlineInterval};
use kanpan_core::config::AppConfig;
use kanpan_feed::http::KlineHttpProvider;
use kanpan_feed::synth::SynthKlineProvider;
use kanpan_market::gateway::KlineGateway;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// # Summary
/// 从默认值、可选配置文件与环境变量三层合成应用配置。
///
/// # Logic
/// 1. `AppConfig::default()` 兜底。
/// 2. 工作目录下的 `config.toml`（可缺省）。
/// 3. `KANPAN__` 前缀的环境变量覆盖。
fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("KANPAN").separator("__"))
        .build()?
        .try_deserialize()
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到图表会话。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载配置并实例化基础设施层（缓存、HTTP 数据源、合成兜底）。
/// 3. 组装 K 线网关与图表会话。
/// 4. 跑一轮示例加载并输出派生字段。
/// 5. 挂起等待外部信号退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    info!("Kanpan engine starting...");

    // 2. 加载配置与基础设施层
    let config = load_config()?;
    let cache = Arc::new(TtlMemCache::new());
    let real = Arc::new(KlineHttpProvider::new(
        config.market.base_url.clone(),
        Duration::from_secs(config.market.timeout_secs),
    )?);
    let fallback = Arc::new(SynthKlineProvider::new(Arc::new(RealTimeProvider)));

    // 3. 组装网关与会话
    let gateway = Arc::new(KlineGateway::new(cache, real, fallback, &config.market));
    let session = Arc::new(ChartSession::new(gateway, config.market.default_limit));

    // 4. 示例加载：远端不可达时自动降级为合成序列，绝不空屏
    session
        .load("600519.SH", KlineInterval::Day1, Adjustment::Qfq, None, None)
        .await?;
    let snapshot = session.snapshot();
    if let Some(series) = &snapshot.series {
        info!(
            symbol = %series.symbol,
            source = ?series.source,
            candles = series.candles.len(),
            latest = ?session.latest_price(),
            board_rule = ?snapshot.board_rule,
            "chart session ready"
        );
    }

    info!("ChartSession initialized. Waiting for signals...");

    // 5. 挂起主线程，等待外部退出信号
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    Ok(())
}
