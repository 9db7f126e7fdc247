use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use kanpan_core::board::entity::{PriceLimit, SettlementStatus, T1Status};
use kanpan_core::board::port::BoardRuleProvider;
use kanpan_core::market::entity::{Candle, KlineQuery};
use kanpan_core::market::error::MarketError;
use kanpan_core::market::port::KlineProvider;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// # Summary
/// 远端行情数据服务 (market-data-service) 适配器。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 仅负责协议转换，不做缓存与降级，失败原样返回 MarketError。
#[derive(Clone)]
pub struct KlineHttpProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 服务根地址
    base_url: String,
}

impl KlineHttpProvider {
    /// # Summary
    /// 创建一个新的 KlineHttpProvider 实例。
    ///
    /// # Logic
    /// 1. 配置请求超时。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `base_url`: 服务根地址，形如 `http://host:port`。
    /// * `timeout`: 单请求超时。
    ///
    /// # Returns
    /// 构建失败（TLS 后端不可用等）返回 MarketError。
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Unknown(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

/// # Summary
/// `/kline` 接口响应顶层结构。
#[derive(Deserialize, Debug)]
struct KlineResponse {
    candles: Vec<WireCandle>,
}

/// # Summary
/// 线格式单根 K 线，时间戳为 unix 毫秒。
#[derive(Deserialize, Debug)]
struct WireCandle {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    amount: Option<f64>,
}

/// # Summary
/// `/astock/stop-limit` 接口响应。
#[derive(Deserialize, Debug)]
struct StopLimitResponse {
    limit_up: Decimal,
    limit_down: Decimal,
    limit_pct: Decimal,
}

/// # Summary
/// `/astock/t1-sellable` 接口响应。
#[derive(Deserialize, Debug)]
struct T1Response {
    sellable_date: NaiveDate,
    t_status: String,
}

/// # Summary
/// 将线格式 K 线列表转换为领域实体。
///
/// # Logic
/// 1. 毫秒时间戳转 `DateTime<Utc>`，非法时间戳视为解析错误。
/// 2. 字段逐一映射，不在此处校验 OHLC 不变量（网关统一把关）。
///
/// # Arguments
/// * `wire`: 线格式 K 线列表。
///
/// # Returns
/// 成功返回实体列表。
fn adapt_candles(wire: Vec<WireCandle>) -> Result<Vec<Candle>, MarketError> {
    wire.into_iter()
        .map(|w| {
            let time = Utc
                .timestamp_millis_opt(w.timestamp)
                .single()
                .ok_or_else(|| {
                    MarketError::Parse(format!("bad timestamp: {}", w.timestamp))
                })?;
            Ok(Candle {
                time,
                open: w.open,
                high: w.high,
                low: w.low,
                close: w.close,
                volume: w.volume,
                amount: w.amount,
            })
        })
        .collect()
}

#[async_trait]
impl KlineProvider for KlineHttpProvider {
    /// # Summary
    /// 从远端服务抓取 K 线历史数据。
    ///
    /// # Logic
    /// 1. 构建 `/kline` 查询参数（可选日期以省略方式表达）。
    /// 2. 发起异步请求并解析 JSON。
    /// 3. 毫秒时间戳转换为 UTC 时间。
    ///
    /// # Arguments
    /// * `query`: K 线查询参数。
    ///
    /// # Returns
    /// 成功返回 K 线列表，失败返回 MarketError。
    async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Candle>, MarketError> {
        let url = format!("{}/kline", self.base_url);

        let mut params = vec![
            ("symbol".to_string(), query.symbol.clone()),
            ("interval".to_string(), query.interval.to_string()),
            ("adjust".to_string(), query.adjustment.to_string()),
        ];
        if let Some(start) = query.start {
            params.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = query.end {
            params.push(("end_date".to_string(), end.to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: KlineResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        adapt_candles(json.candles)
    }
}

#[async_trait]
impl BoardRuleProvider for KlineHttpProvider {
    /// # Summary
    /// 查询服务端计算的涨跌停价位（交叉校验用）。
    ///
    /// # Logic
    /// 1. 请求 `/astock/stop-limit`。
    /// 2. 解析为 PriceLimit 实体。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `date`: 交易日。
    /// * `prev_close`: 昨收价。
    ///
    /// # Returns
    /// 成功返回涨跌停价位。
    async fn fetch_stop_limit(
        &self,
        symbol: &str,
        date: NaiveDate,
        prev_close: f64,
    ) -> Result<PriceLimit, MarketError> {
        let url = format!("{}/astock/stop-limit", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("date", date.to_string()),
                ("prev_close", prev_close.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: StopLimitResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        Ok(PriceLimit {
            limit_up: json.limit_up,
            limit_down: json.limit_down,
            limit_pct: json.limit_pct,
        })
    }

    /// # Summary
    /// 查询服务端计算的 T+1 可卖日期（交叉校验用）。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `buy_date`: 买入日期。
    ///
    /// # Returns
    /// 成功返回交收状态。
    async fn fetch_t1_sellable(
        &self,
        symbol: &str,
        buy_date: NaiveDate,
    ) -> Result<T1Status, MarketError> {
        let url = format!("{}/astock/t1-sellable", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("buy_date", buy_date.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: T1Response = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        let status = match json.t_status.as_str() {
            "T+1" => SettlementStatus::TPlusOne,
            "T+0" => SettlementStatus::TPlusZero,
            other => {
                return Err(MarketError::Parse(format!("unknown t_status: {}", other)));
            }
        };

        Ok(T1Status {
            buy_date,
            sellable_date: json.sellable_date,
            status,
        })
    }
}
