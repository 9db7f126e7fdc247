//! # Kanpan Feed
//!
//! 行情数据源适配器：远端 REST 服务适配器与确定性合成兜底数据源，
//! 二者实现同一 `KlineProvider` 端口，由网关按策略选用。

pub mod http;
pub mod synth;
