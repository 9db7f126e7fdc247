//! # Kanpan Core
//!
//! 行情分析引擎的领域核心：实体、错误与端口 (Port) 定义。
//! 本 crate 不包含任何具体适配器实现，所有外设（HTTP 数据源、缓存、
//! 交易日历）均通过 trait 注入。

pub mod board;
pub mod cache;
pub mod common;
pub mod config;
pub mod indicator;
pub mod market;
