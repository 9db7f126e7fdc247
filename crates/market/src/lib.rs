//! # Kanpan Market
//!
//! K 线数据网关：按「缓存 → 真实数据源 → 合成兜底」的顺序取数，
//! 保证上层始终有可渲染的序列。

pub mod gateway;
pub mod key;
