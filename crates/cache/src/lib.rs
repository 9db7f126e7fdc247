//! # Kanpan Cache
//!
//! 带 TTL 的内存 KV 缓存适配器，实现 `kanpan-core` 的 Cache 端口。

pub mod mem;
