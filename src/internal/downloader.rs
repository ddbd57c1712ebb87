//! 下载器领域模块：HTTP Range 分片并发下载引擎。
//!
//! 使用方式：`RangeEngine::new(&headers)?.workers(8).download(url, writer, cancel).await`
//! 对外导出以 [`crate::downloader`] 为准，此处仅做模块划分，不重复 pub use。

pub mod impl_traits;
pub mod structs;
pub mod traits;
