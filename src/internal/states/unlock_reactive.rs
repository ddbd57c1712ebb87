//! # UnlockReactiveProperty
//!
//! 轻量级的响应式属性容器，基于 [`tokio::sync::watch`] 实现，支持异步监听和更新值。
//! 下载引擎通过 [`RangeEngine::stats`](crate::downloader::RangeEngine::stats) 返回它，
//! 调用方 `watch()` 后即可拿到每一次统计快照。
//!
//! ## 使用示例
//! ```rust,no_run
//! use range_dl::states::unlock_reactive::UnlockReactiveProperty;
//!
//! let prop = UnlockReactiveProperty::new(0u64);
//! prop.update(1).update(2);
//! assert_eq!(prop.get_current(), Some(2));
//! ```

pub use super::reactive_core::{PropertyWatcher, ReactivePropertyError as UnlockReactivePropertyError};

/// 轻量级响应式属性容器。
///
/// 纯通知机制，读写不阻塞，适合高频更新场景（如下载进度条）。
pub type UnlockReactiveProperty<T> = super::reactive_core::ReactiveProperty<T>;
