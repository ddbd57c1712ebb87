//! 下载相关 trait：钩子接口，供下载引擎调用。
//!
//! worker 只向事件队列投递事件，从不直接输出；所有钩子都在引擎自身的任务上顺序执行。

use async_trait::async_trait;

use crate::internal::downloader::structs::{
    DownloadEvent, DownloadResult, ResourceMeta, StatsSnapshot,
};

/// 钩子执行时请求中止下载时使用的错误。
#[derive(Debug, Clone)]
pub struct HookAbort;

impl std::fmt::Display for HookAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("下载被钩子中止")
    }
}

impl std::error::Error for HookAbort {}

/// 下载流程钩子：在「开始前 / 分片事件 / 统计快照 / 完成后」插入自定义逻辑。
///
/// 使用方式二选一（可混用）：
/// - **单阶段**：用 `with_before_start_hook` / `with_on_event_hook` / `with_on_progress_hook` / `with_after_complete_hook` 传入闭包；
/// - **完整钩子**：实现本 trait，通过引擎的 `with_hook` 注册。
#[async_trait]
pub trait DownloadHook: Send + Sync {
    /// 元数据探测完成、分片开始前调用。返回 `Err` 则中止本次下载。
    async fn before_start(&mut self, _meta: &ResourceMeta) -> Result<(), HookAbort> {
        Ok(())
    }

    /// 分片开始、重试、完成时调用。
    fn on_event(&mut self, _event: &DownloadEvent) {}

    /// 每个统计节拍调用一次。
    fn on_progress(&mut self, _snapshot: &StatsSnapshot) {}

    /// 下载成功结束后调用。
    async fn after_complete(&mut self, _result: &DownloadResult) {}
}
