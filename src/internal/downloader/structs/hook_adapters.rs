//! 单阶段钩子适配器：将闭包包装成 [`DownloadHook`]，供 `with_xx_hook` 使用。

use std::future::Future;

use async_trait::async_trait;

use crate::internal::downloader::traits::download::{DownloadHook, HookAbort};

use super::download_event::DownloadEvent;
use super::download_result::DownloadResult;
use super::resource_meta::ResourceMeta;
use super::stats_snapshot::StatsSnapshot;

/// 仅实现「开始前」的钩子适配器；闭包拿到的是元数据的拷贝。
pub(crate) struct BeforeStartHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F, Fut> DownloadHook for BeforeStartHookAdapter<F>
where
    F: FnMut(ResourceMeta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookAbort>> + Send + 'static,
{
    async fn before_start(&mut self, meta: &ResourceMeta) -> Result<(), HookAbort> {
        (self.0)(meta.clone()).await
    }
}

/// 仅实现「分片事件」的钩子适配器。
pub(crate) struct OnEventHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F> DownloadHook for OnEventHookAdapter<F>
where
    F: FnMut(&DownloadEvent) + Send + Sync + 'static,
{
    fn on_event(&mut self, event: &DownloadEvent) {
        (self.0)(event);
    }
}

/// 仅实现「统计快照」的钩子适配器。
pub(crate) struct OnProgressHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F> DownloadHook for OnProgressHookAdapter<F>
where
    F: FnMut(StatsSnapshot) + Send + Sync + 'static,
{
    fn on_progress(&mut self, snapshot: &StatsSnapshot) {
        (self.0)(*snapshot);
    }
}

/// 仅实现「完成后」的钩子适配器。
pub(crate) struct AfterCompleteHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F, Fut> DownloadHook for AfterCompleteHookAdapter<F>
where
    F: FnMut(DownloadResult) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn after_complete(&mut self, result: &DownloadResult) {
        (self.0)(result.clone()).await
    }
}
