//! 并发分片下载引擎。
//!
//! 一次下载分为：探测元数据 → 规划分片 → 每段一个 worker 并发写入同一个输出端 → 汇总结果。
//! 任一分片出现不可重试的错误，整个下载立即中止并返回该错误。

pub(crate) mod fetcher;
pub(crate) mod headers;
pub(crate) mod metadata;
pub(crate) mod orchestrate;
pub(crate) mod planner;
pub(crate) mod stats;
pub(crate) mod worker;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::internal::downloader::traits::download::{DownloadHook, HookAbort};
use crate::internal::downloader::traits::write_at::WriteAt;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::download_error::DownloadError;
use super::download_event::DownloadEvent;
use super::download_hooks_container::DownloadHooksContainer;
use super::download_result::DownloadResult;
use super::engine_config::EngineConfig;
use super::hook_adapters::{
    AfterCompleteHookAdapter, BeforeStartHookAdapter, OnEventHookAdapter, OnProgressHookAdapter,
};
use super::positional_writer::PositionalWriter;
use super::resource_meta::ResourceMeta;
use super::retry_policy::RetryPolicy;
use super::stats_snapshot::StatsSnapshot;

use self::headers::parse_header_lines;
use self::metadata::{ResolveMetaParams, resolve_meta};
use self::orchestrate::{RunDownloadParams, run_download};

/// 下载引擎。不实现 Clone：钩子在一次下载期间被独占，同一引擎上的下载按顺序执行。
pub struct RangeEngine {
    client: Client,
    headers: HeaderMap,
    config: EngineConfig,
    hooks: Mutex<DownloadHooksContainer>,
    progress_state: UnlockReactiveProperty<StatsSnapshot>,
}

impl std::fmt::Debug for RangeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeEngine")
            .field("headers", &self.headers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RangeEngine {
    /// 创建引擎；`header_lines` 形如 `"Authorization: Bearer xxx"`，会附加到每个请求上。
    pub fn new<S: AsRef<str>>(header_lines: &[S]) -> Result<Self, DownloadError> {
        let client = Client::builder().build()?;
        Self::with_client(client, header_lines)
    }

    /// 使用调用方提供的 `reqwest::Client`（代理、超时等由调用方配置）。
    pub fn with_client<S: AsRef<str>>(client: Client, header_lines: &[S]) -> Result<Self, DownloadError> {
        Ok(Self {
            client,
            headers: parse_header_lines(header_lines)?,
            config: EngineConfig::default(),
            hooks: Mutex::new(DownloadHooksContainer::default()),
            progress_state: UnlockReactiveProperty::new(StatsSnapshot::default()),
        })
    }

    /// 设置并发 worker 数；服务器不支持 Range 时始终按 1 个处理
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 设置拷贝块大小（字节）
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size.max(1);
        self
    }

    /// 设置统计节拍
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.config.stats_interval = interval;
        self
    }

    /// 设置零增量时沿用上次速度的最大节拍数，超过后速度记为 0
    pub fn max_stall_ticks(mut self, ticks: u32) -> Self {
        self.config.max_stall_ticks = ticks;
        self
    }

    /// 设置分片重试策略
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// 注册一个完整钩子；可多次调用，按注册顺序执行。
    pub fn with_hook(mut self, hook: impl DownloadHook + 'static) -> Self {
        self.hooks.get_mut().add(hook);
        self
    }

    /// 元数据探测完成、开始下载前调用；闭包返回 `Err(HookAbort)` 会中止下载。
    pub fn with_before_start_hook<F, Fut>(self, f: F) -> Self
    where
        F: FnMut(ResourceMeta) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookAbort>> + Send + 'static,
    {
        self.with_hook(BeforeStartHookAdapter(f))
    }

    /// 分片开始 / 重试 / 完成时调用
    pub fn with_on_event_hook<F>(self, f: F) -> Self
    where
        F: FnMut(&DownloadEvent) + Send + Sync + 'static,
    {
        self.with_hook(OnEventHookAdapter(f))
    }

    /// 每个统计节拍调用
    pub fn with_on_progress_hook<F>(self, f: F) -> Self
    where
        F: FnMut(StatsSnapshot) + Send + Sync + 'static,
    {
        self.with_hook(OnProgressHookAdapter(f))
    }

    /// 下载成功结束后调用
    pub fn with_after_complete_hook<F, Fut>(self, f: F) -> Self
    where
        F: FnMut(DownloadResult) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.with_hook(AfterCompleteHookAdapter(f))
    }

    /// 最新统计快照；可 `get_current()` 读取，也可 `watch()` 监听。
    pub fn stats(&self) -> UnlockReactiveProperty<StatsSnapshot> {
        self.progress_state.clone()
    }

    /// 当前引擎配置
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 探测资源元数据，不下载数据。
    pub async fn resolve(&self, url: &str) -> Result<ResourceMeta, DownloadError> {
        validate_url(url)?;
        resolve_meta(ResolveMetaParams {
            client: &self.client,
            url,
            headers: &self.headers,
        })
        .await
    }

    /// 探测元数据并把资源完整写入 `sink`。
    ///
    /// `cancel` 被取消后所有 worker 尽快退出，返回 [`DownloadError::Cancelled`]。
    pub async fn download(
        &self,
        url: &str,
        sink: Arc<dyn WriteAt>,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, DownloadError> {
        let meta = self.resolve(url).await?;
        self.download_with_meta(url, &meta, sink, cancel).await
    }

    /// 使用已探测的元数据下载，适合调用方需要先根据大小预分配输出端的场景。
    pub async fn download_with_meta(
        &self,
        url: &str,
        meta: &ResourceMeta,
        sink: Arc<dyn WriteAt>,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, DownloadError> {
        validate_url(url)?;
        if meta.size == 0 {
            return Err(DownloadError::meta(url, "资源大小为 0，无法下载"));
        }
        let mut hooks = self.hooks.lock().await;
        run_download(RunDownloadParams {
            client: &self.client,
            url,
            headers: &self.headers,
            meta,
            config: &self.config,
            writer: PositionalWriter::new(sink),
            hooks: &mut hooks,
            progress: &self.progress_state,
            cancel,
        })
        .await
    }
}

fn validate_url(url: &str) -> Result<(), DownloadError> {
    let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(DownloadError::InvalidUrl(format!("{url}: 不支持的协议 {other}"))),
    }
}
