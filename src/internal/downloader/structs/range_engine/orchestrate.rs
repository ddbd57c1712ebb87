//! 下载编排：规划分片、启动 worker 与统计任务、分发事件、首个错误即整体中止。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use reqwest::Client;
use reqwest::header::HeaderMap;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::internal::states::queue_reactive::{QueueReactiveConsumer, QueueReactiveProperty};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::super::download_error::DownloadError;
use super::super::download_event::DownloadEvent;
use super::super::download_hooks_container::DownloadHooksContainer;
use super::super::download_result::DownloadResult;
use super::super::engine_config::EngineConfig;
use super::super::positional_writer::PositionalWriter;
use super::super::resource_meta::ResourceMeta;
use super::super::stats_snapshot::StatsSnapshot;
use super::metadata::resolve_file_name;
use super::planner::plan_ranges;
use super::stats::{StatsAggregator, StatsAggregatorParams};
use super::worker::{DownloadWorker, WorkerShared};

/// 执行一次下载的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct RunDownloadParams<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub headers: &'a HeaderMap,
    pub meta: &'a ResourceMeta,
    pub config: &'a EngineConfig,
    pub writer: PositionalWriter,
    pub hooks: &'a mut DownloadHooksContainer,
    pub progress: &'a UnlockReactiveProperty<StatsSnapshot>,
    pub cancel: &'a CancellationToken,
}

type WorkerSet = JoinSet<Result<u64, DownloadError>>;

pub(crate) async fn run_download(params: RunDownloadParams<'_>) -> Result<DownloadResult, DownloadError> {
    let RunDownloadParams {
        client,
        url,
        headers,
        meta,
        config,
        writer,
        hooks,
        progress,
        cancel,
    } = params;

    hooks.run_before_start(meta).await?;

    let started = Instant::now();
    // 本次下载专用的取消令牌：提前返回（含 panic）时自动取消所有子任务
    let token = cancel.child_token();
    let _guard = token.clone().drop_guard();

    let ranges = plan_ranges(meta.size, config.workers, meta.supports_ranges);
    info!(url, size = meta.size, workers = ranges.len(), "开始分片下载");

    let (events, mut consumer) = QueueReactiveProperty::new();
    let downloaded = Arc::new(AtomicU64::new(0));
    progress.update(StatsSnapshot {
        downloaded: 0,
        speed: 0,
        total: meta.size,
    });

    let shared = Arc::new(WorkerShared {
        client: client.clone(),
        url: url.to_string(),
        headers: headers.clone(),
        writer,
        downloaded: Arc::clone(&downloaded),
        retry: config.retry.clone(),
        chunk_size: config.chunk_size,
        supports_ranges: meta.supports_ranges,
        events: events.clone(),
        token: token.clone(),
    });

    let mut workers = WorkerSet::new();
    for range in ranges {
        workers.spawn(DownloadWorker::new(range, Arc::clone(&shared)).run());
    }

    let stats_token = token.child_token();
    let stats = tokio::spawn(
        StatsAggregator::new(StatsAggregatorParams {
            downloaded: Arc::clone(&downloaded),
            total: meta.size,
            interval: config.stats_interval,
            max_stall_ticks: config.max_stall_ticks,
            progress: progress.clone(),
            events,
        })
        .run(stats_token.clone()),
    );

    if let Err(e) = supervise(&mut workers, &mut consumer, hooks).await {
        warn!(url, error = %e, "下载中止，取消其余分片");
        token.cancel();
        workers.abort_all();
        stats.abort();
        return Err(e);
    }

    stats_token.cancel();
    stats.await?;
    while let Some(event) = consumer.try_recv() {
        hooks.dispatch(&event);
    }

    let written = downloaded.load(Ordering::Acquire);
    verify_written(written, meta.size)?;

    let result = DownloadResult::from_elapsed(resolve_file_name(meta, url), written, started.elapsed());
    info!(
        url,
        size = result.size,
        avg_speed = result.avg_speed,
        elapsed = ?result.time_taken,
        "下载完成"
    );

    hooks.run_after_complete(&result).await;
    Ok(result)
}

/// 所有分片结束后，累计写入字节数必须等于资源大小。
pub(crate) fn verify_written(written: u64, size: u64) -> Result<(), DownloadError> {
    if written != size {
        return Err(DownloadError::Incomplete { expected: size, written });
    }
    Ok(())
}

/// 等待全部 worker 结束，期间把事件按到达顺序交给钩子；任一 worker 失败立即返回。
async fn supervise(
    workers: &mut WorkerSet,
    consumer: &mut QueueReactiveConsumer<DownloadEvent>,
    hooks: &mut DownloadHooksContainer,
) -> Result<(), DownloadError> {
    loop {
        tokio::select! {
            biased;
            Some(event) = consumer.recv() => hooks.dispatch(&event),
            joined = workers.join_next() => match joined {
                None => return Ok(()),
                Some(res) => {
                    res??;
                }
            },
        }
    }
}
