//! 统计任务：按固定节拍采样全局计数器，计算瞬时速度并发布快照。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::internal::states::queue_reactive::QueueReactiveProperty;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::super::download_event::DownloadEvent;
use super::super::stats_snapshot::StatsSnapshot;

/// 构造统计任务的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct StatsAggregatorParams {
    pub downloaded: Arc<AtomicU64>,
    pub total: u64,
    pub interval: Duration,
    pub max_stall_ticks: u32,
    pub progress: UnlockReactiveProperty<StatsSnapshot>,
    pub events: QueueReactiveProperty<DownloadEvent>,
}

pub(crate) struct StatsAggregator {
    downloaded: Arc<AtomicU64>,
    total: u64,
    interval: Duration,
    max_stall_ticks: u32,
    last_total: u64,
    last_speed: u64,
    stall_ticks: u32,
    progress: UnlockReactiveProperty<StatsSnapshot>,
    events: QueueReactiveProperty<DownloadEvent>,
}

impl StatsAggregator {
    pub(crate) fn new(params: StatsAggregatorParams) -> Self {
        Self {
            downloaded: params.downloaded,
            total: params.total,
            interval: params.interval.max(Duration::from_millis(1)),
            max_stall_ticks: params.max_stall_ticks,
            last_total: 0,
            last_speed: 0,
            stall_ticks: 0,
            progress: params.progress,
            events: params.events,
        }
    }

    /// 计算一次快照。
    ///
    /// 速度 = 本节拍增量 × 1000 / 节拍毫秒数。增量为 0 时最多连续 `max_stall_ticks` 个节拍
    /// 沿用上一次的速度，超过后才报告 0。
    pub(crate) fn tick(&mut self, current: u64) -> StatsSnapshot {
        let delta = current.saturating_sub(self.last_total);
        self.last_total = current;

        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX).max(1);
        let raw = delta.saturating_mul(1000) / interval_ms;

        let speed = if raw > 0 {
            self.stall_ticks = 0;
            self.last_speed = raw;
            raw
        } else if self.stall_ticks < self.max_stall_ticks {
            self.stall_ticks += 1;
            self.last_speed
        } else {
            self.last_speed = 0;
            0
        };

        StatsSnapshot {
            downloaded: current,
            speed,
            total: self.total,
        }
    }

    fn publish(&mut self) {
        let snapshot = self.tick(self.downloaded.load(Ordering::Acquire));
        trace!(downloaded = snapshot.downloaded, speed = snapshot.speed, total = snapshot.total, "统计快照");
        self.progress.update(snapshot);
        let _ = self.events.send(DownloadEvent::Progress(snapshot));
    }

    /// 每个节拍发布一次快照，直到 `token` 被取消；退出前再发布一次最终快照。
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => self.publish(),
            }
        }

        self.publish();
    }
}
