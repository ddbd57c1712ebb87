//! 钩子测试：before_start 中止、事件顺序、进度快照、完成回调、完整钩子实现。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::CancellationToken;
use crate::downloader::{
    DownloadError, DownloadEvent, DownloadHook, DownloadResult, HookAbort, MemoryBuffer, RangeEngine,
    ResourceMeta, StatsSnapshot,
};
use crate::tests::{FixtureOptions, FixtureServer, random_payload};

#[tokio::test]
async fn before_start_abort_prevents_download() {
    let server = FixtureServer::start(random_payload(1000), FixtureOptions::default()).await;
    let seen_size = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&seen_size);

    let engine = RangeEngine::new::<&str>(&[])
        .unwrap()
        .workers(4)
        .with_before_start_hook(move |meta: ResourceMeta| {
            *seen.lock().unwrap() = Some(meta.size);
            async { Err(HookAbort) }
        });

    let err = engine
        .download(&server.url("/a"), Arc::new(MemoryBuffer::new()), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::HookAbort(_)), "{err:?}");
    assert_eq!(*seen_size.lock().unwrap(), Some(1000));
    assert!(server.get_ranges().is_empty(), "钩子中止后不应发起分片请求");
}

#[tokio::test]
async fn events_and_completion_are_reported() {
    let server = FixtureServer::start(random_payload(50_000), FixtureOptions::default()).await;
    let events = Arc::new(Mutex::new(Vec::new()));
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(Mutex::new(None));

    let (e, s, c) = (Arc::clone(&events), Arc::clone(&snapshots), Arc::clone(&completed));
    let engine = RangeEngine::new::<&str>(&[])
        .unwrap()
        .workers(4)
        .stats_interval(Duration::from_millis(10))
        .with_on_event_hook(move |event: &DownloadEvent| e.lock().unwrap().push(event.clone()))
        .with_on_progress_hook(move |snapshot: StatsSnapshot| s.lock().unwrap().push(snapshot))
        .with_after_complete_hook(move |result: DownloadResult| {
            *c.lock().unwrap() = Some(result);
            async {}
        });

    let result = engine
        .download(&server.url("/a.bin"), Arc::new(MemoryBuffer::new()), &CancellationToken::new())
        .await
        .unwrap();

    let events = events.lock().unwrap();
    let started = events
        .iter()
        .filter(|e| matches!(e, DownloadEvent::SegmentStarted { .. }))
        .count();
    let finished: u64 = events
        .iter()
        .filter_map(|e| match e {
            DownloadEvent::SegmentFinished { bytes, .. } => Some(*bytes),
            _ => None,
        })
        .sum();
    assert_eq!(started, 4);
    assert_eq!(finished, 50_000);
    assert!(
        !events.iter().any(|e| matches!(e, DownloadEvent::Progress(_))),
        "快照只走 on_progress"
    );

    // 每个分片的开始事件都在完成事件之前
    for index in 0..4 {
        let start = events
            .iter()
            .position(|e| matches!(e, DownloadEvent::SegmentStarted { range } if range.index == index));
        let end = events
            .iter()
            .position(|e| matches!(e, DownloadEvent::SegmentFinished { index: i, .. } if *i == index));
        assert!(start.unwrap() < end.unwrap());
    }

    // 完成钩子执行前所有快照已分发，最后一个即最终快照
    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots.last().map(|s| s.downloaded), Some(50_000));

    assert_eq!(completed.lock().unwrap().as_ref(), Some(&result));
}

struct CountingHook {
    before: Arc<AtomicUsize>,
    after: Arc<AtomicUsize>,
}

#[async_trait]
impl DownloadHook for CountingHook {
    async fn before_start(&mut self, _meta: &ResourceMeta) -> Result<(), HookAbort> {
        self.before.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn after_complete(&mut self, _result: &DownloadResult) {
        self.after.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn full_hook_runs_once_per_download() {
    let server = FixtureServer::start(random_payload(300), FixtureOptions::default()).await;
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));

    let engine = RangeEngine::new::<&str>(&[]).unwrap().workers(2).with_hook(CountingHook {
        before: Arc::clone(&before),
        after: Arc::clone(&after),
    });

    for _ in 0..2 {
        engine
            .download(&server.url("/a"), Arc::new(MemoryBuffer::new()), &CancellationToken::new())
            .await
            .unwrap();
    }

    assert_eq!(before.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn after_complete_not_called_on_failure() {
    let server = FixtureServer::start(
        random_payload(300),
        FixtureOptions {
            fail_at: Some((0, 400)),
            ..Default::default()
        },
    )
    .await;
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));

    let engine = RangeEngine::new::<&str>(&[]).unwrap().with_hook(CountingHook {
        before: Arc::clone(&before),
        after: Arc::clone(&after),
    });

    let result = engine
        .download(&server.url("/a"), Arc::new(MemoryBuffer::new()), &CancellationToken::new())
        .await;
    assert!(result.is_err());
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 0);
}
