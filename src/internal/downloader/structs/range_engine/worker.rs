//! 分片 worker：负责一个 `[begin, end)` 区间，从游标处请求、按块写入、遇临时错误从游标续传。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::internal::states::queue_reactive::QueueReactiveProperty;

use super::super::byte_range::ByteRange;
use super::super::download_error::DownloadError;
use super::super::download_event::DownloadEvent;
use super::super::positional_writer::PositionalWriter;
use super::super::retry_policy::RetryPolicy;
use super::fetcher::{FetchSegmentParams, SegmentBody, fetch_segment};

/// 所有 worker 共享的只读上下文；计数器与事件队列是仅有的跨 worker 写入点。
pub(crate) struct WorkerShared {
    pub client: Client,
    pub url: String,
    pub headers: HeaderMap,
    pub writer: PositionalWriter,
    pub downloaded: Arc<AtomicU64>,
    pub retry: RetryPolicy,
    pub chunk_size: usize,
    /// 为 false 时只有一个 worker，续传请求可能收到从头开始的完整响应
    pub supports_ranges: bool,
    pub events: QueueReactiveProperty<DownloadEvent>,
    pub token: CancellationToken,
}

pub(crate) struct DownloadWorker {
    range: ByteRange,
    /// 下一个待写入字节的绝对偏移，只增不减
    cursor: u64,
    shared: Arc<WorkerShared>,
}

impl DownloadWorker {
    pub(crate) fn new(range: ByteRange, shared: Arc<WorkerShared>) -> Self {
        Self {
            cursor: range.begin,
            range,
            shared,
        }
    }

    /// 下载整个区间，成功时返回写入的字节数（恰好是区间长度）。
    ///
    /// 临时错误按 [`RetryPolicy`] 重试，每次都从游标处重新请求；
    /// 一次尝试只要推进了游标，失败计数就清零。服务器不支持 Range 时，
    /// 续传请求得到的完整响应会丢弃游标之前的字节。
    pub(crate) async fn run(mut self) -> Result<u64, DownloadError> {
        let index = self.range.index;
        self.emit(DownloadEvent::SegmentStarted { range: self.range });
        debug!(index, begin = self.range.begin, end = self.range.end, "分片开始");

        let mut failures: u32 = 0;
        while self.cursor < self.range.end {
            if self.shared.token.is_cancelled() {
                return Err(DownloadError::Cancelled);
            }

            let before = self.cursor;
            let err = match self.attempt().await {
                Ok(()) => break,
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if self.cursor > before {
                failures = 0;
            }
            failures += 1;

            if !self.shared.retry.allows(failures) {
                warn!(index, cursor = self.cursor, attempts = failures, error = %err, "分片重试次数用尽");
                return Err(DownloadError::RetriesExhausted {
                    index,
                    attempts: failures,
                    last_error: err.to_string(),
                });
            }

            let delay = self.shared.retry.delay_for_attempt(failures);
            warn!(index, cursor = self.cursor, attempt = failures, ?delay, error = %err, "分片临时失败，稍后从游标处续传");
            self.emit(DownloadEvent::Retrying {
                index,
                cursor: self.cursor,
                attempt: failures,
                reason: err.to_string(),
            });

            tokio::select! {
                biased;
                _ = self.shared.token.cancelled() => return Err(DownloadError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let bytes = self.range.len();
        debug!(index, bytes, "分片完成");
        self.emit(DownloadEvent::SegmentFinished { index, bytes });
        Ok(bytes)
    }

    /// 一次请求：`[cursor, end)`。已缓冲的数据在遇到临时错误时先落盘，保证游标准确。
    async fn attempt(&mut self) -> Result<(), DownloadError> {
        let shared = Arc::clone(&self.shared);
        let mut body = fetch_segment(FetchSegmentParams {
            client: &shared.client,
            url: &shared.url,
            headers: &shared.headers,
            index: self.range.index,
            begin: self.cursor,
            end: self.range.end,
            restartable: !shared.supports_ranges,
            token: &shared.token,
        })
        .await?;

        let capacity = shared.chunk_size.max(1).min(self.remaining() as usize);
        let mut buf = BytesMut::with_capacity(capacity);

        let copied = self.copy_body(&mut body, &mut buf).await;
        if matches!(&copied, Err(e) if !e.is_transient()) {
            return copied;
        }
        self.flush(&mut buf).await?;
        copied?;

        if self.cursor < self.range.end {
            return Err(DownloadError::transient(
                self.range.index,
                self.cursor,
                format!("连接提前结束，还差 {} 字节", self.remaining()),
            ));
        }
        Ok(())
    }

    /// 把响应体拷进缓冲区，每满 `chunk_size` 写一次。
    async fn copy_body(&mut self, body: &mut SegmentBody, buf: &mut BytesMut) -> Result<(), DownloadError> {
        let attempt_begin = self.cursor;
        let chunk_size = self.shared.chunk_size.max(1);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shared.token.cancelled() => return Err(DownloadError::Cancelled),
                next = body.next() => next,
            };
            let Some(chunk) = next else {
                return Ok(());
            };
            let pending = self.cursor + buf.len() as u64;
            let chunk = chunk.map_err(|e| DownloadError::transient(self.range.index, pending, e))?;

            // 多出来的字节绝不写入
            let received = pending + chunk.len() as u64;
            if received > self.range.end {
                return Err(DownloadError::Overflow {
                    index: self.range.index,
                    offset: attempt_begin,
                    expected: self.range.end - attempt_begin,
                    actual: Some(received - attempt_begin),
                });
            }

            buf.extend_from_slice(&chunk);
            if buf.len() >= chunk_size {
                self.flush(buf).await?;
            }
        }
    }

    /// 写出缓冲区，推进游标与全局计数。
    async fn flush(&mut self, buf: &mut BytesMut) -> Result<(), DownloadError> {
        if buf.is_empty() {
            return Ok(());
        }
        let chunk = buf.split().freeze();
        let written = self.shared.writer.write_chunk(chunk, self.cursor).await? as u64;
        self.cursor += written;
        self.shared.downloaded.fetch_add(written, Ordering::AcqRel);
        Ok(())
    }

    fn remaining(&self) -> u64 {
        self.range.end - self.cursor
    }

    fn emit(&self, event: DownloadEvent) {
        // 引擎已退出时无人消费，丢弃即可
        let _ = self.shared.events.send(event);
    }
}
