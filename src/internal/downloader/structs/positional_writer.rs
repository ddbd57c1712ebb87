//! 定位写入器：所有 worker 共享同一个输出端，各自只写自己的区间。
//!
//! 写入器本身不持有任何跨 worker 的状态，并发安全完全依赖分片区间互不重叠。

use std::sync::Arc;

use bytes::Bytes;

use crate::internal::downloader::traits::write_at::WriteAt;

use super::download_error::DownloadError;

#[derive(Clone)]
pub struct PositionalWriter {
    sink: Arc<dyn WriteAt>,
}

impl std::fmt::Debug for PositionalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionalWriter").finish_non_exhaustive()
    }
}

impl PositionalWriter {
    pub fn new(sink: Arc<dyn WriteAt>) -> Self {
        Self { sink }
    }

    /// 把一块数据写到 `offset` 处，返回写入字节数。
    ///
    /// 阻塞 I/O 放到 blocking 线程池执行；写入字节数少于块大小时返回 [`DownloadError::ShortWrite`]。
    pub async fn write_chunk(&self, chunk: Bytes, offset: u64) -> Result<usize, DownloadError> {
        let expected = chunk.len();
        if expected == 0 {
            return Ok(0);
        }

        let sink = Arc::clone(&self.sink);
        let written = tokio::task::spawn_blocking(move || sink.write_at(&chunk, offset))
            .await?
            .map_err(|source| DownloadError::WriteAt { offset, source })?;

        if written != expected {
            return Err(DownloadError::ShortWrite {
                offset,
                expected,
                written,
            });
        }
        Ok(written)
    }
}
