use super::byte_range::ByteRange;
use super::stats_snapshot::StatsSnapshot;

/// 下载过程中的观测事件：worker 与统计任务只负责投递，由引擎按顺序分发给钩子。
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// 分片开始下载
    SegmentStarted { range: ByteRange },
    /// 分片遇到临时错误，将从 `cursor` 处重新请求
    Retrying {
        index: usize,
        cursor: u64,
        attempt: u32,
        reason: String,
    },
    /// 分片完成，`bytes` 为该分片写入的总字节数
    SegmentFinished { index: usize, bytes: u64 },
    /// 统计快照
    Progress(StatsSnapshot),
}
