use std::time::Duration;

use super::retry_policy::RetryPolicy;

/// 默认 worker 数：单连接
pub const DEFAULT_WORKERS: usize = 1;

/// 默认拷贝块大小：256KB，每写满一块推进一次游标和全局计数
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// 默认统计节拍
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_millis(500);

/// 速度为 0 时最多沿用上一次非零速度的节拍数
pub const DEFAULT_MAX_STALL_TICKS: u32 = 4;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 请求的并发 worker 数；0 或 1 表示单连接
    pub workers: usize,
    /// 拷贝块大小（字节）
    pub chunk_size: usize,
    /// 统计节拍
    pub stats_interval: Duration,
    /// 速度平滑：连续零速节拍上限
    pub max_stall_ticks: u32,
    /// 分片重试策略
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            stats_interval: DEFAULT_STATS_INTERVAL,
            max_stall_ticks: DEFAULT_MAX_STALL_TICKS,
            retry: RetryPolicy::default(),
        }
    }
}
