use std::io;

/// 支持按绝对偏移写入的输出端。
///
/// 多个 worker 会并发调用同一个实现，但各自的偏移区间互不重叠；实现方无需为重叠写入加锁。
/// 返回值小于 `buf.len()` 视为写入不完整，引擎会据此中止下载。
pub trait WriteAt: Send + Sync {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;
}
