//! 分片规划：把 `[0, size)` 切成连续、不重叠的区间，每个 worker 一段，余数归最后一段。

use super::super::byte_range::ByteRange;

/// 计算分片区间。
///
/// - 服务器不支持 Range 或请求 0 个 worker 时按 1 个处理；
/// - worker 数多于字节数时收缩到 `size`，保证没有空区间；
/// - `per = size / n`，第 `i` 段为 `[i*per, (i+1)*per)`，最后一段的终点是 `size`。
pub fn plan_ranges(size: u64, workers: usize, supports_ranges: bool) -> Vec<ByteRange> {
    if size == 0 {
        return Vec::new();
    }

    let requested = if supports_ranges { workers.max(1) } else { 1 };
    let count = (requested as u64).min(size);
    let per_worker = size / count;

    (0..count)
        .map(|i| {
            let begin = i * per_worker;
            let end = if i == count - 1 { size } else { begin + per_worker };
            ByteRange::new(i as usize, begin, end)
        })
        .collect()
}
