use std::time::Duration;

/// 单次下载的结果，所有分片完成后由引擎生成。
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    /// 使用的文件名（经入口函数保存到本地时为绝对路径）
    pub file_name: String,
    /// 最终大小（字节）
    pub size: u64,
    /// 平均速度（字节/秒）
    pub avg_speed: f64,
    /// 总耗时
    pub time_taken: Duration,
}

impl DownloadResult {
    /// 根据耗时计算平均速度；不足 1 秒按 1 秒计，只影响平均速度，不影响 `time_taken`。
    pub(crate) fn from_elapsed(file_name: String, size: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64().max(1.0);
        Self {
            file_name,
            size,
            avg_speed: size as f64 / secs,
            time_taken: elapsed,
        }
    }
}
