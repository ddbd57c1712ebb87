/// 统计快照：由统计任务按固定节拍产生，调用方通过引擎的 `stats()` 读取或监听。
///
/// 进度比例可用 [`StatsSnapshot::pct`] 获取。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// 所有分片累计已写入的字节数
    pub downloaded: u64,
    /// 瞬时速度（字节/秒）
    pub speed: u64,
    /// 资源总大小（字节）
    pub total: u64,
}

impl StatsSnapshot {
    /// 进度百分比（0～100）；总大小为 0 时返回 `f64::NAN`。
    pub fn pct(&self) -> f64 {
        if self.total == 0 {
            return f64::NAN;
        }
        (self.downloaded as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.downloaded >= self.total
    }
}
