/// 分片区间：`[begin, end)` 左闭右开，由规划器生成后不可变，只交给一个 worker 消费。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    /// 分片序号（从 0 开始）
    pub index: usize,
    /// 起始偏移（含）
    pub begin: u64,
    /// 结束偏移（不含）
    pub end: u64,
}

impl ByteRange {
    pub fn new(index: usize, begin: u64, end: u64) -> Self {
        Self { index, begin, end }
    }

    /// 区间字节数。
    pub fn len(&self) -> u64 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}
