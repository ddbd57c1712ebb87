use std::time::Duration;

/// 默认最大重试次数（不含首次请求）
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// 默认首次重试等待
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// 默认重试等待上限
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_millis(2000);

/// 分片重试策略：有上限的重试次数 + 指数退避（封顶）。
///
/// 次数按「连续无进展的失败」计算：某次尝试写入了新数据后计数清零。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次请求）
    pub max_retries: u32,
    /// 首次重试等待，之后每次翻倍
    pub base_delay: Duration,
    /// 等待上限
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// 不重试，首次失败即返回。
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// 第 `attempt` 次重试（从 1 开始）前的等待时间。
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1);
        let multiplier = 1u32.checked_shl(shift).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// 已失败 `attempts` 次后是否还允许重试。
    pub fn allows(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }
}
