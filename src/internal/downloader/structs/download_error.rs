//! 下载相关错误类型。

use reqwest::StatusCode;
use thiserror::Error;

use crate::internal::downloader::traits::download::HookAbort;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// 探测失败或资源不可下载（状态码异常、大小为 0 或未知），下载不会开始。
    #[error("获取资源元数据失败 ({url}): {reason}")]
    Meta { url: String, reason: String },

    #[error("URL 格式错误: {0}")]
    InvalidUrl(String),

    #[error("请求头格式错误: `{0}`，应为 `key: value`")]
    InvalidHeader(String),

    /// 网络抖动或非 400/500 的异常状态码，worker 会在本地重试。
    #[error("分片 {index} 在偏移 {offset} 处临时失败: {reason}")]
    Transient {
        index: usize,
        offset: u64,
        reason: String,
    },

    /// 状态码 400 / 500：服务器不会满足这个请求，整个下载中止。
    #[error("分片 {index} 在偏移 {offset} 处收到致命状态码 {status}")]
    FatalHttp {
        index: usize,
        offset: u64,
        status: StatusCode,
    },

    /// 服务器声明或实际返回的字节数与请求区间不一致。
    #[error("分片 {index} 在偏移 {offset} 处字节数不符: 期望 {expected}，服务器给出 {actual:?}")]
    Overflow {
        index: usize,
        offset: u64,
        expected: u64,
        actual: Option<u64>,
    },

    #[error("偏移 {offset} 处写入不完整: 期望 {expected} 字节，实际 {written} 字节")]
    ShortWrite {
        offset: u64,
        expected: usize,
        written: usize,
    },

    #[error("偏移 {offset} 处写入失败: {source}")]
    WriteAt {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("创建文件失败: {0}")]
    CreateFile(std::io::Error),

    #[error("分片 {index} 重试 {attempts} 次后仍失败: {last_error}")]
    RetriesExhausted {
        index: usize,
        attempts: u32,
        last_error: String,
    },

    #[error("下载结束但写入字节数不符: 期望 {expected}，实际 {written}")]
    Incomplete { expected: u64, written: u64 },

    #[error("下载被取消")]
    Cancelled,

    #[error("分片任务失败: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// 钩子在 before_start 中返回错误，中止下载。
    #[error("{0}")]
    HookAbort(#[from] HookAbort),

    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),
}

impl DownloadError {
    /// 是否值得重试：只有临时错误与底层网络错误会被 worker 重试。
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Request(_))
    }

    pub(crate) fn meta(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Meta {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transient(index: usize, offset: u64, reason: impl ToString) -> Self {
        Self::Transient {
            index,
            offset,
            reason: reason.to_string(),
        }
    }
}
