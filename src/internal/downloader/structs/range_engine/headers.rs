//! 请求头解析：`key: value` 行 → `HeaderMap`，探测请求与每个分片请求都会带上。

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::super::download_error::DownloadError;

/// 解析形如 `Authorization: Bearer xxx` 的请求头行；值两端空白会被去掉，值中的 `:` 原样保留。
pub(crate) fn parse_header_lines<S: AsRef<str>>(lines: &[S]) -> Result<HeaderMap, DownloadError> {
    let mut headers = HeaderMap::new();
    for line in lines {
        let line = line.as_ref();
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| DownloadError::InvalidHeader(line.to_string()))?;

        let name = HeaderName::from_bytes(key.trim().as_bytes())
            .map_err(|_| DownloadError::InvalidHeader(line.to_string()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| DownloadError::InvalidHeader(line.to_string()))?;

        headers.append(name, value);
    }
    Ok(headers)
}

/// 读取数值型响应头（如 `Content-Length`）。
pub(crate) fn header_u64(headers: &HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
