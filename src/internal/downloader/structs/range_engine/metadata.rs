//! 元数据探测：资源大小、是否支持 Range、建议文件名。
//!
//! 优先发 HEAD；服务器拒绝 HEAD（405 / 501）时改发 `GET` + `Range: bytes=0-0`，
//! 从 `Content-Range` 的总长度里取大小，响应体不读取。探测本身不重试，由调用方决定。

use percent_encoding::percent_decode_str;
use reqwest::header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, HeaderValue, RANGE};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::super::download_error::DownloadError;
use super::super::resource_meta::ResourceMeta;
use super::headers::header_u64;

/// 兜底文件名：URL 与响应头都拿不到名字时使用。
const FALLBACK_FILE_NAME: &str = "download";

/// 探测参数（形参超过 3 个时用 struct 承载）。
pub(crate) struct ResolveMetaParams<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub headers: &'a HeaderMap,
}

/// 探测远程资源的元数据。
pub(crate) async fn resolve_meta(params: ResolveMetaParams<'_>) -> Result<ResourceMeta, DownloadError> {
    let resp = params
        .client
        .head(params.url)
        .headers(params.headers.clone())
        .send()
        .await
        .map_err(|e| DownloadError::meta(params.url, format!("HEAD 请求失败: {e}")))?;

    let status = resp.status();
    if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
        debug!(url = params.url, %status, "服务器拒绝 HEAD，改用 GET 探测");
        return resolve_with_get(params).await;
    }

    ensure_success(params.url, status)?;
    // HEAD 响应没有响应体，大小只能从响应头里取
    let size = header_u64(resp.headers(), CONTENT_LENGTH);
    build_meta(params.url, resp.headers(), size, false)
}

async fn resolve_with_get(params: ResolveMetaParams<'_>) -> Result<ResourceMeta, DownloadError> {
    let mut headers = params.headers.clone();
    headers.insert(RANGE, HeaderValue::from_static("bytes=0-0"));

    let resp = params
        .client
        .get(params.url)
        .headers(headers)
        .send()
        .await
        .map_err(|e| DownloadError::meta(params.url, format!("GET 探测失败: {e}")))?;

    let status = resp.status();
    ensure_success(params.url, status)?;

    let partial = status == StatusCode::PARTIAL_CONTENT;
    let size = if partial {
        content_range_total(resp.headers())
    } else {
        header_u64(resp.headers(), CONTENT_LENGTH)
    };
    build_meta(params.url, resp.headers(), size, partial)
}

fn ensure_success(url: &str, status: StatusCode) -> Result<(), DownloadError> {
    if status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT {
        return Ok(());
    }
    Err(DownloadError::meta(url, format!("状态码 {status}")))
}

fn build_meta(
    url: &str,
    headers: &HeaderMap,
    size: Option<u64>,
    ranges_proven: bool,
) -> Result<ResourceMeta, DownloadError> {
    let size = match size {
        Some(0) => return Err(DownloadError::meta(url, "资源大小为 0，无法下载")),
        Some(size) => size,
        None => return Err(DownloadError::meta(url, "服务器未返回资源大小")),
    };

    let supports_ranges = ranges_proven || advertises_ranges(headers);
    let suggested_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_disposition)
        .unwrap_or_default();

    info!(url, size, supports_ranges, name = %suggested_name, "资源元数据探测完成");

    Ok(ResourceMeta {
        size,
        supports_ranges,
        suggested_name,
    })
}

/// `Accept-Ranges` 或非标准的 `Accept-Range` 带非空值即视为支持分片；`none` 表示明确不支持。
pub(crate) fn advertises_ranges(headers: &HeaderMap) -> bool {
    [ACCEPT_RANGES.as_str(), "accept-range"]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .any(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

/// `Content-Range: bytes 0-0/12345` → `12345`；总长度未知（`*`）时返回 `None`。
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit_once('/'))
        .and_then(|(_, total)| total.trim().parse().ok())
}

/// 从 `Content-Disposition` 中取文件名。
///
/// `filename*=UTF-8''...` 优先（百分号解码），其次 `filename=`（去引号）。
/// 结果只保留最后一级路径，避免写到保存目录之外。
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for part in value.split(';') {
        let Some((key, val)) = part.trim().split_once('=') else {
            continue;
        };
        let val = val.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'encoded
                let encoded = val.splitn(3, '\'').nth(2).unwrap_or(val).trim_matches('"');
                if let Ok(decoded) = percent_decode_str(encoded).decode_utf8() {
                    if let Some(name) = sanitize_file_name(&decoded) {
                        return Some(name);
                    }
                }
            }
            "filename" if plain.is_none() => {
                plain = sanitize_file_name(val.trim_matches('"'));
            }
            _ => {}
        }
    }

    plain
}

/// 从 URL 路径最后一段取文件名（百分号解码，忽略查询串）。
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let decoded = percent_decode_str(last).decode_utf8().ok()?;
    sanitize_file_name(&decoded)
}

/// 下载结果使用的文件名：响应头建议名 → URL 路径 → `download`。
pub fn resolve_file_name(meta: &ResourceMeta, url: &str) -> String {
    if !meta.suggested_name.is_empty() {
        return meta.suggested_name.clone();
    }
    file_name_from_url(url).unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}
