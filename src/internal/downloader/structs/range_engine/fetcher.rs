//! 分片请求：对 `[begin, end)` 发起单次 Range GET，校验服务器是否严格按区间返回，
//! 通过后把响应体作为字节流交给 worker，本身不写任何数据。

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::future;
use futures_util::stream::BoxStream;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderValue, RANGE};
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

use super::super::download_error::DownloadError;
use super::headers::header_u64;

/// 分片响应体字节流。
pub(crate) type SegmentBody = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// 生成 Range 请求头：`bytes=start-(end-1)`，end 为不含上界。
pub(crate) fn range_header(start: u64, end: u64) -> String {
    let end_inclusive = end.saturating_sub(1);
    format!("bytes={}-{}", start, end_inclusive)
}

/// 发起分片请求时的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct FetchSegmentParams<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub headers: &'a HeaderMap,
    pub index: usize,
    pub begin: u64,
    pub end: u64,
    /// 服务器不支持 Range：续传时接受从头开始的完整 200 响应
    pub restartable: bool,
    pub token: &'a CancellationToken,
}

/// 请求 `[begin, end)` 并返回响应体字节流，流的第一个字节总是 `begin` 处的数据。
pub(crate) async fn fetch_segment(params: FetchSegmentParams<'_>) -> Result<SegmentBody, DownloadError> {
    let mut headers = params.headers.clone();
    let range = HeaderValue::from_str(&range_header(params.begin, params.end))
        .map_err(|e| DownloadError::transient(params.index, params.begin, e))?;
    headers.insert(RANGE, range);

    let request = params.client.get(params.url).headers(headers).send();
    let resp = tokio::select! {
        biased;
        _ = params.token.cancelled() => return Err(DownloadError::Cancelled),
        resp = request => resp.map_err(|e| DownloadError::transient(params.index, params.begin, e))?,
    };

    let skip = check_segment_response(CheckSegmentParams {
        index: params.index,
        begin: params.begin,
        end: params.end,
        restartable: params.restartable,
        status: resp.status(),
        headers: resp.headers(),
    })?;

    let body = resp.bytes_stream();
    if skip == 0 {
        return Ok(body.boxed());
    }
    Ok(skip_prefix(body, skip).boxed())
}

/// 丢弃字节流开头的 `skip` 个字节。
fn skip_prefix<S>(body: S, skip: u64) -> impl futures_util::Stream<Item = Result<Bytes, reqwest::Error>>
where
    S: futures_util::Stream<Item = Result<Bytes, reqwest::Error>>,
{
    let mut remaining = skip;
    body.filter_map(move |chunk| {
        let out = match chunk {
            Ok(mut bytes) => {
                let n = remaining.min(bytes.len() as u64) as usize;
                remaining -= n as u64;
                let rest = bytes.split_off(n);
                (!rest.is_empty()).then_some(Ok(rest))
            }
            Err(e) => Some(Err(e)),
        };
        future::ready(out)
    })
}

/// 校验分片响应时的参数。
pub(crate) struct CheckSegmentParams<'a> {
    pub index: usize,
    pub begin: u64,
    pub end: u64,
    pub restartable: bool,
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
}

/// 分类分片响应。
///
/// - 400 / 500：致命，服务器不会满足该请求；
/// - 其它非 200 / 206：临时错误，可重试；
/// - `Content-Length` 与请求区间长度不一致（含缺失）：字节数不符，按致命处理以免写错位置；
/// - `restartable` 时，续传收到的完整 200 响应可接受，返回需要跳过的前缀字节数。
pub(crate) fn check_segment_response(params: CheckSegmentParams<'_>) -> Result<u64, DownloadError> {
    let CheckSegmentParams {
        index,
        begin,
        end,
        restartable,
        status,
        headers,
    } = params;

    if status == StatusCode::BAD_REQUEST || status == StatusCode::INTERNAL_SERVER_ERROR {
        return Err(DownloadError::FatalHttp {
            index,
            offset: begin,
            status,
        });
    }

    if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
        return Err(DownloadError::transient(index, begin, format!("状态码 {status}")));
    }

    let expected = end - begin;
    let declared = header_u64(headers, CONTENT_LENGTH);
    // 不支持 Range 的服务器总是从头返回完整内容
    if restartable && begin > 0 && status == StatusCode::OK && declared == Some(end) {
        return Ok(begin);
    }
    if declared != Some(expected) {
        return Err(DownloadError::Overflow {
            index,
            offset: begin,
            expected,
            actual: declared,
        });
    }

    Ok(0)
}
