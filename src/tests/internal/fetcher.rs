//! 分片请求测试：Range 头格式、响应分类、对夹具服务器的真实请求。

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::downloader::DownloadError;
use crate::internal::downloader::structs::range_engine::fetcher::{
    CheckSegmentParams, FetchSegmentParams, check_segment_response, fetch_segment, range_header,
};
use crate::tests::{FixtureOptions, FixtureServer, random_payload};

fn with_length(len: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
    headers
}

fn check(index: usize, begin: u64, end: u64, status: StatusCode, headers: &HeaderMap) -> Result<u64, DownloadError> {
    check_segment_response(CheckSegmentParams {
        index,
        begin,
        end,
        restartable: false,
        status,
        headers,
    })
}

#[test]
fn range_header_is_inclusive() {
    assert_eq!(range_header(0, 333), "bytes=0-332");
    assert_eq!(range_header(666, 1000), "bytes=666-999");
    assert_eq!(range_header(5, 6), "bytes=5-5");
}

#[test]
fn classification_of_statuses() {
    let ok = with_length(100);

    assert_eq!(check(0, 0, 100, StatusCode::PARTIAL_CONTENT, &ok).unwrap(), 0);
    assert_eq!(check(0, 0, 100, StatusCode::OK, &ok).unwrap(), 0);

    for status in [StatusCode::BAD_REQUEST, StatusCode::INTERNAL_SERVER_ERROR] {
        let err = check(2, 50, 150, status, &ok).unwrap_err();
        assert!(
            matches!(err, DownloadError::FatalHttp { index: 2, offset: 50, status: s } if s == status),
            "{err:?}"
        );
        assert!(!err.is_transient());
    }

    for status in [
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::BAD_GATEWAY,
        StatusCode::NOT_FOUND,
    ] {
        let err = check(1, 10, 110, status, &ok).unwrap_err();
        assert!(err.is_transient(), "{status} 应为临时错误");
    }
}

#[test]
fn length_mismatch_is_overflow() {
    let err = check(3, 0, 100, StatusCode::PARTIAL_CONTENT, &with_length(101)).unwrap_err();
    assert!(
        matches!(
            err,
            DownloadError::Overflow {
                index: 3,
                offset: 0,
                expected: 100,
                actual: Some(101)
            }
        ),
        "{err:?}"
    );

    let err = check(0, 0, 100, StatusCode::PARTIAL_CONTENT, &HeaderMap::new()).unwrap_err();
    assert!(matches!(err, DownloadError::Overflow { actual: None, .. }), "{err:?}");
    assert!(!err.is_transient());
}

#[test]
fn full_response_on_resume_without_ranges() {
    let full = with_length(1000);
    let restart = |begin, status| {
        check_segment_response(CheckSegmentParams {
            index: 0,
            begin,
            end: 1000,
            restartable: true,
            status,
            headers: &full,
        })
    };

    // 续传收到完整内容：跳过游标之前的字节
    assert_eq!(restart(400, StatusCode::OK).unwrap(), 400);
    // 206 必须严格按区间返回
    assert!(matches!(
        restart(400, StatusCode::PARTIAL_CONTENT),
        Err(DownloadError::Overflow { expected: 600, actual: Some(1000), .. })
    ));
    // 支持 Range 时完整响应仍是字节数不符
    assert!(matches!(
        check(0, 400, 1000, StatusCode::OK, &full),
        Err(DownloadError::Overflow { .. })
    ));
}

#[tokio::test]
async fn restartable_fetch_skips_prefix() {
    let payload = random_payload(1000);
    let server = FixtureServer::start(
        payload.clone(),
        FixtureOptions {
            accept_ranges: None,
            ..Default::default()
        },
    )
    .await;
    let client = reqwest::Client::new();
    let url = server.url("/a");
    let headers = HeaderMap::new();
    let token = CancellationToken::new();

    let mut body = fetch_segment(FetchSegmentParams {
        client: &client,
        url: &url,
        headers: &headers,
        index: 0,
        begin: 400,
        end: 1000,
        restartable: true,
        token: &token,
    })
    .await
    .unwrap();

    let mut received = Vec::new();
    while let Some(chunk) = body.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(received, payload[400..]);
}

#[tokio::test]
async fn fetches_exact_slice() {
    let payload = random_payload(1000);
    let server = FixtureServer::start(payload.clone(), FixtureOptions::default()).await;
    let client = reqwest::Client::new();
    let url = server.url("/a");
    let headers = HeaderMap::new();
    let token = CancellationToken::new();

    let mut body = fetch_segment(FetchSegmentParams {
        client: &client,
        url: &url,
        headers: &headers,
        index: 1,
        begin: 333,
        end: 666,
        restartable: false,
        token: &token,
    })
    .await
    .unwrap();

    let mut received = Vec::new();
    while let Some(chunk) = body.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(received, payload[333..666]);
    assert_eq!(server.get_ranges(), vec![Some("bytes=333-665".to_string())]);
}

#[tokio::test]
async fn cancelled_token_short_circuits() {
    let server = FixtureServer::start(
        random_payload(100),
        FixtureOptions {
            body_delay: Some(std::time::Duration::from_secs(30)),
            ..Default::default()
        },
    )
    .await;
    let client = reqwest::Client::new();
    let url = server.url("/a");
    let headers = HeaderMap::new();
    let token = CancellationToken::new();
    token.cancel();

    let result = fetch_segment(FetchSegmentParams {
        client: &client,
        url: &url,
        headers: &headers,
        index: 0,
        begin: 0,
        end: 100,
        restartable: false,
        token: &token,
    })
    .await;
    assert!(matches!(result, Err(DownloadError::Cancelled)));
}
