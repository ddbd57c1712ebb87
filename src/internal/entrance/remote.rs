use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::downloader::structs::range_engine::metadata::resolve_file_name;
use crate::internal::downloader::structs::{DownloadError, DownloadResult, RangeEngine};

/// 下载远程资源到本地文件
///
/// `save_path` 为 `None` 时使用响应头或 URL 推断出的文件名，保存到当前目录。
/// 文件会先按资源大小预分配，各分片直接写入各自的偏移；已存在的同名文件会被覆盖。
///
/// 返回结果中的 `file_name` 为保存文件的绝对路径。
///
/// example:
/// ```
/// use range_dl::{download_to_file, CancellationToken};
/// use range_dl::downloader::RangeEngine;
///
/// let engine = RangeEngine::new(&["Authorization: Bearer xxx"])?.workers(4);
/// let cancel = CancellationToken::new();
/// let result = download_to_file(&engine, "https://example.com/a.zip", None, &cancel).await?;
/// println!("{} ({} 字节)", result.file_name, result.size);
/// ```
pub async fn download_to_file(
    engine: &RangeEngine,
    url: &str,
    save_path: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<DownloadResult, DownloadError> {
    let meta = engine.resolve(url).await?;

    let path: PathBuf = match save_path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(resolve_file_name(&meta, url)),
    };
    debug!(url, path = %path.display(), size = meta.size, "创建本地文件");

    let file = tokio::fs::File::create(&path)
        .await
        .map_err(DownloadError::CreateFile)?;
    file.set_len(meta.size)
        .await
        .map_err(DownloadError::CreateFile)?;
    let file = file.into_std().await;

    let mut result = engine
        .download_with_meta(url, &meta, Arc::new(file), cancel)
        .await?;

    let absolute = std::path::absolute(&path).unwrap_or(path);
    result.file_name = absolute.display().to_string();
    Ok(result)
}
