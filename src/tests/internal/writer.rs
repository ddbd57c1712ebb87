//! 定位写入测试：内存缓冲、本地文件、写入不完整与 I/O 错误。

use std::io;
use std::sync::Arc;

use bytes::Bytes;

use crate::downloader::{DownloadError, MemoryBuffer, PositionalWriter, WriteAt};

/// 每次少写一个字节的输出端。
struct ShortSink;

impl WriteAt for ShortSink {
    fn write_at(&self, buf: &[u8], _offset: u64) -> io::Result<usize> {
        Ok(buf.len().saturating_sub(1))
    }
}

/// 总是失败的输出端。
struct BrokenSink;

impl WriteAt for BrokenSink {
    fn write_at(&self, _buf: &[u8], _offset: u64) -> io::Result<usize> {
        Err(io::Error::other("磁盘已满"))
    }
}

#[tokio::test]
async fn out_of_order_writes_land_at_offsets() {
    let buffer = Arc::new(MemoryBuffer::new());
    let writer = PositionalWriter::new(buffer.clone());

    writer.write_chunk(Bytes::from_static(b"world"), 6).await.unwrap();
    writer.write_chunk(Bytes::from_static(b"hello "), 0).await.unwrap();

    assert_eq!(buffer.to_vec(), b"hello world");
}

#[tokio::test]
async fn gaps_are_zero_filled() {
    let buffer = Arc::new(MemoryBuffer::with_len(4));
    let writer = PositionalWriter::new(buffer.clone());

    let n = writer.write_chunk(Bytes::from_static(b"ab"), 6).await.unwrap();
    assert_eq!(n, 2);
    assert_eq!(buffer.to_vec(), vec![0, 0, 0, 0, 0, 0, b'a', b'b']);
}

#[tokio::test]
async fn concurrent_disjoint_writes() {
    let buffer = Arc::new(MemoryBuffer::with_len(4096));
    let writer = PositionalWriter::new(buffer.clone());

    let mut tasks = Vec::new();
    for i in 0..16u8 {
        let writer = writer.clone();
        tasks.push(tokio::spawn(async move {
            let chunk = Bytes::from(vec![i; 256]);
            writer.write_chunk(chunk, i as u64 * 256).await
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap().unwrap(), 256);
    }

    let data = buffer.to_vec();
    for i in 0..16usize {
        assert!(data[i * 256..(i + 1) * 256].iter().all(|&b| b == i as u8));
    }
}

#[tokio::test]
async fn short_write_is_reported() {
    let writer = PositionalWriter::new(Arc::new(ShortSink));
    let err = writer.write_chunk(Bytes::from_static(b"abcd"), 10).await.unwrap_err();
    assert!(
        matches!(
            err,
            DownloadError::ShortWrite {
                offset: 10,
                expected: 4,
                written: 3
            }
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn sink_error_is_write_at() {
    let writer = PositionalWriter::new(Arc::new(BrokenSink));
    let err = writer.write_chunk(Bytes::from_static(b"x"), 7).await.unwrap_err();
    assert!(matches!(err, DownloadError::WriteAt { offset: 7, .. }), "{err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn file_sink_writes_at_offsets() {
    let path = std::env::temp_dir().join(format!("range_dl_writer_{}.bin", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(10).unwrap();
    let writer = PositionalWriter::new(Arc::new(file));

    writer.write_chunk(Bytes::from_static(b"56789"), 5).await.unwrap();
    writer.write_chunk(Bytes::from_static(b"01234"), 0).await.unwrap();
    drop(writer);

    assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
    let _ = std::fs::remove_file(&path);
}
