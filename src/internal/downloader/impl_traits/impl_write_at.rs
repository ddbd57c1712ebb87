//! [`WriteAt`] 的内置实现：本地文件与内存缓冲。

use std::fs::File;
use std::io;

use crate::internal::downloader::structs::MemoryBuffer;
use crate::internal::downloader::traits::write_at::WriteAt;

impl WriteAt for File {
    #[cfg(unix)]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        FileExt::write_all_at(self, buf, offset)?;
        Ok(buf.len())
    }

    #[cfg(windows)]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        let mut written = 0usize;
        while written < buf.len() {
            let n = self.seek_write(&buf[written..], offset + written as u64)?;
            if n == 0 {
                break;
            }
            written += n;
        }
        Ok(written)
    }
}

impl WriteAt for MemoryBuffer {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "偏移超出内存可寻址范围"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "写入区间溢出"))?;

        let mut data = self.lock();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}
