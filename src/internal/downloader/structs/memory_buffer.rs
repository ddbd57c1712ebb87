//! 内存输出端：不落盘，按偏移写入一块可增长的缓冲区。

use std::sync::{Mutex, MutexGuard};

/// 内存中的定位写缓冲。写入超出当前长度时自动扩容，空洞以 0 填充。
#[derive(Debug, Default)]
pub struct MemoryBuffer {
    data: Mutex<Vec<u8>>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预分配 `len` 字节（以 0 填充）。
    pub fn with_len(len: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; len]),
        }
    }

    /// 当前长度。
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 复制出当前全部字节。
    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // 缓冲区只做整段拷贝，持锁线程 panic 时内容依然完整
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
