/// 内部导出的模块
mod internal;


/// 导出核心入口函数
pub use internal::entrance::remote::*;
pub use tokio_util::sync::CancellationToken;

/// 下载引擎：类型、钩子与输出端 trait（以 lib 为中心，此处统一导出）
pub mod downloader {
    use crate::internal;
    pub use internal::downloader::structs::*;
    pub use internal::downloader::traits::download::{DownloadHook, HookAbort};
    pub use internal::downloader::traits::write_at::WriteAt;

    pub use internal::downloader::structs::engine_config::{
        DEFAULT_CHUNK_SIZE, DEFAULT_MAX_STALL_TICKS, DEFAULT_STATS_INTERVAL, DEFAULT_WORKERS,
    };
    pub use internal::downloader::structs::retry_policy::{
        DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_DELAY,
    };

    // 纯函数：分片规划与文件名推断，便于调用方自行预估
    pub use internal::downloader::structs::range_engine::metadata::{
        file_name_from_url, parse_content_disposition, resolve_file_name,
    };
    pub use internal::downloader::structs::range_engine::planner::plan_ranges;
}

pub mod states {
    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }
}
