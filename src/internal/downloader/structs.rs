pub mod byte_range;
pub mod download_error;
pub mod download_event;
pub mod download_hooks_container;
pub mod download_result;
pub mod engine_config;
pub mod hook_adapters;
pub mod memory_buffer;
pub mod positional_writer;
pub mod range_engine;
pub mod resource_meta;
pub mod retry_policy;
pub mod stats_snapshot;

// 重导出公共类型
pub use byte_range::ByteRange;
pub use download_error::DownloadError;
pub use download_event::DownloadEvent;
pub use download_hooks_container::DownloadHooksContainer;
pub use download_result::DownloadResult;
pub use engine_config::EngineConfig;
pub use memory_buffer::MemoryBuffer;
pub use positional_writer::PositionalWriter;
pub use range_engine::RangeEngine;
pub use resource_meta::ResourceMeta;
pub use retry_policy::RetryPolicy;
pub use stats_snapshot::StatsSnapshot;
