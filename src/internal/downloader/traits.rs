pub mod download;
pub mod write_at;
