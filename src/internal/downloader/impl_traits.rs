pub mod impl_write_at;
