// Export public modules
pub mod common;
pub mod storage;
pub mod wal;

// Re-export key items for convenient access
pub use storage::buffer::BufferPoolManager;
pub use storage::buffer::BufferPoolError;
pub use storage::disk::DiskManager;
pub use storage::disk::DiskManagerError;
pub use wal::LogManager;
