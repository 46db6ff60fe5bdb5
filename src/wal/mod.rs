// Write-ahead logging hook for the buffer pool

pub mod log_manager;

pub use log_manager::{LogManager, LogManagerConfig, LogManagerError};
