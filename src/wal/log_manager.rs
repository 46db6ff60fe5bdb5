use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::common::types::Lsn;

/// Error type for log manager operations
#[derive(Error, Debug)]
pub enum LogManagerError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for log manager operations
pub type Result<T> = std::result::Result<T, LogManagerError>;

/// Configuration for the write-ahead log
#[derive(Debug, Clone)]
pub struct LogManagerConfig {
    /// Path of the append-only log file
    pub log_path: PathBuf,
    /// Sync the log file to stable storage on every flush
    pub force_sync: bool,
}

/// Append-only write-ahead log.
///
/// The buffer pool relies on one rule: log records covering a page must be
/// durable before that page is written to disk. `flush_till_lsn` is the hook
/// the pool calls right before every page write-back.
///
/// Records are framed as `lsn: u64 | len: u32 | payload` in little-endian.
/// LSNs start at 1; an LSN of 0 on a page means it was never logged.
pub struct LogManager {
    log_file: Mutex<File>,
    // Records appended but not yet written to the file.
    buffer: Mutex<Vec<u8>>,
    current_lsn: AtomicU64,
    flushed_lsn: AtomicU64,
    force_sync: bool,
}

impl LogManager {
    pub fn new(config: LogManagerConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;

        Ok(Self {
            log_file: Mutex::new(file),
            buffer: Mutex::new(Vec::new()),
            current_lsn: AtomicU64::new(0),
            flushed_lsn: AtomicU64::new(0),
            force_sync: config.force_sync,
        })
    }

    /// Append a record to the log buffer and return its LSN.
    pub fn append(&self, payload: &[u8]) -> Result<Lsn> {
        let mut buffer = self.buffer.lock();
        let lsn = self.current_lsn.fetch_add(1, Ordering::SeqCst) + 1;

        buffer.write_u64::<LittleEndian>(lsn)?;
        buffer.write_u32::<LittleEndian>(payload.len() as u32)?;
        buffer.extend_from_slice(payload);

        Ok(lsn)
    }

    /// Write all buffered records to the log file and return the last
    /// durable LSN.
    pub fn flush(&self) -> Result<Lsn> {
        let mut buffer = self.buffer.lock();
        let durable_lsn = self.current_lsn.load(Ordering::SeqCst);

        if !buffer.is_empty() {
            let mut file = self.log_file.lock();
            file.write_all(&buffer)?;
            if self.force_sync {
                file.sync_all()?;
            }
            buffer.clear();
            debug!("flushed log up to LSN {}", durable_lsn);
        }

        self.flushed_lsn.store(durable_lsn, Ordering::SeqCst);
        Ok(durable_lsn)
    }

    /// Flush the log up to the specified LSN; no-op when the watermark
    /// already covers it.
    pub fn flush_till_lsn(&self, target_lsn: Lsn) -> Result<()> {
        if self.flushed_lsn.load(Ordering::SeqCst) >= target_lsn {
            return Ok(());
        }
        self.flush()?;
        Ok(())
    }

    /// LSN of the most recently appended record
    pub fn current_lsn(&self) -> Lsn {
        self.current_lsn.load(Ordering::SeqCst)
    }

    /// Highest LSN known to be durable
    pub fn flushed_lsn(&self) -> Lsn {
        self.flushed_lsn.load(Ordering::SeqCst)
    }
}
