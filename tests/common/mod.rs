use std::sync::Arc;
use tempfile::NamedTempFile;
use pagedb::BufferPoolManager;
use anyhow::Result;

// Create a temporary database file for testing
#[allow(dead_code)]
pub fn create_temp_db_file() -> Result<(NamedTempFile, String)> {
    let file = NamedTempFile::new()?;
    let path = file.path().to_str().unwrap().to_string();
    Ok((file, path))
}

// Create a buffer pool manager with a temporary database
#[allow(dead_code)]
pub fn create_test_buffer_pool(pool_size: usize) -> Result<(Arc<BufferPoolManager>, NamedTempFile)> {
    let (file, path) = create_temp_db_file()?;
    let buffer_pool = Arc::new(BufferPoolManager::new(pool_size, path)?);
    Ok((buffer_pool, file))
}

// Read a page's raw bytes straight from the database file
#[allow(dead_code)]
pub fn read_raw_page(file: &NamedTempFile, page_id: i32) -> Result<Vec<u8>> {
    use pagedb::common::types::PAGE_SIZE;
    use std::io::{Read, Seek, SeekFrom};

    let mut f = std::fs::File::open(file.path())?;
    f.seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
    let mut buf = vec![0u8; PAGE_SIZE];
    f.read_exact(&mut buf)?;
    Ok(buf)
}
