use std::sync::Arc;
use parking_lot::RwLock;

/// Page size in bytes (8KB)
pub const PAGE_SIZE: usize = 8192;

/// Page ID type; live page ids are non-negative
pub type PageId = i32;

/// Sentinel page id meaning "no page"
pub const INVALID_PAGE_ID: PageId = -1;

/// Buffer pool frame ID type
pub type FrameId = u32;

/// LSN (Log Sequence Number) type
pub type Lsn = u64;

/// Page structure
#[derive(Debug, Clone)]
pub struct Page {
    pub data: [u8; PAGE_SIZE],
    pub page_id: PageId,
    pub lsn: Lsn,
}

impl Page {
    pub fn new(page_id: PageId) -> Self {
        Self {
            data: [0; PAGE_SIZE],
            page_id,
            lsn: 0,
        }
    }
}

/// Smart pointer to a page; handed to clients and stable for the duration
/// of a pin
pub type PagePtr = Arc<RwLock<Page>>;

/// Buffer pool frame: a page handle plus its bookkeeping.
///
/// Frames are identified by their index in the pool's frame array; every
/// other structure (page table, free list, replacer) refers to a frame by
/// that index only. `page_id` mirrors the id of the resident page and is
/// INVALID_PAGE_ID while the frame sits on the free list.
#[derive(Debug)]
pub struct Frame {
    pub page: PagePtr,
    pub page_id: PageId,
    pub pin_count: u32,
    pub is_dirty: bool,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            page: Arc::new(RwLock::new(Page::new(INVALID_PAGE_ID))),
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
        }
    }

    /// Return the frame to its empty state, keeping the page allocation.
    pub fn reset(&mut self) {
        *self.page.write() = Page::new(INVALID_PAGE_ID);
        self.page_id = INVALID_PAGE_ID;
        self.pin_count = 0;
        self.is_dirty = false;
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
