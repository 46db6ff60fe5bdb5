use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use anyhow::Result;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::common::types::{Frame, FrameId, Page, PageId, PagePtr, INVALID_PAGE_ID};
use crate::storage::buffer::error::BufferPoolError;
use crate::storage::buffer::replacer::LruReplacer;
use crate::storage::disk::DiskManager;
use crate::wal::LogManager;

/// Bookkeeping shared by every public operation: the frame array, the page
/// table and the free list live behind one mutex. The replacer keeps its own
/// lock and is only ever called while this one is held, so the replacer lock
/// is strictly an inner lock.
struct PoolState {
    frames: Vec<Frame>,
    page_table: HashMap<PageId, FrameId>,
    free_list: VecDeque<FrameId>,
}

pub struct BufferPoolManager {
    pool_size: usize,
    state: Mutex<PoolState>,
    replacer: LruReplacer,
    disk_manager: Arc<DiskManager>,
    log_manager: Option<Arc<LogManager>>,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, db_path: impl AsRef<Path>) -> Result<Self, BufferPoolError> {
        let disk_manager = Arc::new(DiskManager::new(db_path)?);
        Ok(Self::with_parts(pool_size, disk_manager, None))
    }

    /// Create a new buffer pool manager with WAL support
    pub fn new_with_wal(pool_size: usize, db_path: impl AsRef<Path>,
                        log_manager: Arc<LogManager>) -> Result<Self, BufferPoolError> {
        let disk_manager = Arc::new(DiskManager::new(db_path)?);
        Ok(Self::with_parts(pool_size, disk_manager, Some(log_manager)))
    }

    fn with_parts(pool_size: usize, disk_manager: Arc<DiskManager>,
                  log_manager: Option<Arc<LogManager>>) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        let mut free_list = VecDeque::with_capacity(pool_size);

        // Initially, every frame is on the free list.
        for i in 0..pool_size {
            frames.push(Frame::new());
            free_list.push_back(i as FrameId);
        }

        Self {
            pool_size,
            state: Mutex::new(PoolState {
                frames,
                page_table: HashMap::new(),
                free_list,
            }),
            replacer: LruReplacer::new(pool_size),
            disk_manager,
            log_manager,
        }
    }

    /// Fetch a page from the buffer pool, reading it from disk on a miss.
    ///
    /// The returned handle stays valid until the matching `unpin_page`; the
    /// frame cannot be evicted while any pin on it is outstanding.
    pub fn fetch_page(&self, page_id: PageId) -> Result<PagePtr, BufferPoolError> {
        if page_id < 0 {
            return Err(BufferPoolError::InvalidPageId(page_id));
        }

        let mut state = self.state.lock();

        // Hit: pin the frame and hand out the existing page handle.
        if let Some(&frame_id) = state.page_table.get(&page_id) {
            self.replacer.pin(frame_id);
            let frame = &mut state.frames[frame_id as usize];
            frame.pin_count += 1;
            trace!("fetch hit: page {} in frame {}", page_id, frame_id);
            return Ok(frame.page.clone());
        }

        // Miss: claim a frame (free list first), then read from disk into it.
        let frame_id = self.take_candidate_frame(&mut state)?;

        {
            let frame = &mut state.frames[frame_id as usize];
            let mut page = frame.page.write();
            *page = Page::new(page_id);
            if let Err(e) = self.disk_manager.read_page(page_id, &mut page) {
                // Leave the frame empty and on the free list so the pool
                // invariants still hold after a failed read.
                drop(page);
                frame.reset();
                state.free_list.push_back(frame_id);
                return Err(e.into());
            }
        }

        let page = {
            let frame = &mut state.frames[frame_id as usize];
            frame.page_id = page_id;
            frame.pin_count = 1;
            frame.is_dirty = false;
            frame.page.clone()
        };
        state.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);

        debug!("fetch miss: page {} loaded into frame {}", page_id, frame_id);
        Ok(page)
    }

    /// Allocate a fresh page and pin it into a frame with zeroed bytes.
    pub fn new_page(&self) -> Result<(PagePtr, PageId), BufferPoolError> {
        let mut state = self.state.lock();

        let frame_id = self.take_candidate_frame(&mut state)?;

        let page_id = match self.disk_manager.allocate_page() {
            Ok(id) => id,
            Err(e) => {
                state.free_list.push_back(frame_id);
                return Err(e.into());
            }
        };

        let page = {
            let frame = &mut state.frames[frame_id as usize];
            *frame.page.write() = Page::new(page_id);
            frame.page_id = page_id;
            frame.pin_count = 1;
            frame.is_dirty = false;
            frame.page.clone()
        };
        state.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);

        debug!("new page {} in frame {}", page_id, frame_id);
        Ok((page, page_id))
    }

    /// Release one pin on a page.
    ///
    /// `is_dirty` is OR-ed into the frame's dirty bit; once set it stays set
    /// until the next write-back. When the pin count reaches zero the frame
    /// becomes an eviction candidate.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), BufferPoolError> {
        if page_id < 0 {
            return Err(BufferPoolError::InvalidPageId(page_id));
        }

        let mut state = self.state.lock();

        let frame_id = match state.page_table.get(&page_id) {
            Some(&id) => id,
            None => return Err(BufferPoolError::PageNotFound(page_id)),
        };

        let frame = &mut state.frames[frame_id as usize];
        if frame.pin_count == 0 {
            return Err(BufferPoolError::PageNotPinned(page_id));
        }

        frame.is_dirty |= is_dirty;
        frame.pin_count -= 1;
        if frame.pin_count == 0 {
            self.replacer.unpin(frame_id);
        }

        Ok(())
    }

    /// Write a page's in-memory bytes to disk regardless of the dirty bit,
    /// then clear it. Pin status is untouched.
    pub fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolError> {
        if page_id < 0 {
            return Err(BufferPoolError::InvalidPageId(page_id));
        }

        let mut state = self.state.lock();

        let frame_id = match state.page_table.get(&page_id) {
            Some(&id) => id,
            None => return Err(BufferPoolError::PageNotFound(page_id)),
        };

        self.flush_frame(&mut state, frame_id)
    }

    /// Flush every resident page to disk, dirty or not.
    ///
    /// Holds the pool lock for the whole sweep; concurrent operations wait
    /// until it completes.
    pub fn flush_all_pages(&self) -> Result<(), BufferPoolError> {
        // WAL rule: log records become durable before any page they cover.
        if let Some(ref log_manager) = self.log_manager {
            log_manager.flush()?;
        }

        let mut state = self.state.lock();
        for i in 0..state.frames.len() {
            if state.frames[i].page_id == INVALID_PAGE_ID {
                continue;
            }
            self.flush_frame(&mut state, i as FrameId)?;
        }

        Ok(())
    }

    /// Drop a page from the pool and deallocate it on disk.
    ///
    /// Refused while any pin on it is outstanding; deleting a page that is
    /// not resident succeeds without touching disk. Residency is the only
    /// gate, so the sentinel id falls through to the non-resident arm.
    pub fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolError> {
        let mut state = self.state.lock();

        let frame_id = match state.page_table.get(&page_id) {
            Some(&id) => id,
            None => return Ok(()),
        };

        if state.frames[frame_id as usize].pin_count > 0 {
            return Err(BufferPoolError::PagePinned(page_id));
        }

        self.disk_manager.deallocate_page(page_id)?;
        state.page_table.remove(&page_id);
        state.frames[frame_id as usize].reset();
        // An unpinned resident frame sits in the replacer; take it out
        // before it goes back on the free list.
        self.replacer.pin(frame_id);
        state.free_list.push_back(frame_id);

        debug!("deleted page {} from frame {}", page_id, frame_id);
        Ok(())
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Get a reference to the disk manager
    pub fn disk_manager(&self) -> Arc<DiskManager> {
        self.disk_manager.clone()
    }

    /// Get a reference to the log manager, if available
    pub fn log_manager(&self) -> Option<Arc<LogManager>> {
        self.log_manager.clone()
    }

    /// Claim a frame for a new occupant: free list first, then the replacer.
    ///
    /// On success the frame is unmapped and empty, its previous contents
    /// written back if they were dirty.
    fn take_candidate_frame(&self, state: &mut PoolState) -> Result<FrameId, BufferPoolError> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(frame_id);
        }

        let frame_id = match self.replacer.victim() {
            Some(id) => id,
            None => return Err(BufferPoolError::NoFreeFrames),
        };

        if state.frames[frame_id as usize].is_dirty {
            if let Err(e) = self.flush_frame(state, frame_id) {
                // The frame is still resident and unpinned; re-admit it so
                // the replacer stays consistent with the page table.
                self.replacer.unpin(frame_id);
                return Err(e);
            }
        }

        let old_page_id = {
            let frame = &mut state.frames[frame_id as usize];
            let old = frame.page_id;
            frame.page_id = INVALID_PAGE_ID;
            frame.is_dirty = false;
            old
        };
        state.page_table.remove(&old_page_id);

        debug!("evicted page {} from frame {}", old_page_id, frame_id);
        Ok(frame_id)
    }

    /// Write one frame's page out and clear its dirty bit, flushing the WAL
    /// up to the page's LSN first when a log manager is configured.
    fn flush_frame(&self, state: &mut PoolState, frame_id: FrameId) -> Result<(), BufferPoolError> {
        {
            let frame = &state.frames[frame_id as usize];
            let page = frame.page.read();
            if let Some(ref log_manager) = self.log_manager {
                log_manager.flush_till_lsn(page.lsn)?;
            }
            self.disk_manager.write_page(&page)?;
            debug!("wrote back page {} from frame {}", page.page_id, frame_id);
        }
        state.frames[frame_id as usize].is_dirty = false;
        Ok(())
    }
}
