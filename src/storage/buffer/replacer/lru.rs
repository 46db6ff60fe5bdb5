use std::collections::{HashSet, VecDeque};
use parking_lot::Mutex;

use crate::common::types::FrameId;

/// LRU replacement policy over unpinned frames.
///
/// Ordering reflects the time of the most recent unpin, not general access
/// recency: fetching a page pins its frame and removes it from here, and the
/// next unpin re-admits it at the tail. The internal lock is only ever taken
/// while the buffer pool lock is held.
pub struct LruReplacer {
    inner: Mutex<LruState>,
    num_pages: usize,
}

struct LruState {
    // Oldest unpin at the head; victims come off the head.
    victim_queue: VecDeque<FrameId>,
    members: HashSet<FrameId>,
}

impl LruReplacer {
    pub fn new(num_pages: usize) -> Self {
        Self {
            inner: Mutex::new(LruState {
                victim_queue: VecDeque::with_capacity(num_pages),
                members: HashSet::with_capacity(num_pages),
            }),
            num_pages,
        }
    }

    /// Remove and return the least recently unpinned frame, if any.
    pub fn victim(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock();
        let frame_id = inner.victim_queue.pop_front()?;
        inner.members.remove(&frame_id);
        Some(frame_id)
    }

    /// Mark a frame as in use; it must not be chosen as a victim.
    /// No-op if the frame is not currently a candidate.
    pub fn pin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if !inner.members.remove(&frame_id) {
            return;
        }
        if let Some(pos) = inner.victim_queue.iter().position(|&id| id == frame_id) {
            inner.victim_queue.remove(pos);
        }
    }

    /// Admit a frame as an eviction candidate, least recently so.
    /// Unpinning a frame that is already a candidate is a no-op.
    pub fn unpin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if inner.members.contains(&frame_id) {
            return;
        }
        // The pool never admits more frames than it owns; the capacity
        // guard makes over-admission a no-op rather than an overflow.
        if inner.victim_queue.len() < self.num_pages {
            inner.members.insert(frame_id);
            inner.victim_queue.push_back(frame_id);
        }
    }

    /// Number of frames currently eligible for eviction.
    pub fn size(&self) -> usize {
        self.inner.lock().victim_queue.len()
    }
}
