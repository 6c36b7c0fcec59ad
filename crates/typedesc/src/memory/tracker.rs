// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-value allocation bookkeeping.
//!
//! A [`MemoryTracker`] owns every auxiliary buffer allocated on behalf of one
//! value, plus the manager they came from. `release_all` hands each buffer
//! back to that manager exactly once; it is a no-op on an empty tracker.
//! A buffer still borrowed through [`BufferRef::with`] at release time goes
//! back to its manager when that borrow ends.

use super::{Block, MemoryManager};
use crate::config::{TRACKER_GROWTH_FACTOR, TRACKER_INITIAL_CAPACITY};
use std::sync::{Arc, Weak};

/// A tracked block plus the manager that must take it back.
#[derive(Debug)]
struct Tracked {
    block: Option<Block>,
    manager: Option<MemoryManager>,
}

impl Tracked {
    fn as_slice(&self) -> &[u8] {
        self.block.as_ref().map_or(&[], Block::as_slice)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            super::release(self.manager.as_ref(), block);
        }
    }
}

/// Non-owning handle to a tracked buffer.
///
/// Copies of a `BufferRef` alias the same buffer. Once the owning tracker
/// releases it, every read returns `None`.
#[derive(Debug, Clone)]
pub struct BufferRef(Weak<Tracked>);

impl BufferRef {
    /// Handle that never resolves (a released or never-allocated buffer).
    pub fn dangling() -> Self {
        Self(Weak::new())
    }

    /// True while the owning tracker still holds the buffer.
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn len(&self) -> Option<usize> {
        self.with(<[u8]>::len)
    }

    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|l| l == 0)
    }

    /// Run `f` over the buffer contents.
    pub fn with<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let tracked = self.0.upgrade()?;
        Some(f(tracked.as_slice()))
    }

    pub fn to_vec(&self) -> Option<Vec<u8>> {
        self.with(<[u8]>::to_vec)
    }

    /// Address of the buffer, if still live.
    pub fn addr(&self) -> Option<usize> {
        self.with(|bytes| bytes.as_ptr() as usize)
    }

    /// True if both handles designate the same buffer.
    pub fn same_buffer(&self, other: &BufferRef) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

/// Per-value record of allocator and allocated sub-buffers.
///
/// `Default` yields the all-zero tracker: no manager bound (system
/// allocator), nothing tracked, not heap-allocated.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    manager: Option<MemoryManager>,
    heap_allocated: bool,
    buffers: Vec<Arc<Tracked>>,
    needs_init: Option<fn(&mut MemoryTracker)>,
}

impl MemoryTracker {
    /// Create an empty tracker bound to `manager` (`None` = system allocator).
    pub fn new(manager: Option<MemoryManager>) -> Self {
        Self {
            manager,
            heap_allocated: false,
            buffers: Vec::new(),
            needs_init: None,
        }
    }

    /// Create a tracker whose setup is deferred until first use.
    ///
    /// `init` runs once, right before the first buffer is tracked.
    pub const fn lazy(init: fn(&mut MemoryTracker)) -> Self {
        Self {
            manager: None,
            heap_allocated: false,
            buffers: Vec::new(),
            needs_init: Some(init),
        }
    }

    /// Run the deferred setup, if still pending.
    pub fn ensure_init(&mut self) {
        if let Some(init) = self.needs_init.take() {
            init(self);
        }
    }

    pub fn needs_init(&self) -> bool {
        self.needs_init.is_some()
    }

    pub fn manager(&self) -> Option<&MemoryManager> {
        self.manager.as_ref()
    }

    pub fn bind(&mut self, manager: Option<MemoryManager>) {
        self.manager = manager;
    }

    pub fn is_heap_allocated(&self) -> bool {
        self.heap_allocated
    }

    pub fn set_heap_allocated(&mut self, heap_allocated: bool) {
        self.heap_allocated = heap_allocated;
    }

    /// Number of tracked buffers.
    pub fn count(&self) -> usize {
        self.buffers.len()
    }

    /// Capacity of the buffer list.
    pub fn capacity(&self) -> usize {
        self.buffers.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Take ownership of `block`, returning a handle to it.
    pub fn track(&mut self, block: Block) -> BufferRef {
        self.ensure_init();
        if self.buffers.len() == self.buffers.capacity() {
            let grow = (self.buffers.capacity() * (TRACKER_GROWTH_FACTOR - 1))
                .max(TRACKER_INITIAL_CAPACITY);
            self.buffers.reserve_exact(grow);
        }

        let tracked = Arc::new(Tracked {
            block: Some(block),
            manager: self.manager.clone(),
        });
        let handle = BufferRef(Arc::downgrade(&tracked));
        self.buffers.push(tracked);
        handle
    }

    /// Allocate `size` zeroed bytes through the bound manager and track them.
    pub fn allocate(&mut self, size: usize) -> Option<BufferRef> {
        self.allocate_with(size, |_| {})
    }

    /// Allocate a tracked copy of `bytes`.
    pub fn allocate_copy(&mut self, bytes: &[u8]) -> Option<BufferRef> {
        self.allocate_with(bytes.len(), |dst| dst.copy_from_slice(bytes))
    }

    /// Allocate `size` bytes, let `fill` write them, then track the block.
    pub fn allocate_with(
        &mut self,
        size: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Option<BufferRef> {
        self.ensure_init();
        let mut block = super::allocate_zeroed(self.manager.as_ref(), size, 1)?;
        if block.len() != size {
            log::warn!(
                "[tracker] manager returned {} bytes for a {} byte request",
                block.len(),
                size
            );
            super::release(self.manager.as_ref(), block);
            return None;
        }
        fill(block.as_mut_slice());
        Some(self.track(block))
    }

    /// Release every tracked buffer through the bound manager.
    ///
    /// Also frees the list storage and clears the heap flag, so a second
    /// call is a no-op. Returns whether the tracked value itself was
    /// heap-allocated (the caller must then discard the value).
    pub fn release_all(&mut self) -> bool {
        let heap_allocated = std::mem::take(&mut self.heap_allocated);
        if self.buffers.is_empty() && self.buffers.capacity() == 0 {
            return heap_allocated;
        }

        let released = self.buffers.len();
        for shared in std::mem::take(&mut self.buffers) {
            if Arc::strong_count(&shared) > 1 {
                log::warn!("[tracker] buffer still borrowed at release, deferring to borrower");
            }
            // The last strong reference hands the block to its manager
            drop(shared);
        }
        log::trace!("[tracker] released {} buffer(s)", released);
        heap_allocated
    }
}

impl Drop for MemoryTracker {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            log::debug!(
                "[tracker] dropped with {} live buffer(s), releasing",
                self.buffers.len()
            );
            self.release_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_tracker_release_is_noop() {
        let mut tracker = MemoryTracker::default();
        assert!(!tracker.release_all());
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.capacity(), 0);
    }

    #[test]
    fn test_growth_doubles() {
        let mut tracker = MemoryTracker::new(None);
        tracker.track(Block::zeroed(1));
        assert!(tracker.capacity() >= TRACKER_INITIAL_CAPACITY);

        for _ in 0..TRACKER_INITIAL_CAPACITY {
            tracker.track(Block::zeroed(1));
        }
        assert!(tracker.capacity() >= TRACKER_INITIAL_CAPACITY * TRACKER_GROWTH_FACTOR);
        assert_eq!(tracker.count(), TRACKER_INITIAL_CAPACITY + 1);
    }

    #[test]
    fn test_release_invalidates_handles() {
        let mut tracker = MemoryTracker::new(None);
        let buf = tracker.allocate_copy(b"abc").expect("alloc");
        let alias = buf.clone();
        assert!(buf.same_buffer(&alias));
        assert_eq!(buf.len(), Some(3));

        tracker.release_all();
        assert!(!buf.is_live());
        assert_eq!(alias.to_vec(), None);
    }

    #[test]
    fn test_heap_flag_reported_once() {
        let mut tracker = MemoryTracker::new(None);
        tracker.set_heap_allocated(true);
        assert!(tracker.release_all());
        assert!(!tracker.release_all());
    }

    static LAZY_RUNS: AtomicUsize = AtomicUsize::new(0);

    fn lazy_setup(tracker: &mut MemoryTracker) {
        LAZY_RUNS.fetch_add(1, Ordering::SeqCst);
        tracker.bind(Some(MemoryManager::system().clone()));
    }

    #[test]
    fn test_lazy_init_runs_once() {
        let mut tracker = MemoryTracker::lazy(lazy_setup);
        assert!(tracker.needs_init());
        assert!(tracker.manager().is_none());

        tracker.allocate(4).expect("alloc");
        tracker.allocate(4).expect("alloc");
        assert!(!tracker.needs_init());
        assert!(tracker.manager().is_some());
        assert_eq!(LAZY_RUNS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_through_manager() {
        let frees = Arc::new(AtomicUsize::new(0));
        let frees_in = frees.clone();
        let manager = MemoryManager::new()
            .with_malloc(|size| Some(Block::zeroed(size)))
            .with_free(move |_| {
                frees_in.fetch_add(1, Ordering::SeqCst);
            });

        {
            let mut tracker = MemoryTracker::new(Some(manager));
            tracker.allocate(8).expect("alloc");
            tracker.allocate(8).expect("alloc");
        }
        assert_eq!(frees.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_during_borrow_reaches_manager() {
        let frees = Arc::new(AtomicUsize::new(0));
        let frees_in = frees.clone();
        let manager = MemoryManager::new()
            .with_malloc(|size| Some(Block::zeroed(size)))
            .with_free(move |_| {
                frees_in.fetch_add(1, Ordering::SeqCst);
            });

        let mut tracker = MemoryTracker::new(Some(manager));
        let buf = tracker.allocate_copy(b"held").expect("alloc");
        let seen = buf.with(|bytes| {
            tracker.release_all();
            // Still readable until this borrow ends
            bytes.to_vec()
        });
        assert_eq!(seen.as_deref(), Some(&b"held"[..]));
        assert_eq!(frees.load(Ordering::SeqCst), 1);
        assert!(!buf.is_live());
        assert_eq!(tracker.count(), 0);
    }
}
