// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable allocator capability sets.
//!
//! A [`MemoryManager`] carries up to four operations. Any of them may be
//! absent; the free functions in this module apply the fallback table:
//!
//! | requested op | manager lacks it | fallback |
//! |--------------|------------------|----------|
//! | allocate / release | either of malloc/free | system allocator for **all four** ops |
//! | allocate_zeroed | calloc | allocate(count * size) + zero fill, same manager |
//! | reallocate | realloc | release(old) then allocate(new), same manager |
//!
//! Missing malloc or free switches every operation to the system allocator
//! so blocks never travel between two allocator implementations.

use super::Block;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// `malloc(size)`; `None` signals allocation failure.
pub type MallocFn = Arc<dyn Fn(usize) -> Option<Block> + Send + Sync>;
/// `free(block)`.
pub type FreeFn = Arc<dyn Fn(Block) + Send + Sync>;
/// `calloc(count, size)`; the returned block must be zero-filled.
pub type CallocFn = Arc<dyn Fn(usize, usize) -> Option<Block> + Send + Sync>;
/// `realloc(block, size)`; the old block is consumed even on failure.
pub type ReallocFn = Arc<dyn Fn(Block, usize) -> Option<Block> + Send + Sync>;

static SYSTEM: OnceLock<MemoryManager> = OnceLock::new();

/// Allocator capability set.
///
/// Two managers are equal when they share the same operation closures
/// (pointer identity), not when they behave alike.
#[derive(Clone, Default)]
pub struct MemoryManager {
    malloc: Option<MallocFn>,
    free: Option<FreeFn>,
    calloc: Option<CallocFn>,
    realloc: Option<ReallocFn>,
    state: Option<Arc<dyn Any + Send + Sync>>,
}

impl MemoryManager {
    /// Create a manager with no operations (defers to the system allocator).
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide system allocator manager (all four operations set).
    pub fn system() -> &'static MemoryManager {
        SYSTEM.get_or_init(|| {
            Self::new()
                .with_malloc(|size| Some(Block::zeroed(size)))
                .with_free(|_block: Block| {})
                .with_calloc(|count, size| count.checked_mul(size).map(Block::zeroed))
                .with_realloc(|block, size| Some(block.resized(size)))
        })
    }

    pub fn with_malloc<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> Option<Block> + Send + Sync + 'static,
    {
        self.malloc = Some(Arc::new(f));
        self
    }

    pub fn with_free<F>(mut self, f: F) -> Self
    where
        F: Fn(Block) + Send + Sync + 'static,
    {
        self.free = Some(Arc::new(f));
        self
    }

    pub fn with_calloc<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) -> Option<Block> + Send + Sync + 'static,
    {
        self.calloc = Some(Arc::new(f));
        self
    }

    pub fn with_realloc<F>(mut self, f: F) -> Self
    where
        F: Fn(Block, usize) -> Option<Block> + Send + Sync + 'static,
    {
        self.realloc = Some(Arc::new(f));
        self
    }

    /// Attach opaque allocator state (arena handle, counters, ...).
    pub fn with_state<T: Any + Send + Sync>(mut self, state: T) -> Self {
        self.state = Some(Arc::new(state));
        self
    }

    /// Typed access to the attached state.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_deref()?.downcast_ref::<T>()
    }

    /// Size in bytes of the attached state (0 when none).
    pub fn state_size(&self) -> usize {
        self.state.as_deref().map_or(0, |s| std::mem::size_of_val(s))
    }

    pub fn has_malloc(&self) -> bool {
        self.malloc.is_some()
    }

    pub fn has_free(&self) -> bool {
        self.free.is_some()
    }

    pub fn has_calloc(&self) -> bool {
        self.calloc.is_some()
    }

    pub fn has_realloc(&self) -> bool {
        self.realloc.is_some()
    }

    /// True when every operation is absent.
    pub fn is_null(&self) -> bool {
        !(self.has_malloc() || self.has_free() || self.has_calloc() || self.has_realloc())
    }

    pub fn allocate(&self, size: usize) -> Option<Block> {
        allocate(Some(self), size)
    }

    pub fn release(&self, block: Block) {
        release(Some(self), block);
    }

    pub fn allocate_zeroed(&self, count: usize, size: usize) -> Option<Block> {
        allocate_zeroed(Some(self), count, size)
    }

    pub fn reallocate(&self, block: Block, size: usize) -> Option<Block> {
        reallocate(Some(self), block, size)
    }
}

impl PartialEq for MemoryManager {
    fn eq(&self, other: &Self) -> bool {
        same_op(&self.malloc, &other.malloc)
            && same_op(&self.free, &other.free)
            && same_op(&self.calloc, &other.calloc)
            && same_op(&self.realloc, &other.realloc)
    }
}

impl fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryManager")
            .field("malloc", &self.has_malloc())
            .field("free", &self.has_free())
            .field("calloc", &self.has_calloc())
            .field("realloc", &self.has_realloc())
            .field("state_size", &self.state_size())
            .finish()
    }
}

fn same_op<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Pick the manager that actually serves a request.
fn resolve(manager: Option<&MemoryManager>) -> &MemoryManager {
    match manager {
        Some(m) if m.has_malloc() && m.has_free() => m,
        Some(_) => {
            log::trace!("[memory] manager lacks malloc/free, using system allocator");
            MemoryManager::system()
        }
        None => MemoryManager::system(),
    }
}

/// Allocate `size` bytes. `None` manager means the system allocator.
pub fn allocate(manager: Option<&MemoryManager>, size: usize) -> Option<Block> {
    match &resolve(manager).malloc {
        Some(malloc) => malloc(size),
        None => Some(Block::zeroed(size)),
    }
}

/// Release a block through the manager that allocated it.
pub fn release(manager: Option<&MemoryManager>, block: Block) {
    match &resolve(manager).free {
        Some(free) => free(block),
        None => drop(block),
    }
}

/// Allocate `count * size` zero-filled bytes.
///
/// Returns `None` on allocation failure or when `count * size` overflows.
pub fn allocate_zeroed(
    manager: Option<&MemoryManager>,
    count: usize,
    size: usize,
) -> Option<Block> {
    let m = resolve(manager);
    if let Some(calloc) = &m.calloc {
        return calloc(count, size);
    }

    let total = count.checked_mul(size)?;
    let mut block = allocate(Some(m), total)?;
    block.as_mut_slice().fill(0);
    Some(block)
}

/// Resize a block.
///
/// Without a native `realloc` the old block is released first and a new
/// one allocated; the common prefix is carried across. On failure the old
/// block is gone and `None` is returned.
pub fn reallocate(manager: Option<&MemoryManager>, block: Block, size: usize) -> Option<Block> {
    let m = resolve(manager);
    if let Some(realloc) = &m.realloc {
        return realloc(block, size);
    }

    let keep = block.len().min(size);
    let prefix = block.as_slice()[..keep].to_vec();
    release(Some(m), block);

    let mut fresh = allocate(Some(m), size)?;
    let keep = keep.min(fresh.len());
    fresh.as_mut_slice()[..keep].copy_from_slice(&prefix[..keep]);
    Some(fresh)
}
