// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable memory managers and per-value allocation tracking.
//!
//! # Features
//!
//! - **MemoryManager**: capability set of four optional allocator operations
//!   with a documented fallback to the system allocator
//! - **MemoryTracker**: per-value record of the manager in effect and every
//!   auxiliary buffer allocated on the value's behalf
//! - **BufferRef**: non-owning handle to a tracked buffer; reads after the
//!   owner released it yield `None`
//!
//! # Example
//!
//! ```rust
//! use typedesc::memory::{MemoryManager, MemoryTracker};
//!
//! let mut tracker = MemoryTracker::new(Some(MemoryManager::system().clone()));
//! let buf = tracker.allocate_copy(b"hello").expect("alloc");
//! assert_eq!(buf.to_vec().as_deref(), Some(&b"hello"[..]));
//!
//! tracker.release_all();
//! assert!(!buf.is_live());
//! ```

mod block;
mod manager;
mod tracker;

pub use block::Block;
pub use manager::{
    allocate, allocate_zeroed, reallocate, release, CallocFn, FreeFn, MallocFn, MemoryManager,
    ReallocFn,
};
pub use tracker::{BufferRef, MemoryTracker};
