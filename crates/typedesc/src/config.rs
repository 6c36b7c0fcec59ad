// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global configuration - single source of truth.
//!
//! Centralizes the tuning constants used by trackers and constructors, plus
//! the process-wide default [`MemoryManager`].
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (tracker growth, message capacity)
//! - **Level 2 (Process)**: the default memory manager, installed once before
//!   first use or lazily defaulting to the system allocator
//!
//! # Example
//!
//! ```ignore
//! use typedesc::config;
//! use typedesc::memory::MemoryManager;
//!
//! // Early in main(), before any type is initialised
//! config::init_default_manager(MemoryManager::system().clone());
//!
//! let manager = config::default_manager();
//! ```

use crate::memory::MemoryManager;
use std::sync::OnceLock;

/// Initial capacity of a tracker's buffer list on first `track`.
pub const TRACKER_INITIAL_CAPACITY: usize = 4;

/// Multiplier applied to a full tracker buffer list.
///
/// Amortized doubling: 4 -> 8 -> 16 -> ...
pub const TRACKER_GROWTH_FACTOR: usize = 2;

/// Default capacity (bytes) of a construction failure message buffer.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 256;

/// Width of identity references and type references, in bytes.
pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

static DEFAULT_MANAGER: OnceLock<MemoryManager> = OnceLock::new();

/// Install the process-wide default memory manager.
///
/// Only the first call has effect. Returns `false` when a default was
/// already installed (or already resolved lazily by a previous lookup).
pub fn init_default_manager(manager: MemoryManager) -> bool {
    let installed = DEFAULT_MANAGER.set(manager).is_ok();
    if !installed {
        log::debug!("[config] default memory manager already set, ignoring");
    }
    installed
}

/// Get the process-wide default memory manager.
///
/// Falls back to the system allocator when nothing was installed.
pub fn default_manager() -> &'static MemoryManager {
    DEFAULT_MANAGER.get_or_init(|| MemoryManager::system().clone())
}
