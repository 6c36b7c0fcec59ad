// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use typedesc::memory::{Block, MemoryManager};

/// One call observed by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Malloc(usize),
    Free { addr: usize, len: usize },
}

/// Memory manager wrapper that logs every malloc/free it serves.
///
/// Only malloc and free are provided, so calloc and realloc go through
/// the derived fallbacks.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manager(&self) -> MemoryManager {
        let on_malloc = self.events.clone();
        let on_free = self.events.clone();
        MemoryManager::new()
            .with_malloc(move |size| {
                on_malloc.lock().expect("events").push(Event::Malloc(size));
                // Poison the contents so missing zero fills are visible
                Some(Block::from_vec(vec![0xAA; size]))
            })
            .with_free(move |block: Block| {
                on_free.lock().expect("events").push(Event::Free {
                    addr: block.addr(),
                    len: block.len(),
                });
            })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("events").clone()
    }

    pub fn mallocs(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Malloc(_)))
            .count()
    }

    pub fn frees(&self) -> Vec<usize> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                Event::Free { addr, .. } => Some(*addr),
                Event::Malloc(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().expect("events").clear();
    }
}
