// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Owned byte regions handed out by memory managers.

/// A byte region allocated through a [`MemoryManager`](super::MemoryManager).
///
/// Not `Clone`: a block has exactly one owner, so it can be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    data: Box<[u8]>,
}

impl Block {
    /// Create a zero-filled block of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Wrap existing bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Address of the first byte, usable as an identity token.
    pub fn addr(&self) -> usize {
        self.data.as_ptr() as usize
    }

    /// Resize in place, preserving the common prefix and zero-filling growth.
    pub fn resized(self, len: usize) -> Self {
        let mut bytes = self.data.into_vec();
        bytes.resize(len, 0);
        Self::from_vec(bytes)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }
}
