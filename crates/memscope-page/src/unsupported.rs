// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Fallback for targets without mmap/mlock. Every lock attempt fails, which
//! makes secure allocations fail closed.

use crate::error::PageError;

/// Returns a nominal page size.
pub fn page_size() -> usize {
    4096
}

/// Never constructible on this target.
#[derive(Debug)]
pub struct LockedPages {
    _private: (),
}

impl LockedPages {
    /// Always fails with [`PageError::Unsupported`].
    pub fn new(_len: usize) -> Result<Self, PageError> {
        Err(PageError::Unsupported)
    }

    /// Always fails with [`PageError::Unsupported`].
    pub fn lock(&mut self) -> Result<(), PageError> {
        Err(PageError::Unsupported)
    }

    /// No-op.
    pub fn munlock(&mut self) {}

    /// Always false.
    pub fn is_locked(&self) -> bool {
        false
    }

    /// Always zero.
    pub fn len(&self) -> usize {
        0
    }

    /// Always true.
    pub fn is_empty(&self) -> bool {
        true
    }

    /// Always zero.
    pub fn capacity(&self) -> usize {
        0
    }

    /// Always empty.
    pub fn as_slice(&self) -> &[u8] {
        &[]
    }

    /// Always empty.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut []
    }

    /// No-op.
    pub fn wipe(&mut self) {}

    /// No-op.
    pub fn dispose(&mut self) {}
}
