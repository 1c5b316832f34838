// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Per-allocation bookkeeping: size, flags, destructor, sibling links, body.

use alloc::vec::Vec;

use memscope_page::{LockedPages, wipe, zeroed_vec};

use crate::destructor::Destructor;
use crate::error::MemError;
use crate::handle::Handle;
use crate::scope::ScopeId;

/// Who owns an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Directly owned by an open scope.
    Scope(ScopeId),
    /// Owned by another allocation (after a reparent).
    Allocation(Handle),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub(crate) secure: bool,
}

/// Backing bytes of an allocation.
pub(crate) enum Body {
    Heap(Vec<u8>),
    Locked(LockedPages),
}

impl Body {
    /// Zero-filled heap body of exactly `len` bytes.
    pub(crate) fn zeroed(len: usize) -> Result<Self, MemError> {
        zeroed_vec(len)
            .map(Self::Heap)
            .ok_or(MemError::OutOfMemory { requested: len })
    }

    pub(crate) fn empty() -> Self {
        Self::Heap(Vec::new())
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::Heap(bytes) => bytes,
            Self::Locked(pages) => pages.as_slice(),
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Heap(bytes) => bytes,
            Self::Locked(pages) => pages.as_mut_slice(),
        }
    }

    /// Wipes (if locked) and returns the storage.
    pub(crate) fn release(self) {
        match self {
            Self::Heap(bytes) => drop(bytes),
            Self::Locked(mut pages) => {
                #[cfg(test)]
                {
                    pages.wipe();
                    crate::tests::support::record_wipe(pages.as_slice());
                }

                pages.dispose();
            }
        }
    }

    /// Wipes the storage whatever its kind, then returns it.
    pub(crate) fn wipe_and_release(mut self) {
        if let Self::Heap(bytes) = &mut self {
            wipe(bytes);

            #[cfg(test)]
            crate::tests::support::record_wipe(bytes);
        }

        self.release();
    }
}

pub(crate) struct Record {
    /// Caller-requested size.
    pub(crate) size: usize,
    pub(crate) flags: Flags,
    pub(crate) body: Body,
    pub(crate) destructor: Option<Destructor>,
    /// `None` only while detached (mid-teardown or mid-reparent).
    pub(crate) owner: Option<Owner>,
    pub(crate) prev: Option<Handle>,
    pub(crate) next: Option<Handle>,
    pub(crate) first_child: Option<Handle>,
}

impl Record {
    pub(crate) fn new(size: usize, body: Body) -> Self {
        Self {
            size,
            flags: Flags::default(),
            body,
            destructor: None,
            owner: None,
            prev: None,
            next: None,
            first_child: None,
        }
    }
}
