// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Destructor callbacks and the view they receive at teardown.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::allocator::Allocator;
use crate::handle::Handle;
use crate::record::Owner;

pub(crate) type Destructor = Box<dyn FnOnce(&mut Destructing<'_>)>;

/// What a destructor sees while its allocation is being torn down.
///
/// The allocation is already detached from its owner, its children are
/// still intact, and its body is still valid. The view is read-only with
/// respect to the ownership graph (a destructor cannot free, reparent or
/// allocate) and reaches no further than the detached subtree.
pub struct Destructing<'a> {
    pub(crate) handle: Handle,
    pub(crate) body: &'a mut [u8],
    pub(crate) allocator: &'a Allocator,
}

impl Destructing<'_> {
    /// Handle of the allocation being torn down. Stale once the destructor
    /// returns.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The allocation's body.
    pub fn body(&self) -> &[u8] {
        self.body
    }

    /// The allocation's body, mutably.
    pub fn body_mut(&mut self) -> &mut [u8] {
        self.body
    }

    /// Direct children, newest first. All are still live.
    pub fn children(&self) -> Vec<Handle> {
        self.allocator.children(self.handle)
    }

    /// Body of a live descendant of the allocation being torn down.
    ///
    /// `None` for the allocation itself and for anything outside its
    /// subtree.
    pub fn bytes_of(&self, handle: Handle) -> Option<&[u8]> {
        if !self.is_descendant(handle) {
            return None;
        }

        self.allocator.bytes(handle).ok()
    }

    /// Walks owner links up from `handle` looking for `self.handle`.
    ///
    /// Bounded by the number of live allocations, so an unrelated ownership
    /// cycle cannot trap the walk.
    fn is_descendant(&self, handle: Handle) -> bool {
        let mut cursor = handle;

        for _ in 0..self.allocator.live_allocations() {
            match self.allocator.owner_of(cursor) {
                Some(Owner::Allocation(parent)) if parent == self.handle => return true,
                Some(Owner::Allocation(parent)) => cursor = parent,
                Some(Owner::Scope(_)) | None => return false,
            }
        }

        false
    }
}

impl core::fmt::Debug for Destructing<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Destructing")
            .field("handle", &self.handle)
            .field("len", &self.body.len())
            .finish_non_exhaustive()
    }
}
