// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Lexical scopes: an explicit per-allocator stack plus an RAII guard.
//!
//! The stack is plain data pushed and popped by `open_scope`/`close_scope`.
//! [`ScopeGuard`] pairs the two so the close runs on every exit path,
//! including `?` and unwinding.

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::allocator::Allocator;
use crate::handle::Handle;

/// Identifies one open scope.
///
/// The serial is unique per allocator, so the id of a closed scope never
/// matches a later scope opened at the same depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId {
    depth: usize,
    serial: u64,
}

impl ScopeId {
    /// Position on the stack (0 is the outermost scope).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Per-allocator unique serial number.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

struct Frame {
    id: ScopeId,
    first_child: Option<Handle>,
}

pub(crate) struct ScopeStack {
    frames: Vec<Frame>,
    next_serial: u64,
}

impl ScopeStack {
    pub(crate) const fn new() -> Self {
        Self {
            frames: Vec::new(),
            next_serial: 0,
        }
    }

    pub(crate) fn push(&mut self) -> ScopeId {
        let id = ScopeId {
            depth: self.frames.len(),
            serial: self.next_serial,
        };
        self.next_serial += 1;

        self.frames.push(Frame {
            id,
            first_child: None,
        });

        id
    }

    pub(crate) fn pop(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(frame.is_some_and(|frame| frame.first_child.is_none()));
    }

    pub(crate) fn top(&self) -> Option<ScopeId> {
        self.frames.last().map(|frame| frame.id)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, id: ScopeId) -> Option<&Frame> {
        self.frames.get(id.depth).filter(|frame| frame.id == id)
    }

    pub(crate) fn is_open(&self, id: ScopeId) -> bool {
        self.frame(id).is_some()
    }

    pub(crate) fn first_child(&self, id: ScopeId) -> Option<Handle> {
        self.frame(id).and_then(|frame| frame.first_child)
    }

    pub(crate) fn set_first_child(&mut self, id: ScopeId, head: Option<Handle>) {
        if let Some(frame) = self.frames.get_mut(id.depth).filter(|frame| frame.id == id) {
            frame.first_child = head;
        }
    }
}

/// An open scope that closes itself when dropped.
///
/// Dereferences to the [`Allocator`], so allocations made through the guard
/// land in its scope. Open a nested scope from the guard itself; the borrow
/// checker then enforces strict nesting.
///
/// ```rust
/// use memscope::Allocator;
///
/// let mut allocator = Allocator::new();
/// {
///     let mut outer = allocator.scope();
///     let a = outer.allocate(8).unwrap();
///     {
///         let mut inner = outer.scope();
///         let _b = inner.allocate(16).unwrap();
///     } // inner allocations are gone
///     assert!(outer.is_live(a));
/// } // so is `a`
/// assert_eq!(allocator.live_allocations(), 0);
/// ```
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    allocator: &'a mut Allocator,
    id: ScopeId,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn new(allocator: &'a mut Allocator) -> Self {
        let id = allocator.open_scope();
        Self { allocator, id }
    }

    /// The id of the guarded scope.
    pub fn id(&self) -> ScopeId {
        self.id
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Allocator;

    fn deref(&self) -> &Allocator {
        self.allocator
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Allocator {
        self.allocator
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.allocator.close_scope(self.id);
    }
}
