// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The allocator: arena + scope stack + the allocation API.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ffi::CStr;

use log::{debug, trace};

use crate::destructor::Destructing;
use crate::error::MemError;
use crate::handle::{Arena, Handle};
use crate::record::{Body, Owner, Record};
use crate::scope::{ScopeGuard, ScopeId, ScopeStack};

#[cfg(any(test, feature = "test-utils"))]
use crate::behaviour::AllocatorBehaviour;

/// A hierarchical, scope-bound allocator.
///
/// Every allocation is owned either by the innermost open scope at the time
/// it was made, or by another allocation it was reparented under. Closing a
/// scope, or freeing an allocation, tears down everything it owns.
///
/// One allocator serves one thread: it is neither `Send` nor `Sync`, and
/// its scope stack is never visible elsewhere.
///
/// # Example
///
/// ```rust
/// use memscope::{Allocator, MemError};
///
/// fn example() -> Result<(), MemError> {
///     let mut allocator = Allocator::new();
///     let mut scope = allocator.scope();
///
///     let parent = scope.duplicate_string(b"parent")?;
///     let child = scope.allocate(64)?;
///     scope.reparent(child, parent)?;
///
///     scope.free(parent)?;
///     assert!(!scope.is_live(child));
///     Ok(())
/// }
/// # example().unwrap();
/// ```
pub struct Allocator {
    pub(crate) arena: Arena<Record>,
    pub(crate) scopes: ScopeStack,
    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) behaviour: AllocatorBehaviour,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Allocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Allocator")
            .field("live_allocations", &self.arena.len())
            .field("depth", &self.scopes.len())
            .finish_non_exhaustive()
    }
}

impl Allocator {
    /// Creates an allocator with no open scope.
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            scopes: ScopeStack::new(),
            #[cfg(any(test, feature = "test-utils"))]
            behaviour: AllocatorBehaviour::None,
        }
    }

    /// Creates an allocator with room for `slots` allocations before the
    /// arena has to grow.
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            arena: Arena::with_capacity(slots),
            scopes: ScopeStack::new(),
            #[cfg(any(test, feature = "test-utils"))]
            behaviour: AllocatorBehaviour::None,
        }
    }

    // -------------------------------------------------------------------------
    // Scopes
    // -------------------------------------------------------------------------

    /// Pushes a new, empty scope and makes it the default owner.
    pub fn open_scope(&mut self) -> ScopeId {
        let id = self.scopes.push();
        trace!("open scope {id:?}");
        id
    }

    /// Tears down everything `id` still owns and pops it.
    ///
    /// Silently ignored unless `id` is the innermost open scope.
    pub fn close_scope(&mut self, id: ScopeId) {
        if self.scopes.top() != Some(id) {
            debug!("ignoring close of {id:?}: not the innermost scope");
            return;
        }

        let mut released = 0;

        while let Some(child) = self.scopes.first_child(id) {
            released += self.teardown(child);
        }

        self.scopes.pop();
        trace!("close scope {id:?}: released {released} allocations");
    }

    /// Opens a scope that closes when the returned guard is dropped.
    pub fn scope(&mut self) -> ScopeGuard<'_> {
        ScopeGuard::new(self)
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether `id` names a scope that is still open.
    pub fn is_scope_open(&self, id: ScopeId) -> bool {
        self.scopes.is_open(id)
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    fn insert(&mut self, size: usize, body: Body, scope: ScopeId) -> Result<Handle, MemError> {
        let handle = self.arena.insert(Record::new(size, body))?;
        self.attach(handle, Owner::Scope(scope));
        Ok(handle)
    }

    fn current_scope(&self) -> Result<ScopeId, MemError> {
        self.scopes.top().ok_or(MemError::NoActiveScope)
    }

    fn zeroed_body(&self, size: usize) -> Result<Body, MemError> {
        #[cfg(any(test, feature = "test-utils"))]
        if self.behaviour == AllocatorBehaviour::FailAtAllocate {
            return Err(MemError::OutOfMemory { requested: size });
        }

        Body::zeroed(size)
    }

    /// Allocates `size` bytes owned by the innermost scope.
    ///
    /// The body is zero-filled.
    pub fn allocate(&mut self, size: usize) -> Result<Handle, MemError> {
        let scope = self.current_scope()?;
        let body = self.zeroed_body(size)?;

        self.insert(size, body, scope)
    }

    /// Allocates `count * size` zeroed bytes owned by the innermost scope.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Result<Handle, MemError> {
        let total = count.checked_mul(size).ok_or(MemError::SizeOverflow)?;

        self.allocate(total)
    }

    /// Allocates `size_of::<T>()` zeroed bytes.
    pub fn allocate_value<T>(&mut self) -> Result<Handle, MemError> {
        self.allocate_zeroed(1, core::mem::size_of::<T>())
    }

    /// Resizes an allocation, keeping its handle, owner, children, flags and
    /// destructor. With `None`, behaves as [`allocate`](Self::allocate).
    ///
    /// Grown bytes are zero. On failure the allocation is left untouched.
    pub fn reallocate(
        &mut self,
        handle: Option<Handle>,
        new_size: usize,
    ) -> Result<Handle, MemError> {
        let Some(handle) = handle else {
            return self.allocate(new_size);
        };

        let record = self.arena.get(handle).ok_or(MemError::InvalidHandle)?;

        if record.flags.secure {
            return self.reallocate_secure(handle, new_size);
        }

        #[cfg(any(test, feature = "test-utils"))]
        if self.behaviour == AllocatorBehaviour::FailAtAllocate {
            return Err(MemError::OutOfMemory {
                requested: new_size,
            });
        }

        let record = self.arena.get_mut(handle).ok_or(MemError::InvalidHandle)?;

        if let Body::Heap(bytes) = &mut record.body {
            let additional = new_size.saturating_sub(bytes.len());
            bytes
                .try_reserve_exact(additional)
                .map_err(|_| MemError::OutOfMemory {
                    requested: new_size,
                })?;
            bytes.resize(new_size, 0);
        }

        record.size = new_size;

        Ok(handle)
    }

    /// Copies `bytes` into a new allocation of exactly `bytes.len()`.
    pub fn duplicate(&mut self, bytes: &[u8]) -> Result<Handle, MemError> {
        let handle = self.allocate(bytes.len())?;
        self.bytes_mut(handle)?.copy_from_slice(bytes);

        Ok(handle)
    }

    /// Copies a C string into a new NUL-terminated allocation.
    ///
    /// The source ends at its first NUL byte or at the end of the slice.
    pub fn duplicate_string(&mut self, string: &[u8]) -> Result<Handle, MemError> {
        let len = c_strlen(string, string.len());

        self.copy_c_string(&string[..len], len)
    }

    /// Copies at most `n` bytes of a C string into a new allocation of
    /// exactly `n + 1` bytes, zero-padded and NUL-terminated at `n`.
    ///
    /// Never reads past the `n`th source byte, nor past the source's own
    /// terminator.
    pub fn duplicate_string_n(&mut self, string: &[u8], n: usize) -> Result<Handle, MemError> {
        let len = c_strlen(string, n);

        self.copy_c_string(&string[..len], n)
    }

    fn copy_c_string(&mut self, source: &[u8], len: usize) -> Result<Handle, MemError> {
        let size = len.checked_add(1).ok_or(MemError::SizeOverflow)?;
        let handle = self.allocate(size)?;

        // The body is zeroed: padding and terminator are already in place.
        self.bytes_mut(handle)?[..source.len()].copy_from_slice(source);

        Ok(handle)
    }

    // -------------------------------------------------------------------------
    // Graph operations
    // -------------------------------------------------------------------------

    /// Tears down `handle` and everything it owns.
    pub fn free(&mut self, handle: Handle) -> Result<(), MemError> {
        if !self.arena.contains(handle) {
            return Err(MemError::InvalidHandle);
        }

        let released = self.teardown(handle);
        debug!("free {handle}: released {released} allocations");

        Ok(())
    }

    /// Moves `handle` under `parent` ("steal"), without copying.
    ///
    /// There is no cycle check: reparenting a node into its own subtree
    /// detaches that subtree from every scope.
    pub fn reparent(&mut self, handle: Handle, parent: Handle) -> Result<Handle, MemError> {
        if !self.arena.contains(handle) || !self.arena.contains(parent) {
            return Err(MemError::InvalidHandle);
        }

        self.detach(handle);
        self.attach(handle, Owner::Allocation(parent));

        Ok(handle)
    }

    /// Sets the callback run when `handle` is torn down, replacing any
    /// earlier one.
    pub fn set_destructor<F>(&mut self, handle: Handle, destructor: F) -> Result<Handle, MemError>
    where
        F: FnOnce(&mut Destructing<'_>) + 'static,
    {
        let record = self.arena.get_mut(handle).ok_or(MemError::InvalidHandle)?;
        record.destructor = Some(Box::new(destructor));

        Ok(handle)
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Caller-requested size, or 0 for a stale handle.
    pub fn size_of(&self, handle: Handle) -> usize {
        self.arena.get(handle).map_or(0, |record| record.size)
    }

    /// Whether `handle` names a live allocation.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.arena.contains(handle)
    }

    /// Whether `handle` is live and marked secure.
    pub fn is_secure(&self, handle: Handle) -> bool {
        self.arena
            .get(handle)
            .is_some_and(|record| record.flags.secure)
    }

    /// Current owner of `handle`.
    pub fn owner_of(&self, handle: Handle) -> Option<Owner> {
        self.arena.get(handle)?.owner
    }

    /// Direct children of `handle`, newest first.
    pub fn children(&self, handle: Handle) -> Vec<Handle> {
        if !self.arena.contains(handle) {
            return Vec::new();
        }

        self.children_of(Owner::Allocation(handle))
    }

    /// Allocations owned directly by scope `id`, newest first.
    pub fn scope_children(&self, id: ScopeId) -> Vec<Handle> {
        self.children_of(Owner::Scope(id))
    }

    /// Number of live allocations.
    pub fn live_allocations(&self) -> usize {
        self.arena.len()
    }

    /// Body of `handle`.
    pub fn bytes(&self, handle: Handle) -> Result<&[u8], MemError> {
        let record = self.arena.get(handle).ok_or(MemError::InvalidHandle)?;

        Ok(record.body.as_slice())
    }

    /// Body of `handle`, mutably.
    pub fn bytes_mut(&mut self, handle: Handle) -> Result<&mut [u8], MemError> {
        let record = self.arena.get_mut(handle).ok_or(MemError::InvalidHandle)?;

        Ok(record.body.as_mut_slice())
    }

    /// Body of `handle` up to and including its first NUL.
    pub fn c_str(&self, handle: Handle) -> Result<&CStr, MemError> {
        CStr::from_bytes_until_nul(self.bytes(handle)?).map_err(|_| MemError::NotNulTerminated)
    }
}

impl Drop for Allocator {
    fn drop(&mut self) {
        while let Some(id) = self.scopes.top() {
            self.close_scope(id);
        }
    }
}

/// Length of the C string in `bytes`, scanning at most `max` bytes.
fn c_strlen(bytes: &[u8], max: usize) -> usize {
    let window = &bytes[..bytes.len().min(max)];

    window
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(window.len())
}
