// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Secure memory policy.
//!
//! A secure allocation lives in its own locked pages for the rest of its
//! life and is wiped before those pages are unlocked and unmapped.
//!
//! Marking is fail-closed: if the pages cannot be locked, the allocation is
//! torn down before the error is returned, so no caller ever holds a
//! "secure" buffer that might be swapped out.

use core::mem;

use log::{trace, warn};
use memscope_page::{LockedPages, PageError};

use crate::allocator::Allocator;
use crate::error::MemError;
use crate::handle::Handle;
use crate::record::Body;

#[cfg(any(test, feature = "test-utils"))]
use crate::behaviour::AllocatorBehaviour;

impl Allocator {
    fn lock_pages(&self, len: usize) -> Result<LockedPages, PageError> {
        #[cfg(any(test, feature = "test-utils"))]
        if self.behaviour == AllocatorBehaviour::FailAtLock {
            return Err(PageError::Lock);
        }

        let mut pages = LockedPages::new(len)?;
        pages.lock()?;

        Ok(pages)
    }

    /// Pins `handle`'s body in RAM and arranges for it to be wiped on
    /// release. Idempotent.
    ///
    /// # Errors
    ///
    /// [`MemError::SecureLock`] if the pages cannot be locked. The
    /// allocation (with its subtree, destructors included) has been torn
    /// down by the time this returns.
    pub fn mark_secure(&mut self, handle: Handle) -> Result<Handle, MemError> {
        let record = self.arena.get(handle).ok_or(MemError::InvalidHandle)?;

        if record.flags.secure {
            return Ok(handle);
        }

        let mut pages = match self.lock_pages(record.size) {
            Ok(pages) => pages,
            Err(e) => {
                warn!("mark_secure {handle}: {e}; tearing the allocation down");
                self.teardown(handle);
                return Err(MemError::SecureLock(e));
            }
        };

        let record = self.arena.get_mut(handle).ok_or(MemError::InvalidHandle)?;
        pages.as_mut_slice().copy_from_slice(record.body.as_slice());

        let old = mem::replace(&mut record.body, Body::Locked(pages));
        record.flags.secure = true;
        old.wipe_and_release();

        trace!("mark_secure {handle}: {} bytes locked", record.size);

        Ok(handle)
    }

    /// Moves a secure body into freshly locked pages of `new_size`.
    ///
    /// If the new pages cannot be mapped (`OutOfMemory`) or locked
    /// (`SecureLock`) the original stays as it was, still locked and still
    /// owned.
    pub(crate) fn reallocate_secure(
        &mut self,
        handle: Handle,
        new_size: usize,
    ) -> Result<Handle, MemError> {
        let mut pages = self.lock_pages(new_size).map_err(|e| {
            warn!("reallocate {handle}: {e}; keeping the original allocation");

            match e {
                PageError::Create => MemError::OutOfMemory {
                    requested: new_size,
                },
                e => MemError::SecureLock(e),
            }
        })?;

        let record = self.arena.get_mut(handle).ok_or(MemError::InvalidHandle)?;
        let kept = record.size.min(new_size);
        pages.as_mut_slice()[..kept].copy_from_slice(&record.body.as_slice()[..kept]);

        let old = mem::replace(&mut record.body, Body::Locked(pages));
        record.size = new_size;
        old.wipe_and_release();

        Ok(handle)
    }
}
