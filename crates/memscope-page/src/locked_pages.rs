// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! LockedPages - dedicated mmap'd region with mlock and wipe-on-release.
//!
//! Each syscall is exposed separately for granular testing.

use core::ptr;

use crate::error::PageError;

/// Returns the system page size.
pub fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

/// A private anonymous mapping holding `len` usable bytes.
///
/// The mapping is rounded up to whole pages (at least one), so locking it
/// never touches memory owned by anything else.
#[derive(Debug)]
pub struct LockedPages {
    ptr: *mut u8,
    len: usize,
    capacity: usize,
    is_locked: bool,
    is_disposed: bool,
}

// Safety: LockedPages exclusively owns its mapping.
unsafe impl Send for LockedPages {}
unsafe impl Sync for LockedPages {}

impl LockedPages {
    /// Maps a zeroed region able to hold `len` bytes. Does NOT lock.
    pub fn new(len: usize) -> Result<Self, PageError> {
        let page = page_size();
        let capacity = len
            .max(1)
            .checked_next_multiple_of(page)
            .ok_or(PageError::Create)?;

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                capacity,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(PageError::Create);
        }

        // Anonymous mappings are zero-filled by the kernel.
        Ok(Self {
            ptr: ptr as *mut u8,
            len,
            capacity,
            is_locked: false,
            is_disposed: false,
        })
    }

    /// Locks the whole mapping in RAM (prevents swapping to disk).
    pub fn lock(&mut self) -> Result<(), PageError> {
        if self.is_disposed {
            return Err(PageError::Lock);
        }

        let failed = unsafe { libc::mlock(self.ptr as *const _, self.capacity) } != 0;

        if failed {
            return Err(PageError::Lock);
        }

        self.is_locked = true;

        Ok(())
    }

    /// Unlocks the mapping (allows swapping). No-op when not locked.
    pub fn munlock(&mut self) {
        if !self.is_locked {
            return;
        }

        unsafe { libc::munlock(self.ptr as *const _, self.capacity) };
        self.is_locked = false;
    }

    /// Whether `lock()` succeeded and the mapping has not been unlocked since.
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Usable length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the usable length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mapped length in bytes (whole pages).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The usable bytes. Empty once disposed.
    pub fn as_slice(&self) -> &[u8] {
        if self.is_disposed {
            return &[];
        }

        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// The usable bytes, mutably. Empty once disposed.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        if self.is_disposed {
            return &mut [];
        }

        unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// Zeroes the whole mapping, slack past `len` included. No-op once
    /// disposed.
    pub fn wipe(&mut self) {
        if self.is_disposed {
            return;
        }

        let whole = unsafe { core::slice::from_raw_parts_mut(self.ptr, self.capacity) };
        crate::wipe(whole);
    }

    /// Wipes the whole mapping, unlocks it and unmaps it. Idempotent.
    pub fn dispose(&mut self) {
        if self.is_disposed {
            return;
        }

        self.wipe();
        self.munlock();
        self.munmap();
        self.is_disposed = true;
    }

    fn munmap(&self) {
        unsafe { libc::munmap(self.ptr as *mut libc::c_void, self.capacity) };
    }
}

impl Drop for LockedPages {
    fn drop(&mut self) {
        self.dispose();
    }
}
