// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Page-locked storage for secure allocations.
//!
//! A secure allocation must never be swapped out and must never leave its
//! contents behind once released. This crate provides the two primitives the
//! allocator builds that policy from:
//!
//! - [`LockedPages`]: a dedicated `mmap` region, pinned with `mlock`, that is
//!   zero-wiped, unlocked and unmapped on release. Each secure body gets its
//!   own pages, so unlocking one can never unpin a neighbour sharing the page.
//! - [`wipe`]: zero a byte slice in a way the optimizer cannot elide.
//!
//! It also provides [`zeroed_vec`], the fallible zeroed heap allocation
//! plain (non-secure) bodies start from.
//!
//! # Example
//!
//! ```rust
//! #[cfg(unix)]
//! fn example() -> Result<(), memscope_page::PageError> {
//!     use memscope_page::LockedPages;
//!
//!     let mut pages = LockedPages::new(32)?;
//!     pages.lock()?;
//!
//!     pages.as_mut_slice()[0] = 42;
//!     assert_eq!(pages.as_slice()[0], 42);
//!
//!     // Wiped, unlocked and unmapped on drop
//!     Ok(())
//! }
//! # #[cfg(unix)]
//! # example().unwrap();
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(test)]
mod tests;

mod error;

#[cfg(unix)]
mod locked_pages;

#[cfg(not(unix))]
#[path = "unsupported.rs"]
mod locked_pages;

pub use error::PageError;
pub use locked_pages::{LockedPages, page_size};

use alloc::vec::Vec;
use core::alloc::Layout;

use zeroize::Zeroize;

/// Zeroes `bytes` with volatile writes.
///
/// # Example
///
/// ```
/// use memscope_page::wipe;
///
/// let mut secret = *b"hunter2";
/// wipe(&mut secret);
/// assert!(secret.iter().all(|&b| b == 0));
/// ```
#[inline]
pub fn wipe(bytes: &mut [u8]) {
    bytes.zeroize();
}

/// Allocates `len` zero bytes, or `None` if the global allocator refuses.
///
/// Goes through `alloc_zeroed`, so a large request can be served by fresh
/// pages the kernel zero-fills on first touch instead of being written up
/// front.
///
/// # Example
///
/// ```
/// use memscope_page::zeroed_vec;
///
/// let bytes = zeroed_vec(4096).expect("Failed to zeroed_vec(..)");
/// assert_eq!(bytes.len(), 4096);
/// assert!(zeroed_vec(usize::MAX).is_none());
/// ```
pub fn zeroed_vec(len: usize) -> Option<Vec<u8>> {
    if len == 0 {
        return Some(Vec::new());
    }

    let layout = Layout::array::<u8>(len).ok()?;
    let ptr = unsafe { alloc::alloc::alloc_zeroed(layout) };

    if ptr.is_null() {
        return None;
    }

    // Safety: `ptr` comes from the global allocator with `layout`
    // (align 1, size `len`) and all `len` bytes are initialized to zero.
    Some(unsafe { Vec::from_raw_parts(ptr, len, len) })
}
