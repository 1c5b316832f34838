// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for memscope-page.

use thiserror::Error;

/// Errors from page syscalls.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum PageError {
    /// The backing region could not be mapped.
    #[error("mmap failed")]
    Create = 0,

    /// The region could not be pinned (lockable-memory quota, permissions).
    #[error("mlock failed")]
    Lock = 1,

    /// No page-locking primitive on this target.
    #[error("page locking is not supported on this platform")]
    Unsupported = 2,
}
