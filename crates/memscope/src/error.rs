// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for memscope.

use memscope_page::PageError;
use thiserror::Error;

/// Broad failure classes every [`MemError`] falls into.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Storage exhausted, size overflow, or no active scope.
    AllocationFailure,
    /// A stale handle (or a malformed body) was passed in.
    InvalidArgument,
    /// Page locking failed; the allocation has been torn down.
    SecureLockFailure,
    /// Formatting failed; the partial buffer has been torn down.
    FormatFailure,
}

/// Errors returned by [`Allocator`](crate::Allocator) operations.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum MemError {
    /// Allocation requires an open scope on this allocator.
    #[error("no active scope")]
    NoActiveScope,

    /// The underlying storage could not provide the requested bytes.
    #[error("out of memory: requested {requested} bytes")]
    OutOfMemory {
        /// Bytes requested from the underlying storage.
        requested: usize,
    },

    /// The requested size does not fit in `usize`.
    #[error("Integer overflow: allocation size would exceed usize::MAX")]
    SizeOverflow,

    /// The handle does not name a live allocation.
    #[error("invalid or stale handle")]
    InvalidHandle,

    /// The body holds no NUL terminator.
    #[error("allocation is not NUL-terminated")]
    NotNulTerminated,

    /// The pages backing a secure allocation could not be locked.
    #[error("secure lock failed: {0}")]
    SecureLock(#[from] PageError),

    /// A formatting pass reported an error or changed its length.
    #[error("formatting failed")]
    Format,
}

impl MemError {
    /// Maps the error onto its failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoActiveScope | Self::OutOfMemory { .. } | Self::SizeOverflow => {
                ErrorKind::AllocationFailure
            }
            Self::InvalidHandle | Self::NotNulTerminated => ErrorKind::InvalidArgument,
            Self::SecureLock(_) => ErrorKind::SecureLockFailure,
            Self::Format => ErrorKind::FormatFailure,
        }
    }
}
