// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Hierarchical, scope-bound allocation.
//!
//! Every allocation belongs to an ownership graph: it is owned either by a
//! lexical scope or by another allocation. Tearing down an owner tears down
//! everything it owns.
//!
//! # Core Guarantees
//!
//! - **Scoped cleanup**: closing a scope releases every allocation it still
//!   owns, directly or transitively. [`ScopeGuard`] closes on every exit
//!   path.
//! - **Stable handles**: allocations are named by slot+generation
//!   [`Handle`]s. Resizing never invalidates a handle; teardown always does.
//! - **Destructor order**: a parent's destructor runs before any of its
//!   descendants are torn down, so it may still inspect its children.
//! - **Fail-closed secure memory**: [`Allocator::mark_secure`] either pins
//!   the body in locked pages, or tears the allocation down and reports the
//!   failure. Secure bodies are wiped before release.
//!
//! # Example: Scopes and Reparenting
//!
//! ```rust
//! use memscope::{Allocator, MemError};
//!
//! fn example() -> Result<(), MemError> {
//!     let mut allocator = Allocator::new();
//!     let mut outer = allocator.scope();
//!
//!     let a = outer.allocate(16)?;
//!     {
//!         let mut inner = outer.scope();
//!         let b = inner.duplicate(b"survives")?;
//!
//!         // Move `b` under `a` before `inner` closes
//!         inner.reparent(b, a)?;
//!     }
//!
//!     let children = outer.children(a);
//!     assert_eq!(outer.bytes(children[0])?, b"survives");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Example: Destructors and Formatting
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use memscope::{Allocator, MemError, format_alloc};
//!
//! fn example() -> Result<(), MemError> {
//!     let called = Rc::new(Cell::new(false));
//!     let mut allocator = Allocator::new();
//!     {
//!         let mut scope = allocator.scope();
//!         let greeting = format_alloc!(scope, "hello {}", "world")?;
//!         assert_eq!(scope.c_str(greeting)?.to_bytes(), b"hello world");
//!
//!         let flag = called.clone();
//!         scope.set_destructor(greeting, move |d| flag.set(d.body() == b"hello world\0"))?;
//!     }
//!     assert!(called.get());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
mod tests;

mod allocator;
mod destructor;
mod error;
mod format;
mod graph;
mod handle;
mod record;
mod scope;
mod secure;

#[cfg(any(test, feature = "test-utils"))]
mod behaviour;

pub use allocator::Allocator;
pub use destructor::Destructing;
pub use error::{ErrorKind, MemError};
pub use handle::Handle;
pub use record::Owner;
pub use scope::{ScopeGuard, ScopeId};

pub use memscope_page::PageError;

#[cfg(any(test, feature = "test-utils"))]
pub use behaviour::AllocatorBehaviour;

/// Formats into a new allocation owned by the innermost scope.
///
/// `format_alloc!(allocator, "{}-{}", a, b)` expands to
/// `allocator.format_alloc(format_args!("{}-{}", a, b))`.
#[macro_export]
macro_rules! format_alloc {
    ($allocator:expr, $($arg:tt)*) => {
        $allocator.format_alloc(::core::format_args!($($arg)*))
    };
}
