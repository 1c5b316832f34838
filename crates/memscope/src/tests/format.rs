// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::cell::Cell;
use std::fmt;

use crate::{Allocator, ErrorKind, MemError, format_alloc};

/// Display impl that always fails.
struct Broken;

impl fmt::Display for Broken {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

/// Display impl whose output changes between calls.
struct Shifting {
    calls: Cell<usize>,
    outputs: [&'static str; 2],
}

impl fmt::Display for Shifting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let call = self.calls.get();
        self.calls.set(call + 1);

        f.write_str(self.outputs[call.min(1)])
    }
}

// =============================================================================
// format_alloc()
// =============================================================================

#[test]
fn test_format_alloc_string_argument() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();

    let handle = format_alloc!(scope, "{}", "foo").expect("Failed to format_alloc!(..)");

    assert_eq!(scope.size_of(handle), 4);
    assert_eq!(scope.bytes(handle), Ok(&b"foo\0"[..]));
}

#[test]
fn test_format_alloc_mixed_arguments() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();

    let handle = format_alloc!(scope, "{}-{:03}-{:x}", "id", 7, 255)
        .expect("Failed to format_alloc!(..)");

    assert_eq!(scope.c_str(handle).map(|s| s.to_bytes()), Ok(&b"id-007-ff"[..]));
}

#[test]
fn test_format_alloc_empty_output() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();

    let handle = format_alloc!(scope, "").expect("Failed to format_alloc!(..)");

    assert_eq!(scope.bytes(handle), Ok(&b"\0"[..]));
}

#[test]
fn test_format_alloc_without_scope_fails() {
    let mut allocator = Allocator::new();

    let result = format_alloc!(allocator, "{}", 1);

    assert_eq!(result, Err(MemError::NoActiveScope));
}

#[test]
fn test_format_alloc_failing_display() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();

    let result = format_alloc!(scope, "x{}", Broken);

    assert_eq!(result, Err(MemError::Format));
    assert_eq!(MemError::Format.kind(), ErrorKind::FormatFailure);
    assert_eq!(scope.live_allocations(), 0);
}

#[test]
fn test_format_alloc_output_grows_between_passes() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();
    let shifting = Shifting {
        calls: Cell::new(0),
        outputs: ["ab", "abcd"],
    };

    let result = format_alloc!(scope, "{}", shifting);

    assert_eq!(result, Err(MemError::Format));
    assert_eq!(scope.live_allocations(), 0);
}

#[test]
fn test_format_alloc_output_shrinks_between_passes() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();
    let shifting = Shifting {
        calls: Cell::new(0),
        outputs: ["abcd", "ab"],
    };

    let result = format_alloc!(scope, "{}", shifting);

    assert_eq!(result, Err(MemError::Format));
    assert_eq!(scope.live_allocations(), 0);
}

#[test]
fn test_format_alloc_injected_allocation_failure() {
    let mut allocator = Allocator::new();
    let mut scope = allocator.scope();
    scope.change_behaviour(crate::AllocatorBehaviour::FailAtAllocate);

    let result = format_alloc!(scope, "{}", "foo");

    assert_eq!(result, Err(MemError::OutOfMemory { requested: 4 }));
}
