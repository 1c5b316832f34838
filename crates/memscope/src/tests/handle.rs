// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::handle::{Arena, Handle};

// =============================================================================
// insert() / get()
// =============================================================================

#[test]
fn test_insert_get_round_trip() {
    let mut arena = Arena::new();
    let handle = arena.insert(42u32).expect("Failed to insert(..)");

    assert_eq!(arena.get(handle), Some(&42));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_get_mut_modifies_value() {
    let mut arena = Arena::new();
    let handle = arena.insert(1u32).expect("Failed to insert(..)");

    *arena.get_mut(handle).expect("Failed to get_mut(..)") = 2;

    assert_eq!(arena.get(handle), Some(&2));
}

#[test]
fn test_get_out_of_range_index() {
    let arena: Arena<u32> = Arena::new();

    assert_eq!(arena.get(Handle::from_parts(7, 0)), None);
}

// =============================================================================
// remove()
// =============================================================================

#[test]
fn test_remove_makes_handle_stale() {
    let mut arena = Arena::new();
    let handle = arena.insert("a").expect("Failed to insert(..)");

    assert_eq!(arena.remove(handle), Some("a"));
    assert!(!arena.contains(handle));
    assert_eq!(arena.len(), 0);
}

#[test]
fn test_double_remove_is_none() {
    let mut arena = Arena::new();
    let handle = arena.insert(1u8).expect("Failed to insert(..)");

    arena.remove(handle);

    assert_eq!(arena.remove(handle), None);
}

#[test]
fn test_reused_slot_does_not_resurrect_stale_handle() {
    let mut arena = Arena::new();
    let old = arena.insert(1u8).expect("Failed to insert(..)");
    arena.remove(old);

    let new = arena.insert(2u8).expect("Failed to insert(..)");

    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert_eq!(arena.get(old), None);
    assert_eq!(arena.get(new), Some(&2));
}

#[test]
fn test_slot_retired_on_generation_wrap() {
    let mut arena = Arena::new();
    let first = arena.insert(1u8).expect("Failed to insert(..)");
    arena.set_generation(first.index(), u32::MAX);

    let last = Handle::from_parts(first.index(), u32::MAX);
    assert_eq!(arena.remove(last), Some(1));

    assert_eq!(arena.free_slots(), 0);

    let next = arena.insert(3u8).expect("Failed to insert(..)");
    assert_ne!(next.index(), first.index());
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn test_display() {
    let handle = Handle::from_parts(3, 9);

    assert_eq!(handle.to_string(), "Handle(idx=3, gen=9)");
}
