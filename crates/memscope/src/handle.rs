// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Slot+generation handles and the arena they index.
//!
//! Records never move relative to their handle: resizing a body swaps the
//! body's storage, not the slot. A torn down slot bumps its generation, so
//! stale handles resolve to `None` instead of aliasing a newer allocation.

use alloc::vec::Vec;
use core::fmt;

use crate::error::MemError;

/// Names one allocation inside an [`Allocator`](crate::Allocator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index within the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this allocation was made.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(idx={}, gen={})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with a free list.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn insert(&mut self, value: T) -> Result<Handle, MemError> {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.live += 1;

            return Ok(Handle {
                index,
                generation: slot.generation,
            });
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| MemError::OutOfMemory {
            requested: core::mem::size_of::<Slot<T>>(),
        })?;

        self.slots
            .try_reserve(1)
            .map_err(|_| MemError::OutOfMemory {
                requested: core::mem::size_of::<Slot<T>>(),
            })?;

        // Reserve the free-list entry up front so remove() never allocates.
        self.free_list
            .try_reserve(self.slots.len() + 1)
            .map_err(|_| MemError::OutOfMemory {
                requested: core::mem::size_of::<u32>(),
            })?;

        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.live += 1;

        Ok(Handle {
            index,
            generation: 0,
        })
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;

        if slot.generation != handle.generation {
            return None;
        }

        slot.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;

        if slot.generation != handle.generation {
            return None;
        }

        slot.value.as_mut()
    }

    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Removes the value, bumping the slot generation.
    ///
    /// A slot whose generation wraps to 0 is retired rather than recycled.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;

        if slot.generation != handle.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;

        if slot.generation != 0 {
            self.free_list.push(handle.index);
        }

        Some(value)
    }
}

#[cfg(test)]
impl<T> Arena<T> {
    pub(crate) fn set_generation(&mut self, index: u32, generation: u32) {
        self.slots[index as usize].generation = generation;
    }

    pub(crate) fn free_slots(&self) -> usize {
        self.free_list.len()
    }
}

#[cfg(test)]
impl Handle {
    pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}
