// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Formatted allocation: a counting dry run sizes the buffer, a second pass
//! fills it.

use core::fmt::{self, Write};

use crate::allocator::Allocator;
use crate::error::MemError;
use crate::handle::Handle;

/// Sums the lengths of everything written to it.
#[derive(Default)]
struct LengthCounter {
    len: usize,
}

impl Write for LengthCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len = self.len.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

/// Writes into a fixed slice, failing instead of truncating.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;

        dst.copy_from_slice(s.as_bytes());
        self.pos = end;

        Ok(())
    }
}

impl Allocator {
    /// Formats `args` into a new NUL-terminated allocation sized to the
    /// output length plus one.
    ///
    /// Usually called through [`format_alloc!`](crate::format_alloc).
    ///
    /// # Errors
    ///
    /// [`MemError::Format`] if either formatting pass fails, or if the second
    /// pass does not reproduce the counted length. The partially written
    /// allocation is torn down first.
    pub fn format_alloc(&mut self, args: fmt::Arguments<'_>) -> Result<Handle, MemError> {
        let mut counter = LengthCounter::default();
        fmt::write(&mut counter, args).map_err(|_| MemError::Format)?;

        let len = counter.len;
        let size = len.checked_add(1).ok_or(MemError::SizeOverflow)?;
        let handle = self.allocate(size)?;

        let written = {
            let body = self.bytes_mut(handle)?;
            let mut writer = SliceWriter {
                buf: &mut body[..len],
                pos: 0,
            };

            fmt::write(&mut writer, args).ok().map(|()| writer.pos)
        };

        if written != Some(len) {
            self.teardown(handle);
            return Err(MemError::Format);
        }

        Ok(handle)
    }
}
