// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Shared fixtures: a destructor log recording teardown order, and a
//! per-thread record of what each wiped body held right after its wipe.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{Allocator, Handle};

#[derive(Clone, Default)]
pub(crate) struct TeardownLog {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl TeardownLog {
    /// Installs a destructor on `handle` that records `name`.
    pub(crate) fn track(&self, allocator: &mut Allocator, handle: Handle, name: &'static str) {
        let events = self.events.clone();

        allocator
            .set_destructor(handle, move |_| events.borrow_mut().push(name))
            .expect("Failed to set_destructor(..)");
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.events.borrow().clone()
    }

    pub(crate) fn position(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .position(|event| *event == name)
            .unwrap_or_else(|| panic!("{name} was never torn down"))
    }
}

std::thread_local! {
    static WIPES: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

/// Called by `Body` right after a wipe, before the storage is returned.
pub(crate) fn record_wipe(bytes: &[u8]) {
    WIPES.with(|wipes| wipes.borrow_mut().push(bytes.to_vec()));
}

/// Drains the wipes recorded on this thread so far.
pub(crate) fn take_wipes() -> Vec<Vec<u8>> {
    WIPES.with(|wipes| core::mem::take(&mut *wipes.borrow_mut()))
}
