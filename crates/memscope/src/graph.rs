// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Ownership graph: O(1) attach/detach over sibling links, and teardown.
//!
//! Every live record sits in exactly one children list, either a scope's or
//! another record's. Lists are doubly linked through handles; the owner
//! keeps the head, and new children are pushed at the head.
//!
//! Teardown order for a subtree rooted at `n`:
//! detach `n`, run `n`'s destructor, tear down each child the same way,
//! then release `n`'s storage. Destructors therefore run pre-order and
//! storage is released bottom-up. The walk uses an explicit work stack so
//! deep chains cannot overflow the call stack.

use alloc::vec::Vec;
use core::mem;

use log::trace;

use crate::allocator::Allocator;
use crate::destructor::Destructing;
use crate::handle::Handle;
use crate::record::{Body, Owner};

enum Step {
    Enter(Handle),
    Release(Handle),
}

impl Allocator {
    fn owner_first_child(&self, owner: Owner) -> Option<Handle> {
        match owner {
            Owner::Scope(id) => self.scopes.first_child(id),
            Owner::Allocation(parent) => self.arena.get(parent)?.first_child,
        }
    }

    fn set_owner_first_child(&mut self, owner: Owner, head: Option<Handle>) {
        match owner {
            Owner::Scope(id) => self.scopes.set_first_child(id, head),
            Owner::Allocation(parent) => {
                if let Some(record) = self.arena.get_mut(parent) {
                    record.first_child = head;
                }
            }
        }
    }

    /// Pushes a detached `node` at the head of `owner`'s children list.
    pub(crate) fn attach(&mut self, node: Handle, owner: Owner) {
        let head = self.owner_first_child(owner);

        let Some(record) = self.arena.get_mut(node) else {
            return;
        };
        debug_assert!(record.owner.is_none(), "attach of an attached node");

        record.owner = Some(owner);
        record.prev = None;
        record.next = head;

        if let Some(head) = head {
            if let Some(next) = self.arena.get_mut(head) {
                next.prev = Some(node);
            }
        }

        self.set_owner_first_child(owner, Some(node));
        trace!("attach {node} to {owner:?}");
    }

    /// Unlinks `node` from its owner. No-op for a detached node.
    pub(crate) fn detach(&mut self, node: Handle) {
        let Some(record) = self.arena.get_mut(node) else {
            return;
        };
        let Some(owner) = record.owner.take() else {
            return;
        };
        let prev = record.prev.take();
        let next = record.next.take();

        match prev {
            Some(prev) => {
                if let Some(record) = self.arena.get_mut(prev) {
                    record.next = next;
                }
            }
            None => self.set_owner_first_child(owner, next),
        }

        if let Some(next) = next {
            if let Some(record) = self.arena.get_mut(next) {
                record.prev = prev;
            }
        }

        trace!("detach {node} from {owner:?}");
    }

    /// Direct children of an owner, head first.
    pub(crate) fn children_of(&self, owner: Owner) -> Vec<Handle> {
        let mut children = Vec::new();
        let mut cursor = self.owner_first_child(owner);

        while let Some(child) = cursor {
            children.push(child);
            cursor = self.arena.get(child).and_then(|record| record.next);
        }

        children
    }

    /// Tears down `root` and its whole subtree. Returns the number of
    /// allocations released.
    pub(crate) fn teardown(&mut self, root: Handle) -> usize {
        let mut released = 0;
        let mut steps = Vec::new();
        steps.push(Step::Enter(root));

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node) => {
                    if !self.arena.contains(node) {
                        continue;
                    }

                    self.detach(node);
                    self.run_destructor(node);

                    steps.push(Step::Release(node));

                    // Reversed so the head child is entered first.
                    let children = self.children_of(Owner::Allocation(node));
                    steps.extend(children.into_iter().rev().map(Step::Enter));
                }
                Step::Release(node) => {
                    if let Some(record) = self.arena.remove(node) {
                        debug_assert!(record.first_child.is_none());
                        record.body.release();
                        released += 1;
                    }
                }
            }
        }

        released
    }

    fn run_destructor(&mut self, node: Handle) {
        let Some(record) = self.arena.get_mut(node) else {
            return;
        };
        let Some(destructor) = record.destructor.take() else {
            return;
        };

        // The body is lent to the destructor while the graph stays borrowed
        // immutably, then put back for release.
        let mut body = mem::replace(&mut record.body, Body::empty());

        {
            let mut destructing = Destructing {
                handle: node,
                body: body.as_mut_slice(),
                allocator: self,
            };
            destructor(&mut destructing);
        }

        if let Some(record) = self.arena.get_mut(node) {
            record.body = body;
        }
    }
}
