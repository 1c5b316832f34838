// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::allocator::Allocator;

/// Test behaviour for injecting failures into [`Allocator`] operations.
///
/// Only available with the `test-utils` feature. The behaviour is sticky:
/// once set, it remains active until changed.
///
/// # Example
///
/// ```rust
/// // test-utils feature required in dev-dependencies
/// use memscope::{Allocator, AllocatorBehaviour, ErrorKind};
///
/// #[cfg(test)]
/// mod tests {
///     use super::*;
///
///     #[test]
///     fn test_handles_lock_failure() {
///         let mut allocator = Allocator::new();
///         let mut scope = allocator.scope();
///         let handle = scope.allocate(32).unwrap();
///
///         // Inject failure
///         scope.change_behaviour(AllocatorBehaviour::FailAtLock);
///
///         let err = scope.mark_secure(handle).unwrap_err();
///         assert_eq!(err.kind(), ErrorKind::SecureLockFailure);
///         assert!(!scope.is_live(handle));
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AllocatorBehaviour {
    /// Normal behaviour - no injected failures.
    #[default]
    None,
    /// Every page lock fails as if the lockable-memory quota were exhausted.
    FailAtLock,
    /// Every body allocation or resize fails as if storage were exhausted.
    FailAtAllocate,
}

impl Allocator {
    /// Switches the injected failure mode.
    pub fn change_behaviour(&mut self, behaviour: AllocatorBehaviour) {
        self.behaviour = behaviour;
    }
}
