// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for memscope crates.
//!
//! Lock failures are process-wide: once the lockable-memory quota is gone it
//! stays gone. Tests that need a real `mlock` failure therefore run as an
//! ignored test inside a child process, shrink the quota there, and report
//! back through the exit code.
//!
//! ## License
//!
//! GPL-3.0-only

/// Exit code a subprocess test uses when it cannot provoke the failure it
/// wants to observe (e.g. the process holds `CAP_IPC_LOCK`).
pub const SKIPPED_EXIT_CODE: i32 = 77;

/// Runs an ignored test as a subprocess and returns its exit code.
pub fn run_test_as_subprocess(test_name: &str) -> Option<i32> {
    let exe = std::env::current_exe().expect("Failed to current_exe()");
    let status = std::process::Command::new(exe)
        .args([
            "--exact",
            test_name,
            "--ignored",
            "--test-threads=1",
            "--nocapture",
        ])
        .status()
        .expect("Failed to run subprocess");

    status.code()
}

/// Asserts that a subprocess test either passed or skipped itself.
pub fn assert_subprocess_passed(test_name: &str) {
    let exit_code = run_test_as_subprocess(test_name);

    if exit_code == Some(SKIPPED_EXIT_CODE) {
        eprintln!("{test_name}: skipped (mlock quota cannot be enforced here)");
        return;
    }

    assert_eq!(
        exit_code,
        Some(0),
        "Subprocess should exit cleanly after assertion"
    );
}

/// Sets `RLIMIT_MEMLOCK` to zero for the calling process.
///
/// Unprivileged processes can no longer `mlock` anything afterwards.
/// Processes with `CAP_IPC_LOCK` are unaffected; use [`mlock_is_restricted`]
/// to find out which case applies.
#[cfg(unix)]
pub fn restrict_memlock() {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };

    unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &limit) };
}

/// Probes whether `mlock` currently fails for this process.
#[cfg(unix)]
pub fn mlock_is_restricted() -> bool {
    let probe = [0u8; 1];
    let locked = unsafe { libc::mlock(probe.as_ptr() as *const _, probe.len()) } == 0;

    if locked {
        unsafe { libc::munlock(probe.as_ptr() as *const _, probe.len()) };
    }

    !locked
}

/// Restricts the quota and exits with [`SKIPPED_EXIT_CODE`] if locking still
/// works. Call at the top of an ignored subprocess test.
#[cfg(unix)]
pub fn restrict_memlock_or_skip() {
    restrict_memlock();

    if !mlock_is_restricted() {
        std::process::exit(SKIPPED_EXIT_CODE);
    }
}
