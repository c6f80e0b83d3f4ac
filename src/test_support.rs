// src/test_support.rs

//! Test-only access to a handle's pipe ends and the chunked I/O loops.
//!
//! Compiled only with the `test-support` feature. Production code has no
//! reason to touch the raw pipes: use the methods on
//! [`crate::process::Process`] instead.

use std::fs::File;

use crate::process::Process;

pub use crate::process::pipes::{read_chunked, write_chunked};

/// Parent-side write end of the child's stdin, if still open.
pub fn stdin_pipe(process: &mut Process) -> Option<&mut File> {
    process.stdin_pipe()
}

/// Parent-side read end of the child's stdout.
pub fn stdout_pipe(process: &mut Process) -> Option<&mut File> {
    process.stdout_pipe()
}

/// Parent-side read end of the child's stderr.
pub fn stderr_pipe(process: &mut Process) -> Option<&mut File> {
    process.stderr_pipe()
}
