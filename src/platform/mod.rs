// src/platform/mod.rs

//! Per-OS process primitives.
//!
//! Each target gets one [`Platform`] implementation, chosen at build time:
//!
//! - [`unix::Unix`] on every `cfg(unix)` target: pipes, `fork` + `execve`,
//!   non-blocking `waitpid`.
//! - [`unsupported::Unsupported`] everywhere else: every launch fails with
//!   [`crate::errors::ChildpipeError::Unsupported`], so a caller learns about
//!   the missing capability on first use instead of finding methods absent.
//!
//! [`Native`] names the implementation for the current target.

use std::fs::File;

use crate::errors::Result;
use crate::exec::Executable;
use crate::watch::ExitProbe;

#[cfg(unix)]
pub mod unix;
#[cfg(not(unix))]
pub mod unsupported;

#[cfg(unix)]
pub type Native = unix::Unix;
#[cfg(not(unix))]
pub type Native = unsupported::Unsupported;

/// A freshly launched child and the parent-side ends of its pipes.
#[derive(Debug)]
pub struct Launched {
    pub pid: u32,
    pub stdin: File,
    pub stdout: File,
    pub stderr: File,
}

/// Process operations the handle needs from the operating system.
pub trait Platform {
    /// Probe the exit watcher polls with.
    type Probe: ExitProbe + Default;

    /// Create the three pipes, fork, wire the child's standard streams and
    /// exec `executable` in it.
    ///
    /// A failing `execve` is not an error here: the child exits with the
    /// OS error code as its status instead.
    fn launch(executable: &Executable) -> Result<Launched>;

    /// Block until `pid` terminates and discard its status. Used only on the
    /// error path, when a child exists but no watcher could be started.
    fn reap(pid: u32);

    /// Process id of the caller.
    fn current_pid() -> u32;

    /// Short name for log and error messages.
    fn name() -> &'static str;
}
