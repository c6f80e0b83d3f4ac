// src/platform/unsupported.rs

//! Fallback for targets without POSIX process primitives.

use crate::errors::{ChildpipeError, Result};
use crate::exec::Executable;
use crate::platform::{Launched, Platform};
use crate::types::ExitStatus;
use crate::watch::ExitProbe;

#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl Platform for Unsupported {
    type Probe = UnsupportedProbe;

    fn launch(_executable: &Executable) -> Result<Launched> {
        Err(ChildpipeError::Unsupported(std::env::consts::OS))
    }

    fn reap(_pid: u32) {}

    fn current_pid() -> u32 {
        std::process::id()
    }

    fn name() -> &'static str {
        std::env::consts::OS
    }
}

/// Never observes termination; the watcher simply keeps backing off.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProbe;

impl ExitProbe for UnsupportedProbe {
    fn poll_exit(&mut self, _pid: u32) -> Result<Option<ExitStatus>> {
        Err(ChildpipeError::Unsupported(std::env::consts::OS))
    }
}
