use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use childpipe::errors::{ChildpipeError, Result};
use childpipe::types::ExitStatus;
use childpipe::watch::ExitProbe;

/// An exit probe that never touches a real process:
/// - reports "still running" for the first `running_polls` checks
/// - then fails `failing_polls` times
/// - then reports `status` (or keeps running forever if `status` is `None`)
///
/// Every call is counted in a shared counter so tests can observe how often
/// the watcher polled.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    running_polls: usize,
    failing_polls: usize,
    status: Option<ExitStatus>,
    polls: Arc<AtomicUsize>,
}

impl FakeProbe {
    /// Exit with `status` on the first poll.
    pub fn exits_immediately(status: ExitStatus) -> Self {
        Self::exits_after(0, status)
    }

    /// Report "still running" `polls` times, then exit with `status`.
    pub fn exits_after(polls: usize, status: ExitStatus) -> Self {
        Self {
            running_polls: polls,
            failing_polls: 0,
            status: Some(status),
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Never report termination.
    pub fn never_exits() -> Self {
        Self {
            running_polls: 0,
            failing_polls: 0,
            status: None,
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail `failures` polls before the configured outcome.
    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failing_polls = failures;
        self
    }

    /// Shared poll counter; clone it before handing the probe to a watcher.
    pub fn poll_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self::never_exits()
    }
}

impl ExitProbe for FakeProbe {
    fn poll_exit(&mut self, pid: u32) -> Result<Option<ExitStatus>> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst);

        if seen < self.running_polls {
            return Ok(None);
        }
        if seen < self.running_polls + self.failing_polls {
            return Err(ChildpipeError::IoError(std::io::Error::other(format!(
                "fake poll failure for pid {pid}"
            ))));
        }
        Ok(self.status)
    }
}
