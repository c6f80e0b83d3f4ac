// src/watch/watcher.rs

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace, warn};

use crate::config::PollConfig;
use crate::errors::Result;
use crate::types::ExitStatus;
use crate::watch::ExitCell;

/// Non-blocking termination check for one pid.
///
/// The native implementation lives in [`crate::platform`]; tests can
/// provide their own that does not involve real processes.
pub trait ExitProbe: Send + 'static {
    /// Return `Ok(Some(_))` once `pid` has terminated and `Ok(None)` while it
    /// is still running.
    ///
    /// Errors are treated by the watcher as "not yet exited" and the check
    /// is retried.
    fn poll_exit(&mut self, pid: u32) -> Result<Option<ExitStatus>>;
}

/// Background thread that polls one pid and publishes its exit status into
/// an [`ExitCell`].
///
/// States: running until either the probe reports termination (the status
/// is published once and the thread ends) or [`Watcher::stop`] is called
/// (the thread ends without publishing). Dropping a `Watcher` stops and
/// joins it.
#[derive(Debug)]
pub struct Watcher {
    pid: u32,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Start watching `pid`.
    ///
    /// Fails only if the OS refuses to create the thread.
    pub fn spawn<P: ExitProbe>(
        pid: u32,
        probe: P,
        cell: Arc<ExitCell>,
        poll: PollConfig,
    ) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name(format!("childpipe-watch-{pid}"))
            .spawn(move || watch_loop(pid, probe, &cell, &thread_stop, poll))?;

        debug!(pid, "exit watcher started");

        Ok(Self {
            pid,
            stop,
            thread: Some(thread),
        })
    }

    /// True once the watcher thread has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signal the thread to halt and join it. Idempotent.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        self.stop.store(true, Ordering::Release);
        thread.thread().unpark();

        if thread.join().is_err() {
            warn!(pid = self.pid, "exit watcher thread panicked");
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_loop<P: ExitProbe>(
    pid: u32,
    mut probe: P,
    cell: &ExitCell,
    stop: &AtomicBool,
    poll: PollConfig,
) {
    let mut interval = poll.initial_interval;

    while !stop.load(Ordering::Acquire) {
        match probe.poll_exit(pid) {
            Ok(Some(status)) => {
                if cell.publish(status) {
                    info!(pid, %status, "process terminated");
                }
                return;
            }
            Ok(None) => trace!(pid, ?interval, "process still running"),
            Err(e) => trace!(pid, error = %e, "exit poll failed; retrying"),
        }

        // `stop` unparks us, so a long interval never delays shutdown.
        thread::park_timeout(interval);
        interval = poll.next_interval(interval);
    }

    debug!(pid, "exit watcher stopped before observing termination");
}
