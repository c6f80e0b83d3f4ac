// src/watch/cell.rs

use std::sync::{Condvar, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use crate::types::ExitStatus;

/// Set-once slot holding a process's exit status.
///
/// The exit watcher is the only writer; any number of threads may read or
/// block on it. Once a status is stored it is never replaced. Waiters sleep
/// on a condition variable that [`ExitCell::publish`] signals.
#[derive(Debug, Default)]
pub struct ExitCell {
    status: OnceLock<ExitStatus>,
    lock: Mutex<()>,
    published: Condvar,
}

impl ExitCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status, if one has been published.
    pub fn get(&self) -> Option<ExitStatus> {
        self.status.get().copied()
    }

    /// Store `status` and wake all waiters.
    ///
    /// Returns `false` (and leaves the stored value untouched) if a status
    /// was already published.
    pub fn publish(&self, status: ExitStatus) -> bool {
        if self.status.set(status).is_err() {
            return false;
        }
        // Taking the lock orders this notify after any waiter that saw an
        // empty cell has started waiting.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.published.notify_all();
        true
    }

    /// Block until a status is published.
    pub fn wait(&self) -> ExitStatus {
        if let Some(status) = self.get() {
            return status;
        }

        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(status) = self.get() {
                return status;
            }
            guard = self
                .published
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until a status is published or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ExitStatus> {
        if let Some(status) = self.get() {
            return Some(status);
        }

        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(status) = self.get() {
                return Some(status);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            guard = self
                .published
                .wait_timeout(guard, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
