// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Default number of bytes moved per `read`/`write` call on a pipe.
pub const DEFAULT_IO_CHUNK_SIZE: usize = 4096;

/// Default first sleep of the exit watcher between two status polls.
pub const DEFAULT_POLL_INITIAL_US: u64 = 50;

/// Default upper bound of the exit watcher's poll backoff.
pub const DEFAULT_POLL_MAX_US: u64 = 5_000;

/// Launch configuration as read from a TOML file.
///
/// ```toml
/// [io]
/// chunk_size = 4096
///
/// [poll]
/// initial_interval_us = 50
/// max_interval_us = 5000
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLaunchConfig {
    /// Pipe transfer tuning from `[io]`.
    #[serde(default)]
    pub io: IoSection,

    /// Exit watcher backoff from `[poll]`.
    #[serde(default)]
    pub poll: PollSection,
}

/// `[io]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IoSection {
    /// Bytes per `read`/`write` call. Only affects throughput, never the
    /// bytes a caller observes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_IO_CHUNK_SIZE
}

impl Default for IoSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// `[poll]` section.
///
/// The watcher sleeps `initial_interval_us` after the first empty poll and
/// doubles the sleep on every further empty poll, up to `max_interval_us`.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSection {
    #[serde(default = "default_poll_initial_us")]
    pub initial_interval_us: u64,

    #[serde(default = "default_poll_max_us")]
    pub max_interval_us: u64,
}

fn default_poll_initial_us() -> u64 {
    DEFAULT_POLL_INITIAL_US
}

fn default_poll_max_us() -> u64 {
    DEFAULT_POLL_MAX_US
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            initial_interval_us: default_poll_initial_us(),
            max_interval_us: default_poll_max_us(),
        }
    }
}

/// Backoff used by the exit watcher between two non-blocking status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl PollConfig {
    /// Sleep to use after `current`, doubling up to the configured maximum.
    pub fn next_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_interval)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_micros(DEFAULT_POLL_INITIAL_US),
            max_interval: Duration::from_micros(DEFAULT_POLL_MAX_US),
        }
    }
}

/// Validated configuration consumed by [`crate::process::Process`].
///
/// Build it with [`LaunchConfig::default`] and the `with_*` helpers, or load
/// it from TOML through [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    io_chunk_size: usize,
    poll: PollConfig,
}

impl LaunchConfig {
    /// Construct without validation. Used by `TryFrom<RawLaunchConfig>`
    /// after the raw values have been checked.
    pub(crate) fn new_unchecked(io_chunk_size: usize, poll: PollConfig) -> Self {
        Self {
            io_chunk_size,
            poll,
        }
    }

    pub fn io_chunk_size(&self) -> usize {
        self.io_chunk_size
    }

    pub fn poll(&self) -> PollConfig {
        self.poll
    }

    /// Override the pipe chunk size. A size of zero is clamped to one byte.
    pub fn with_io_chunk_size(mut self, size: usize) -> Self {
        self.io_chunk_size = size.max(1);
        self
    }

    /// Override the watcher backoff. A zero `initial_interval` becomes one
    /// microsecond and `max_interval` is raised to `initial_interval` if it
    /// is smaller.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        let initial_interval = poll.initial_interval.max(Duration::from_micros(1));
        self.poll = PollConfig {
            initial_interval,
            max_interval: poll.max_interval.max(initial_interval),
        };
        self
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            io_chunk_size: DEFAULT_IO_CHUNK_SIZE,
            poll: PollConfig::default(),
        }
    }
}
