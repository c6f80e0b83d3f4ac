// src/process/handle.rs

use std::fs::File;
use std::io::ErrorKind;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, trace, warn};

use crate::config::LaunchConfig;
use crate::errors::{ChildpipeError, Result};
use crate::exec::Executable;
use crate::platform::{Native, Platform};
use crate::process::pipes::{read_chunked, write_chunked};
use crate::types::{ExitStatus, Output};
use crate::watch::{ExitCell, Watcher};

type NativeProbe = <Native as Platform>::Probe;

/// Handle to a running (or finished) process.
///
/// A handle owns the process id, the parent-side ends of the child's
/// stdin/stdout/stderr pipes, and one exit watcher thread that publishes the
/// exit status as soon as the process terminates.
///
/// Handles are move-only. Moving one moves the watcher along with it, so an
/// exit that happens mid-move is still captured. Dropping a handle stops and
/// joins the watcher, then closes the pipes; a child that is still running
/// at that point keeps running, and its status is never collected.
///
/// # Example
///
/// ```rust,no_run
/// use childpipe::{Executable, Process};
///
/// let exe = Executable::new("/bin/cat");
/// let mut process = Process::create(&exe)?;
/// process.write_stdin(b"hello")?;
/// process.close_stdin();
/// assert_eq!(process.read_stdout()?, b"hello");
/// assert_eq!(process.wait().exit_code(), Some(0));
/// # Ok::<(), childpipe::errors::ChildpipeError>(())
/// ```
#[derive(Debug)]
pub struct Process {
    pid: u32,
    exit: Arc<ExitCell>,
    watcher: Option<Watcher>,
    stdin: Option<File>,
    stdout: Option<File>,
    stderr: Option<File>,
    config: LaunchConfig,
}

impl Process {
    /// Launch `executable` with the default [`LaunchConfig`].
    pub fn create(executable: &Executable) -> Result<Self> {
        Self::create_with(executable, LaunchConfig::default())
    }

    /// Launch `executable`, wiring all three standard streams to pipes.
    ///
    /// Returns an error only if the pipes, the fork, or the watcher thread
    /// could not be created; nothing is leaked in that case. A program that
    /// cannot be executed still yields a handle: the child exits at once
    /// with the OS error code (e.g. `ENOENT`) as its exit code.
    pub fn create_with(executable: &Executable, config: LaunchConfig) -> Result<Self> {
        let launched = Native::launch(executable)?;
        let pid = launched.pid;
        let exit = Arc::new(ExitCell::new());

        let watcher =
            match Watcher::spawn(pid, NativeProbe::default(), Arc::clone(&exit), config.poll()) {
                Ok(watcher) => watcher,
                Err(e) => {
                    warn!(pid, error = %e, "failed to start exit watcher; reaping child");
                    // Closing the pipes first lets a child blocked on them finish.
                    drop(launched);
                    Native::reap(pid);
                    return Err(e.into());
                }
            };

        debug!(pid, platform = Native::name(), "process handle created");

        Ok(Self {
            pid,
            exit,
            watcher: Some(watcher),
            stdin: Some(launched.stdin),
            stdout: Some(launched.stdout),
            stderr: Some(launched.stderr),
            config,
        })
    }

    /// Handle representing the calling process.
    ///
    /// It has no pipes (reads return nothing, writes fail with
    /// [`ChildpipeError::PipeClosed`]) and its watcher never observes an
    /// exit, so [`Process::exit_code`] stays `None`.
    pub fn current() -> Self {
        Self::current_with(LaunchConfig::default())
    }

    pub fn current_with(config: LaunchConfig) -> Self {
        let pid = Native::current_pid();
        let exit = Arc::new(ExitCell::new());

        let watcher =
            match Watcher::spawn(pid, NativeProbe::default(), Arc::clone(&exit), config.poll()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    warn!(pid, error = %e, "failed to start watcher for current process");
                    None
                }
            };

        Self {
            pid,
            exit,
            watcher,
            stdin: None,
            stdout: None,
            stderr: None,
            config,
        }
    }

    /// Process id; `0` for a default handle.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Block until the exit status is published, then return `self` for
    /// chaining (`process.wait().exit_code()`).
    ///
    /// There is no timeout: if the process never exits, this never returns.
    /// The same holds for the current-process handle and a default handle.
    /// Several threads may wait on one handle at once.
    pub fn wait(&self) -> &Self {
        let status = self.exit.wait();
        trace!(pid = self.pid, %status, "wait returned");
        self
    }

    /// Like [`Process::wait`], but give up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ExitStatus> {
        self.exit.wait_timeout(timeout)
    }

    /// Published exit status, if the process has terminated.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit.get()
    }

    /// Exit code, if the process has terminated normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit.get().and_then(ExitStatus::code)
    }

    /// Write all of `data` to the child's stdin.
    ///
    /// Blocks while the pipe is full. Fails with a broken-pipe I/O error if
    /// the child has closed its end.
    pub fn write_stdin(&mut self, data: &[u8]) -> Result<()> {
        let chunk_size = self.config.io_chunk_size();
        let stdin = self
            .stdin
            .as_mut()
            .ok_or(ChildpipeError::PipeClosed("stdin"))?;

        write_chunked(stdin, data, chunk_size)?;
        trace!(pid = self.pid, bytes = data.len(), "wrote to stdin");
        Ok(())
    }

    /// Close the child's stdin so it sees end-of-input. Idempotent.
    pub fn close_stdin(&mut self) {
        if self.stdin.take().is_some() {
            debug!(pid = self.pid, "closed stdin pipe");
        }
    }

    /// Read the child's stdout until the child closes it.
    ///
    /// Blocks while the child is running and has not closed stdout. A
    /// second call returns only what was written since (usually nothing).
    pub fn read_stdout(&mut self) -> Result<Vec<u8>> {
        let chunk_size = self.config.io_chunk_size();
        let bytes = read_pipe(self.stdout.as_mut(), chunk_size)?;
        trace!(pid = self.pid, bytes = bytes.len(), "read stdout");
        Ok(bytes)
    }

    /// Read the child's stderr until the child closes it.
    pub fn read_stderr(&mut self) -> Result<Vec<u8>> {
        let chunk_size = self.config.io_chunk_size();
        let bytes = read_pipe(self.stderr.as_mut(), chunk_size)?;
        trace!(pid = self.pid, bytes = bytes.len(), "read stderr");
        Ok(bytes)
    }

    /// Drain stdout and stderr at the same time.
    ///
    /// Reading them one after the other can deadlock when the child fills
    /// the pipe that is not being read; here stderr is read on a scoped
    /// helper thread while stdout is read on the caller's thread. Stdin is
    /// left as it is.
    pub fn read_output(&mut self) -> Result<Output> {
        let chunk_size = self.config.io_chunk_size();
        let output = drain(self.stdout.as_mut(), self.stderr.as_mut(), chunk_size)?;

        debug!(
            pid = self.pid,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "collected process output"
        );
        Ok(output)
    }

    /// Feed `input` to stdin, close it, and collect stdout and stderr until
    /// the child closes them.
    ///
    /// The write runs on its own scoped thread alongside the two reads, so
    /// inputs and outputs larger than the pipe buffers cannot deadlock. If
    /// the child exits without consuming all of `input`, the rest is
    /// dropped. Does not wait for the exit status; chain [`Process::wait`]
    /// for that.
    pub fn communicate(&mut self, input: &[u8]) -> Result<Output> {
        let chunk_size = self.config.io_chunk_size();
        let pid = self.pid;

        let stdin = match self.stdin.take() {
            Some(stdin) => Some(stdin),
            None if input.is_empty() => None,
            None => return Err(ChildpipeError::PipeClosed("stdin")),
        };
        let stdout_pipe = self.stdout.as_mut();
        let stderr_pipe = self.stderr.as_mut();

        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || feed_stdin(pid, stdin, input, chunk_size));
            let output = drain(stdout_pipe, stderr_pipe, chunk_size);
            writer
                .join()
                .map_err(|_| ChildpipeError::Other(anyhow!("stdin writer thread panicked")))??;
            output
        })?;

        debug!(
            pid,
            stdin_bytes = input.len(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "communicated with process"
        );
        Ok(output)
    }

    #[cfg(feature = "test-support")]
    pub(crate) fn stdin_pipe(&mut self) -> Option<&mut File> {
        self.stdin.as_mut()
    }

    #[cfg(feature = "test-support")]
    pub(crate) fn stdout_pipe(&mut self) -> Option<&mut File> {
        self.stdout.as_mut()
    }

    #[cfg(feature = "test-support")]
    pub(crate) fn stderr_pipe(&mut self) -> Option<&mut File> {
        self.stderr.as_mut()
    }
}

/// A handle that represents no process: pid `0`, no pipes, no watcher.
impl Default for Process {
    fn default() -> Self {
        Self {
            pid: 0,
            exit: Arc::new(ExitCell::new()),
            watcher: None,
            stdin: None,
            stdout: None,
            stderr: None,
            config: LaunchConfig::default(),
        }
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        // Join the watcher before the pipe fields are dropped.
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
            if self.exit.get().is_none() && self.pid != Native::current_pid() {
                debug!(
                    pid = self.pid,
                    "handle dropped before process exit was observed; status discarded"
                );
            }
        }
    }
}

/// Read both output pipes to EOF, stderr on a scoped helper thread.
fn drain(
    stdout_pipe: Option<&mut File>,
    stderr_pipe: Option<&mut File>,
    chunk_size: usize,
) -> Result<Output> {
    thread::scope(|scope| {
        let stderr_reader = scope.spawn(move || read_pipe(stderr_pipe, chunk_size));
        let stdout = read_pipe(stdout_pipe, chunk_size);
        let stderr = stderr_reader
            .join()
            .map_err(|_| ChildpipeError::Other(anyhow!("stderr reader thread panicked")))?;
        Ok(Output {
            stdout: stdout?,
            stderr: stderr?,
        })
    })
}

/// Write `input` and close the pipe. A child that stops reading early is
/// not an error.
fn feed_stdin(pid: u32, stdin: Option<File>, input: &[u8], chunk_size: usize) -> Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    match write_chunked(&mut stdin, input, chunk_size) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!(pid, "child closed stdin before all input was written");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn read_pipe(pipe: Option<&mut File>, chunk_size: usize) -> Result<Vec<u8>> {
    match pipe {
        Some(pipe) => Ok(read_chunked(pipe, chunk_size)?),
        None => Ok(Vec::new()),
    }
}
