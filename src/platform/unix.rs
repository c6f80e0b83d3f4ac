// src/platform/unix.rs

//! Unix process launch and exit polling with `nix`.
//!
//! ## Child-side critical section
//!
//! Between `fork` and `execve` the child runs in a copy of a possibly
//! multi-threaded parent. Another thread may have held the allocator lock at
//! the moment of the fork, so the child must not allocate, must not touch
//! shared Rust state and must not unwind. [`exec_child`] therefore only:
//!
//! 1. restores the default `SIGPIPE` disposition, which the Rust runtime
//!    sets to ignored and `execve` would otherwise pass on;
//! 2. `dup2`s the three prepared pipe ends onto fds 0, 1 and 2;
//! 3. calls `execve` with `argv` / `envp` built before the fork;
//! 4. on failure, `_exit`s with the raw OS error code.
//!
//! Every pipe end is close-on-exec, so once `execve` succeeds the child
//! holds nothing but its three standard streams. The child-side ends are
//! moved above fd 2 in the parent, so no `dup2` can overwrite a source that
//! is still needed.

// Process creation requires raw fork/exec calls.
#![allow(unsafe_code)]

use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, fcntl};
use nix::libc;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, getpid};
use tracing::{debug, trace};

use crate::errors::Result;
use crate::exec::{Executable, Marshaled, marshal};
use crate::platform::{Launched, Platform};
use crate::types::ExitStatus;
use crate::watch::ExitProbe;

/// Unix implementation of [`Platform`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unix;

impl Platform for Unix {
    type Probe = WaitpidProbe;

    fn launch(executable: &Executable) -> Result<Launched> {
        launch(executable)
    }

    fn reap(pid: u32) {
        let Ok(raw) = i32::try_from(pid) else {
            return;
        };
        loop {
            match waitpid(Pid::from_raw(raw), None) {
                Err(Errno::EINTR) => continue,
                Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    }

    fn current_pid() -> u32 {
        getpid().as_raw().unsigned_abs()
    }

    fn name() -> &'static str {
        "unix"
    }
}

/// Parent and child ends of one standard stream.
struct PipePair {
    parent: OwnedFd,
    child: OwnedFd,
}

impl PipePair {
    /// Pipe the child reads from (its stdin).
    fn to_child() -> Result<Self> {
        let (read, write) = cloexec_pipe()?;
        Ok(Self {
            parent: write,
            child: above_stdio(read)?,
        })
    }

    /// Pipe the child writes into (its stdout or stderr).
    fn from_child() -> Result<Self> {
        let (read, write) = cloexec_pipe()?;
        Ok(Self {
            parent: read,
            child: above_stdio(write)?,
        })
    }
}

fn launch(executable: &Executable) -> Result<Launched> {
    let stdin = PipePair::to_child()?;
    let stdout = PipePair::from_child()?;
    let stderr = PipePair::from_child()?;

    // Everything the child needs is allocated here, before the fork.
    let marshaled = marshal(executable);
    let child_fds = [
        stdin.child.as_raw_fd(),
        stdout.child.as_raw_fd(),
        stderr.child.as_raw_fd(),
    ];

    debug!(
        path = ?executable.path,
        args = ?executable.arguments,
        env_vars = executable.environment.len(),
        "forking child process"
    );

    // SAFETY: the child branch only calls `exec_child`, which performs
    // async-signal-safe libc calls on data prepared above and never returns.
    match unsafe { fork() }? {
        ForkResult::Child => exec_child(&marshaled, child_fds),
        ForkResult::Parent { child } => {
            // Close our copies of the child's ends so EOF propagates.
            drop(stdin.child);
            drop(stdout.child);
            drop(stderr.child);

            let pid = child.as_raw().unsigned_abs();
            debug!(pid, path = ?executable.path, "child process forked");

            Ok(Launched {
                pid,
                stdin: File::from(stdin.parent),
                stdout: File::from(stdout.parent),
                stderr: File::from(stderr.parent),
            })
        }
    }
}

/// Runs in the forked child. See the module docs for what is allowed here.
fn exec_child(marshaled: &Marshaled, fds: [RawFd; 3]) -> ! {
    // SAFETY: `signal` is async-signal-safe.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    for (target, fd) in (0..).zip(fds) {
        // SAFETY: plain syscall on descriptors owned by this process.
        if unsafe { libc::dup2(fd, target) } < 0 {
            exit_with_last_os_error();
        }
    }

    // SAFETY: all three pointers reference NUL-terminated data (and
    // null-terminated pointer arrays) kept alive by `marshaled`.
    unsafe {
        libc::execve(
            marshaled.program().as_ptr(),
            marshaled.argv.as_ptr(),
            marshaled.envp.as_ptr(),
        );
    }

    exit_with_last_os_error()
}

fn exit_with_last_os_error() -> ! {
    let code = io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::EXIT_FAILURE);
    // SAFETY: `_exit` skips atexit handlers and stdio flushing, which the
    // parent's copied state must not run twice.
    unsafe { libc::_exit(code) }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::OFlag;
    Ok(nix::unistd::pipe2(OFlag::O_CLOEXEC)?)
}

// No pipe2 here: set the flag right after creation.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::FdFlag;
    let (read, write) = nix::unistd::pipe()?;
    fcntl(read.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    fcntl(write.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok((read, write))
}

/// Ensure `fd` does not occupy 0, 1 or 2, duplicating it upwards if it does.
///
/// This only happens when the caller runs with some standard streams closed.
fn above_stdio(fd: OwnedFd) -> Result<OwnedFd> {
    if fd.as_raw_fd() > libc::STDERR_FILENO {
        return Ok(fd);
    }
    let raw = fcntl(fd.as_raw_fd(), FcntlArg::F_DUPFD_CLOEXEC(libc::STDERR_FILENO + 1))?;
    // SAFETY: `raw` is a fresh descriptor returned by F_DUPFD_CLOEXEC that
    // nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

/// [`ExitProbe`] backed by `waitpid(pid, WNOHANG)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitpidProbe;

impl ExitProbe for WaitpidProbe {
    fn poll_exit(&mut self, pid: u32) -> Result<Option<ExitStatus>> {
        let raw = i32::try_from(pid).map_err(|_| Errno::ESRCH)?;

        match waitpid(Pid::from_raw(raw), Some(WaitPidFlag::WNOHANG))? {
            WaitStatus::StillAlive => Ok(None),
            WaitStatus::Exited(_, code) => Ok(Some(ExitStatus::Exited(code))),
            WaitStatus::Signaled(_, signal, _) => Ok(Some(ExitStatus::Signaled(signal as i32))),
            other => {
                trace!(pid, status = ?other, "ignoring non-terminal wait status");
                Ok(None)
            }
        }
    }
}
