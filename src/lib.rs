// src/lib.rs

//! Spawn a child program, talk to it over pipes, and learn its exit status.
//!
//! The entry point is [`Process`]: [`Process::create`] launches an
//! [`Executable`] with its stdin, stdout and stderr connected to pipes, and a
//! background watcher publishes the exit status as soon as the child
//! terminates.
//!
//! ```rust,no_run
//! use childpipe::{Executable, Process};
//!
//! let exe = Executable::new("/bin/sh").arg("-c").arg("exit 3");
//! let process = Process::create(&exe)?;
//! assert_eq!(process.wait().exit_code(), Some(3));
//! # Ok::<(), childpipe::errors::ChildpipeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod process;
#[cfg(feature = "test-support")]
pub mod test_support;
pub mod types;
pub mod watch;

pub use config::LaunchConfig;
pub use errors::{ChildpipeError, Result};
pub use exec::Executable;
pub use process::Process;
pub use types::{ExitStatus, Output};

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, anyhow};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;

/// Exit code used when `--timeout` expires, as `timeout(1)` does.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - descriptor construction (`--env`, `--inherit-env`, `--find-in`)
/// - launching, feeding stdin and collecting output on a blocking thread
/// - an optional timeout around all of it
///
/// Returns the exit code the binary should exit with.
pub async fn run(args: CliArgs) -> anyhow::Result<i32> {
    let config = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading launch config from {}", path.display()))?,
        None => LaunchConfig::default(),
    };

    let executable = build_executable(&args)?;

    let input = if args.feed_stdin {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin to forward to the child")?;
        buf
    } else {
        Vec::new()
    };

    info!(path = ?executable.path, args = ?executable.arguments, "launching program");

    let job = tokio::task::spawn_blocking(move || run_to_completion(&executable, config, &input));

    let joined = match args.timeout {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), job).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(timeout_secs = secs, "timed out waiting for the child; leaving it running");
                return Ok(TIMEOUT_EXIT_CODE);
            }
        },
        None => job.await,
    };

    let (status, output) = joined.context("child supervision task failed")??;

    relay_output(&output)?;

    if status.success() {
        debug!(%status, "child finished");
    } else {
        info!(%status, "child finished unsuccessfully");
    }
    Ok(exit_code_for(status))
}

/// Build the descriptor from the command line.
pub fn build_executable(args: &CliArgs) -> anyhow::Result<Executable> {
    let base = match &args.find_in {
        Some(dir) => Executable::find_in(&args.program, dir).ok_or_else(|| {
            anyhow!(
                "no file named '{}' in directory {}",
                args.program,
                dir.display()
            )
        })?,
        None => Executable::new(&args.program),
    };

    let mut executable = base.args(args.args.iter().cloned());
    if args.inherit_env {
        executable = executable.envs(inherited_env());
    }
    Ok(executable.envs(args.env.iter().cloned()))
}

/// This process's environment, minus entries that are not valid UTF-8.
fn inherited_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let key = key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
                warn!(%key, "skipping environment variable that is not valid UTF-8");
                None
            }
        })
        .collect()
}

/// Map a child's status to this process's exit code: the code itself, or
/// `128 + signal` like a POSIX shell.
pub fn exit_code_for(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

fn run_to_completion(
    executable: &Executable,
    config: LaunchConfig,
    input: &[u8],
) -> anyhow::Result<(ExitStatus, Output)> {
    let mut process = Process::create_with(executable, config)
        .with_context(|| format!("launching {}", executable.path.display()))?;

    let output = process
        .communicate(input)
        .with_context(|| format!("exchanging data with pid {}", process.pid()))?;

    let status = process
        .wait()
        .exit_status()
        .ok_or_else(|| anyhow!("exit status missing after wait"))?;

    Ok((status, output))
}

fn relay_output(output: &Output) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output.stdout)
        .and_then(|()| stdout.flush())
        .context("relaying child stdout")?;

    let mut stderr = std::io::stderr().lock();
    stderr
        .write_all(&output.stderr)
        .and_then(|()| stderr.flush())
        .context("relaying child stderr")?;

    Ok(())
}
