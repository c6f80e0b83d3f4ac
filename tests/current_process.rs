// tests/current_process.rs

mod common;
use crate::common::{TestResult, init_tracing};

use std::time::Duration;

use childpipe::errors::ChildpipeError;
use childpipe::{LaunchConfig, Output, Process};

#[test]
fn current_handle_reports_own_pid_and_no_exit() {
    init_tracing();

    let process = Process::current();
    assert_eq!(process.pid(), std::process::id());
    assert_eq!(process.exit_code(), None);
    assert_eq!(process.wait_timeout(Duration::from_millis(20)), None);
    assert_eq!(process.exit_status(), None);
}

#[test]
fn current_handle_has_no_pipes() -> TestResult {
    init_tracing();

    let mut process = Process::current_with(LaunchConfig::default().with_io_chunk_size(16));
    assert_eq!(process.config().io_chunk_size(), 16);

    assert!(process.read_stdout()?.is_empty());
    assert!(process.read_stderr()?.is_empty());
    assert_eq!(process.read_output()?, Output::default());
    assert!(matches!(
        process.write_stdin(b"x"),
        Err(ChildpipeError::PipeClosed("stdin"))
    ));
    Ok(())
}

#[test]
fn default_handle_is_empty() -> TestResult {
    init_tracing();

    let mut process = Process::default();
    assert_eq!(process.pid(), 0);
    assert_eq!(process.exit_code(), None);
    assert_eq!(process.wait_timeout(Duration::from_millis(10)), None);
    assert!(process.read_stdout()?.is_empty());
    assert_eq!(process.communicate(b"")?, Output::default());
    Ok(())
}

#[test]
fn dropping_current_handle_returns_promptly() {
    init_tracing();

    for _ in 0..8 {
        drop(Process::current());
    }
}
