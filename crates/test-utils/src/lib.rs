pub mod builders;
pub mod fake_probe;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=childpipe=trace cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run the blocking closure `f` with a 10-second timeout.
///
/// Blocking calls such as `Process::wait` have no timeout of their own; this
/// keeps a broken test from hanging the whole suite. `f` runs on Tokio's
/// blocking pool under a private current-thread runtime, so plain `#[test]`
/// functions can use it.
pub fn with_timeout<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to build test runtime");

    let outcome = runtime.block_on(async move {
        tokio::time::timeout(TEST_TIMEOUT, tokio::task::spawn_blocking(f)).await
    });

    // Do not wait for a closure that is still stuck.
    runtime.shutdown_background();

    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(join_err)) if join_err.is_panic() => {
            std::panic::resume_unwind(join_err.into_panic())
        }
        Ok(Err(join_err)) => panic!("Test body did not complete: {join_err}"),
        Err(_) => panic!("Test timed out after {} seconds", TEST_TIMEOUT.as_secs()),
    }
}
