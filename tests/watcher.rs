// tests/watcher.rs

mod common;
use crate::common::fake_probe::FakeProbe;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use childpipe::config::PollConfig;
use childpipe::watch::{ExitCell, Watcher};
use childpipe::ExitStatus;

fn fast_poll() -> PollConfig {
    PollConfig {
        initial_interval: Duration::from_micros(100),
        max_interval: Duration::from_millis(1),
    }
}

#[test]
fn watcher_publishes_once_and_finishes() -> TestResult {
    init_tracing();

    let probe = FakeProbe::exits_after(3, ExitStatus::Exited(11));
    let polls = probe.poll_counter();
    let cell = Arc::new(ExitCell::new());

    let watcher = Watcher::spawn(4242, probe, Arc::clone(&cell), fast_poll())?;

    let status = with_timeout({
        let cell = Arc::clone(&cell);
        move || cell.wait()
    });
    assert_eq!(status, ExitStatus::Exited(11));

    while !watcher.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(polls.load(Ordering::SeqCst), 4);
    assert_eq!(cell.get(), Some(ExitStatus::Exited(11)));
    Ok(())
}

#[test]
fn poll_errors_are_retried() -> TestResult {
    init_tracing();

    let probe = FakeProbe::exits_immediately(ExitStatus::Signaled(15)).failing_first(5);
    let polls = probe.poll_counter();
    let cell = Arc::new(ExitCell::new());

    let _watcher = Watcher::spawn(1, probe, Arc::clone(&cell), fast_poll())?;

    let status = with_timeout({
        let cell = Arc::clone(&cell);
        move || cell.wait()
    });
    assert_eq!(status, ExitStatus::Signaled(15));
    assert_eq!(polls.load(Ordering::SeqCst), 6);
    Ok(())
}

#[test]
fn stopping_before_exit_leaves_cell_empty() -> TestResult {
    init_tracing();

    let probe = FakeProbe::never_exits();
    let polls = probe.poll_counter();
    let cell = Arc::new(ExitCell::new());

    // A long interval: stop must still return at once thanks to unpark.
    let poll = PollConfig {
        initial_interval: Duration::from_secs(30),
        max_interval: Duration::from_secs(30),
    };
    let mut watcher = Watcher::spawn(7, probe, Arc::clone(&cell), poll)?;

    while polls.load(Ordering::SeqCst) == 0 {
        thread::sleep(Duration::from_millis(1));
    }

    let watcher = with_timeout(move || {
        watcher.stop();
        watcher.stop();
        watcher
    });

    assert!(watcher.is_finished());
    assert_eq!(cell.get(), None);
    assert_eq!(cell.wait_timeout(Duration::from_millis(10)), None);
    Ok(())
}

#[test]
fn cell_keeps_the_first_published_status() {
    init_tracing();

    let cell = ExitCell::new();
    assert_eq!(cell.get(), None);
    assert!(cell.publish(ExitStatus::Exited(1)));
    assert!(!cell.publish(ExitStatus::Exited(2)));
    assert_eq!(cell.get(), Some(ExitStatus::Exited(1)));
    assert_eq!(cell.wait(), ExitStatus::Exited(1));
    assert_eq!(
        cell.wait_timeout(Duration::ZERO),
        Some(ExitStatus::Exited(1))
    );
}

#[test]
fn cell_wakes_every_waiter() {
    init_tracing();

    let cell = Arc::new(ExitCell::new());

    let statuses = with_timeout({
        let cell = Arc::clone(&cell);
        move || {
            thread::scope(|scope| {
                let waiters: Vec<_> = (0..4).map(|_| scope.spawn(|| cell.wait())).collect();
                thread::sleep(Duration::from_millis(20));
                cell.publish(ExitStatus::Exited(0));
                waiters
                    .into_iter()
                    .filter_map(|w| w.join().ok())
                    .collect::<Vec<_>>()
            })
        }
    });

    assert_eq!(statuses, vec![ExitStatus::Exited(0); 4]);
}

#[test]
fn backoff_doubles_up_to_the_maximum() {
    let poll = PollConfig {
        initial_interval: Duration::from_micros(50),
        max_interval: Duration::from_micros(300),
    };

    let mut interval = poll.initial_interval;
    let mut seen = vec![interval];
    for _ in 0..4 {
        interval = poll.next_interval(interval);
        seen.push(interval);
    }

    let micros: Vec<u128> = seen.iter().map(Duration::as_micros).collect();
    assert_eq!(micros, vec![50, 100, 200, 300, 300]);
}
