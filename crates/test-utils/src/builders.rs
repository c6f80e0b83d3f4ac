#![allow(dead_code)]

//! Ready-made descriptors for child processes used across the test suite.
//!
//! Everything runs through `/bin/sh -c`, which every POSIX system provides,
//! so tests do not depend on a helper binary being built first.

use std::path::Path;

use childpipe::Executable;

pub const SHELL: &str = "/bin/sh";

/// `/bin/sh -c <script>` with an empty environment.
pub fn sh(script: &str) -> Executable {
    Executable::new(SHELL).arg("-c").arg(script)
}

/// A child that exits with `code` without producing output.
pub fn exit_with(code: u8) -> Executable {
    sh(&format!("exit {code}"))
}

/// A child that prints `arg` to stdout, `arg` twice to stderr, and exits
/// with `arg` as its exit code.
pub fn print_and_exit(arg: u8) -> Executable {
    sh(r#"printf '%s' "$1"; printf '%s%s' "$1" "$1" >&2; exit "$1""#)
        .arg("print_and_exit")
        .arg(arg.to_string())
}

/// A child that reads one line from stdin, prints it (without the line
/// ending) to stdout once and to stderr twice, then exits with 64.
pub fn echo_line() -> Executable {
    sh(concat!(
        "IFS= read -r line; ",
        r#"printf '%s' "$line"; printf '%s%s' "$line" "$line" >&2; exit 64"#,
    ))
}

/// A child that copies stdin to stdout unchanged.
pub fn cat() -> Executable {
    sh("exec cat").env("PATH", "/usr/bin:/bin")
}

/// A child that first spools all of stdin into the file at `spool`, then
/// copies it to both stdout and stderr.
///
/// Spooling lets a test finish a large `write_stdin` before it starts
/// reading, without the child stalling on full output pipes.
pub fn spool_then_tee(spool: &Path) -> Executable {
    sh(r#"cat > "$1" && exec tee /dev/stderr < "$1""#)
        .arg("spool_then_tee")
        .arg(spool.to_string_lossy())
        .env("PATH", "/usr/bin:/bin")
}

/// A child that counts the bytes on stdin and prints the number.
pub fn count_bytes() -> Executable {
    sh("exec wc -c").env("PATH", "/usr/bin:/bin")
}

/// A child that sleeps for `secs` seconds, then exits with `code`.
pub fn sleep_then_exit(secs: f32, code: u8) -> Executable {
    sh(&format!("sleep {secs}; exit {code}")).env("PATH", "/usr/bin:/bin")
}

/// A child that writes `bytes` bytes to stdout and the same amount to
/// stderr, both larger than a pipe buffer when `bytes` is big.
pub fn flood_both(bytes: usize) -> Executable {
    sh(&format!(
        "head -c {bytes} /dev/zero; head -c {bytes} /dev/zero >&2"
    ))
    .env("PATH", "/usr/bin:/bin")
}
