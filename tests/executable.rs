// tests/executable.rs

mod common;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use childpipe::{Executable, Process};
use tempfile::tempdir;

#[test]
fn builder_collects_arguments_and_environment() {
    let exe = Executable::new("/bin/sh")
        .arg("-c")
        .args(["exit 0", "name"])
        .env("A", "1")
        .envs([("B", "2"), ("A", "3")]);

    assert_eq!(exe.path, std::path::PathBuf::from("/bin/sh"));
    assert_eq!(exe.arguments, vec!["-c", "exit 0", "name"]);
    assert_eq!(
        exe.environment,
        BTreeMap::from([("A".to_string(), "3".to_string()), ("B".to_string(), "2".to_string())])
    );
}

#[test]
fn default_descriptor_is_empty() {
    let exe = Executable::default();
    assert!(exe.path.as_os_str().is_empty());
    assert!(exe.arguments.is_empty());
    assert!(exe.environment.is_empty());
}

#[test]
fn find_in_returns_path_inside_directory() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::write(dir.path().join("tool"), "#!/bin/sh\n")?;
    fs::write(dir.path().join("other"), "")?;

    let found = Executable::find_in("tool", dir.path()).ok_or("tool not found")?;
    assert_eq!(found.path, dir.path().join("tool"));
    assert!(found.arguments.is_empty());
    assert!(found.environment.is_empty());
    Ok(())
}

#[test]
fn find_in_misses_are_none() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir(dir.path().join("nested"))?;
    fs::write(dir.path().join("nested").join("deep"), "")?;

    assert_eq!(Executable::find_in("absent", dir.path()), None);
    assert_eq!(Executable::find_in("deep", dir.path()), None);
    assert_eq!(Executable::find_in("tool", dir.path().join("no-such-dir")), None);
    Ok(())
}

#[test]
fn found_script_can_be_launched() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let script = dir.path().join("answer");
    fs::write(&script, "#!/bin/sh\nprintf '%s' \"$1\"\nexit 42\n")?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

    let exe = Executable::find_in("answer", dir.path())
        .ok_or("script not found")?
        .arg("forty-two");
    let mut process = Process::create(&exe)?;

    let (stdout, code) = with_timeout(move || -> childpipe::Result<_> {
        let stdout = process.read_stdout()?;
        Ok((stdout, process.wait().exit_code()))
    })?;

    assert_eq!(stdout, b"forty-two");
    assert_eq!(code, Some(42));
    Ok(())
}
