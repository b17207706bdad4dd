#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sweep_core::{ParamValue, ParameterSpec, SweepError};
use sweep_exp::{
    drive, CommandBuilder, DriveOptions, Harness, InvocationCommand, Invoker, ProcessInvoker,
};
use tempfile::tempdir;

/// Writes a stub solver that appends its arguments to `calls.log` and exits
/// with status 7 whenever it is asked to run 8 agents.
fn write_stub(dir: &Path) -> PathBuf {
    let path = dir.join("stub.sh");
    let script = r#"#!/bin/sh
echo "$@" >> calls.log
for arg in "$@"; do
  if [ "$prev" = "--nagents" ] && [ "$arg" = "8" ]; then
    exit 7
  fi
  prev="$arg"
done
exit 0
"#;
    fs::write(&path, script).expect("write stub");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn command(program: &Path, args: &[&str]) -> InvocationCommand {
    InvocationCommand {
        program: program.display().to_string(),
        args: args.iter().map(|arg| arg.to_string()).collect(),
    }
}

#[test]
fn zero_exit_is_success() {
    let dir = tempdir().expect("tempdir");
    let stub = write_stub(dir.path());
    let mut invoker = ProcessInvoker::new().with_current_dir(dir.path());
    invoker
        .invoke(&command(&stub, &["--nagents", "4"]))
        .expect("stub succeeds");
    let log = fs::read_to_string(dir.path().join("calls.log")).expect("log");
    assert_eq!(log, "--nagents 4\n");
}

#[test]
fn non_zero_exit_carries_status_and_command() {
    let dir = tempdir().expect("tempdir");
    let stub = write_stub(dir.path());
    let mut invoker = ProcessInvoker::new().with_current_dir(dir.path());
    let err = invoker
        .invoke(&command(&stub, &["--nagents", "8"]))
        .unwrap_err();
    assert!(matches!(err, SweepError::ExternalInvocationFailed(_)));
    assert_eq!(err.info().code, "invoke-exit-status");
    assert_eq!(err.info().context.get("status").map(String::as_str), Some("7"));
    assert!(err.info().context["command"].ends_with("--nagents 8"));
}

#[test]
fn missing_program_is_a_spawn_failure() {
    let dir = tempdir().expect("tempdir");
    let mut invoker = ProcessInvoker::new();
    let err = invoker
        .invoke(&command(&dir.path().join("does-not-exist"), &[]))
        .unwrap_err();
    assert!(matches!(err, SweepError::ExternalInvocationFailed(_)));
    assert_eq!(err.info().code, "invoke-spawn");
    assert!(err.info().hint.is_some());
}

#[test]
fn sweep_continues_past_failing_process() {
    let dir = tempdir().expect("tempdir");
    let stub = write_stub(dir.path());
    let spec = ParameterSpec::try_from_entries([
        ("map", ParamValue::from("empty-8-8")),
        ("cache", ParamValue::from("LRU")),
        ("ngoals", ParamValue::from(5i64)),
        ("goals_k", ParamValue::from(2i64)),
        ("goals_m", ParamValue::from(1i64)),
        ("nagents", ParamValue::list([8i64, 4, 8, 2])),
    ])
    .expect("spec");
    let mut harness = Harness::new(
        CommandBuilder::new(stub.display().to_string()),
        ProcessInvoker::new().with_current_dir(dir.path()),
        false,
    );
    let report = drive(&spec, &mut harness, &DriveOptions::default()).expect("sweep");
    assert_eq!(report.total, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeeded, 2);
    let log = fs::read_to_string(dir.path().join("calls.log")).expect("log");
    assert_eq!(log.lines().count(), 4);
}
