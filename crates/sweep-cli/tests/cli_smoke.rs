use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const DEMO: &str = r#"
map: empty-8-8
cache: [a, b]
ngoals: [5]
goals_k: 2
goals_m: 1
nagents: [4, 8]
"#;

fn lacam_sweep(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lacam-sweep"))
        .current_dir(dir)
        .env("RUST_LOG", "info")
        .args(args)
        .output()
        .expect("run lacam-sweep")
}

fn setup() -> tempfile::TempDir {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("experiment")).expect("experiment dir");
    fs::write(dir.path().join("experiment/demo.yaml"), DEMO).expect("write demo");
    dir
}

#[test]
fn dry_run_lists_every_command() {
    let dir = setup();
    let output = lacam_sweep(dir.path(), &["demo", "--dry-run"]);
    assert!(output.status.success());
    let logs = String::from_utf8_lossy(&output.stdout);
    let commands: Vec<_> = logs
        .lines()
        .filter(|line| line.contains("Dry run command:"))
        .collect();
    assert_eq!(commands.len(), 4);
    assert!(commands[0].ends_with(
        "./build/main --map empty-8-8 --cache a --ngoals 5 --goals-k 2 --goals-m 1 \
         --nagents 4 --seed 0 --time_limit_sec 10 \
         --output_step_result ./result/step_result.txt \
         --output_csv_result ./result/result.csv"
    ));
}

#[test]
fn unknown_experiment_exits_non_zero() {
    let dir = setup();
    let output = lacam_sweep(dir.path(), &["absent", "--dry-run"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn failed_combinations_do_not_change_exit_status() {
    let dir = setup();
    let output = lacam_sweep(dir.path(), &["demo", "--program", "./does-not-exist"]);
    assert!(output.status.success());
    let logs = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        logs.lines()
            .filter(|line| line.contains("Experiment failed with error"))
            .count(),
        4
    );
}

#[test]
fn fail_on_error_propagates_failures() {
    let dir = setup();
    let output = lacam_sweep(
        dir.path(),
        &["demo", "--program", "./does-not-exist", "--fail-on-error"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn report_flag_writes_json_summary() {
    let dir = setup();
    let output = lacam_sweep(
        dir.path(),
        &["demo", "--dry-run", "--only", "1", "--report", "out/report.json"],
    );
    assert!(output.status.success());
    let bytes = fs::read(dir.path().join("out/report.json")).expect("report");
    let report: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(report["total"], 1);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["jobs"][0]["index"], 1);
    assert_eq!(report["jobs"][0]["params"]["nagents"], 8);
}
