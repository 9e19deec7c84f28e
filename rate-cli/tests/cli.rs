use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

fn effective_tax() -> Command {
    let mut cmd = Command::cargo_bin("effective-tax").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    effective_tax()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_command() {
    effective_tax().assert().failure();
}

#[test]
fn test_compute_inline_flat_tax() {
    effective_tax()
        .args(["compute", "--income", "10000", "--rate", "0=0.13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("effective_rate=0.13\ntax_owed=1300\n"));
}

#[test]
fn test_compute_missing_floor_interpolates_from_zero() {
    effective_tax()
        .args(["compute", "--income", "25", "--rate", "50=0.10", "--rate", "100=0.20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("effective_rate=0.05\ntax_owed=1.25\n"));
}

#[test]
fn test_compute_negative_income() {
    effective_tax()
        .args(["compute", "--income", "-40", "--rate", "0=0", "--rate", "100=0.20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tax_owed=-8\n"));
}

#[test]
fn test_compute_from_config_default_schedule() {
    effective_tax()
        .arg("compute")
        .arg("--income")
        .arg("50")
        .arg("--schedule-file")
        .arg(fixture("rates.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("effective_rate=0.2\ntax_owed=10\n"))
        .stdout(predicate::str::contains("source=top threshold 100"));
}

#[test]
fn test_compute_from_config_named_schedule() {
    effective_tax()
        .arg("compute")
        .arg("--income")
        .arg("200")
        .arg("--schedule-file")
        .arg(fixture("rates.toml"))
        .args(["--schedule", "flat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tax_owed=26\n"));
}

#[test]
fn test_config_boundary_policy_applies() {
    effective_tax()
        .arg("compute")
        .arg("--income")
        .arg("50")
        .arg("--schedule-file")
        .arg(fixture("exact.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("effective_rate=0.1\n"));
}

#[test]
fn test_boundary_flag_overrides_config() {
    effective_tax()
        .arg("compute")
        .arg("--income")
        .arg("50")
        .arg("--schedule-file")
        .arg(fixture("exact.toml"))
        .args(["--boundary", "compatible"])
        .assert()
        .success()
        .stdout(predicate::str::contains("effective_rate=0.2\n"));
}

#[test]
fn test_unknown_schedule_name() {
    effective_tax()
        .arg("show")
        .arg("--schedule-file")
        .arg(fixture("rates.toml"))
        .args(["--schedule", "nordic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Schedule 'nordic' not found"));
}

#[test]
fn test_missing_schedule_file() {
    effective_tax()
        .args(["show", "--schedule-file", "/nonexistent/rates.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schedule file"));
}

#[test]
fn test_compute_overflow_fails_cleanly() {
    effective_tax()
        .args([
            "compute",
            "--income",
            "79228162514264337593543950335",
            "--rate",
            "0=2",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to compute tax for income"))
        .stderr(predicate::str::contains("arithmetic overflow"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_no_schedule_given() {
    effective_tax()
        .args(["compute", "--income", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rate schedule given"));
}

#[test]
fn test_invalid_rate_point() {
    effective_tax()
        .args(["compute", "--income", "50", "--rate", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected THRESHOLD=RATE"));
}

#[test]
fn test_invalid_boundary_policy() {
    effective_tax()
        .args(["compute", "--income", "50", "--rate", "0=0.1", "--boundary", "nearest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown boundary policy 'nearest'"));
}

#[test]
fn test_batch_to_stdout() {
    effective_tax()
        .arg("batch")
        .arg("--incomes")
        .arg(fixture("incomes.csv"))
        .arg("--schedule-file")
        .arg(fixture("rates.toml"))
        .assert()
        .success()
        .stdout(
            "id,income,effective_rate,tax_owed\n\
             a,25,0.05,1.25\n\
             b,50,0.2,10\n\
             c,75,0.15,11.25\n\
             d,150,0.2,30\n",
        );
}

#[test]
fn test_batch_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");

    effective_tax()
        .arg("batch")
        .arg("--incomes")
        .arg(fixture("incomes.csv"))
        .args(["--rate", "0=0.13"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("id,income,effective_rate,tax_owed\n"));
    assert!(written.contains("d,150,0.13,19.5\n"));
}

#[test]
fn test_show_schedule() {
    effective_tax()
        .args(["show", "--rate", "100=0.20", "--rate", "50=0.10"])
        .assert()
        .success()
        .stdout(
            "boundary_policy=compatible\n\
             threshold=0 rate=0\n\
             threshold=50 rate=0.1\n\
             threshold=100 rate=0.2\n",
        );
}

#[test]
fn test_log_file_receives_debug_output() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("effective-tax.log");

    effective_tax()
        .args(["-vv", "compute", "--income", "50", "--rate", "0=0", "--rate", "100=0.2"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("interpolated effective rate"));
}
