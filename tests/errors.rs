#![cfg(unix)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("labtest").unwrap() }

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

#[test]
fn missing_directory_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg("-d").arg(tmp.path().join("nowhere"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist").and(predicate::str::contains("-h")));
}

#[test]
fn directory_that_is_a_file_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "file.txt", "");
    cargo_bin()
        .arg("-d").arg(tmp.path().join("file.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is a file"));
}

#[test]
fn missing_program_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "t.in", "");
    write(tmp.path(), "t.out", "");
    cargo_bin()
        .arg("-d").arg(tmp.path())
        .arg("-f").arg(tmp.path().join("lab99.py"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("lab99.py").and(predicate::str::contains("does not exist")));
}

#[test]
fn no_lab_program_found_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "t.in", "");
    write(tmp.path(), "t.out", "");
    cargo_bin()
        .arg("-d").arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no lab program"));
}

#[test]
fn path_errors_are_silent_in_silent_mode() {
    let tmp = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg("-d").arg(tmp.path().join("nowhere"))
        .arg("-x")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn empty_suite_exits_one_for_every_mode() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "lab01.sh", "cat\n");

    cargo_bin()
        .arg("-d").arg(tmp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No tests were run").and(predicate::str::contains("Summary").not()));

    for flag in ["-q", "-s", "-v"] {
        cargo_bin()
            .arg("-d").arg(tmp.path())
            .arg(flag)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("No tests were run"));
    }

    cargo_bin()
        .arg("-d").arg(tmp.path())
        .arg("-x")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn crashing_program_fails_its_test_and_the_run_continues() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "lab01.sh",
        "read x\nif [ \"$x\" = boom ]; then echo exploded >&2; exit 7; fi\necho \"$x\"\n",
    );
    write(tmp.path(), "a.in", "boom\n");
    write(tmp.path(), "a.out", "boom\n");
    write(tmp.path(), "b.in", "fine\n");
    write(tmp.path(), "b.out", "fine\n");

    cargo_bin()
        .arg("-d").arg(tmp.path())
        .arg("-v")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Test 01 (a): execution error: program exited with status 7")
            .and(predicate::str::contains(">>> Program stderr:\nexploded\n"))
            .and(predicate::str::contains("Test 02 (b): correct result"))
            .and(predicate::str::contains("|      1       1      2")));
}

#[test]
fn timeout_flag_fails_a_hanging_program() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "lab01.sh", "exec sleep 10\n");
    write(tmp.path(), "t.in", "");
    write(tmp.path(), "t.out", "");

    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("-d").arg(tmp.path())
        .arg("--timeout").arg("100")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("did not finish within 100 ms"));
}

#[test]
fn timeout_falls_back_to_environment() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "lab01.sh", "exec sleep 10\n");
    write(tmp.path(), "t.in", "");
    write(tmp.path(), "t.out", "");

    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env("LABTEST_TIMEOUT_MS", "100")
        .arg("-d").arg(tmp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("did not finish within 100 ms"));
}

#[test]
fn unknown_convention_is_rejected() {
    cargo_bin()
        .args(["--convention", "random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("random"));
}
