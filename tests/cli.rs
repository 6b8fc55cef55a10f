//! CLI smoke tests; network-free commands only.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pdfetch() -> Command {
    Command::cargo_bin("pdfetch").unwrap()
}

#[test]
fn check_reports_missing_reprint_with_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    pdfetch()
        .args(["check", "12345678", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not stored"));
}

#[test]
fn check_finds_stored_reprint() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("12345678.pdf"), b"%PDF-1.4 body").unwrap();
    pdfetch()
        .args(["check", "12345678", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("12345678.pdf"));
}

#[test]
fn list_json_on_empty_store_is_empty_array() {
    let dir = TempDir::new().unwrap();
    pdfetch()
        .args(["list", "--json", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn list_shows_stored_identifiers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("12345678.pdf"), b"%PDF-1.4 body").unwrap();
    pdfetch()
        .args(["list", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("12345678"));
}

#[test]
fn remove_deletes_stored_reprint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("12345678.pdf");
    std::fs::write(&path, b"%PDF-1.4 body").unwrap();
    pdfetch()
        .args(["remove", "12345678", "--dir"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(!path.exists());
}

#[test]
fn fetch_without_ids_is_a_usage_error() {
    pdfetch().arg("fetch").assert().failure().code(2);
}

#[test]
fn fetch_rejects_url_with_multiple_ids() {
    let dir = TempDir::new().unwrap();
    pdfetch()
        .args([
            "fetch",
            "11111111",
            "22222222",
            "--url",
            "https://journal.example.com/article",
            "--dir",
        ])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one identifier"));
}

#[test]
fn invalid_identifier_is_rejected_before_any_work() {
    let dir = TempDir::new().unwrap();
    pdfetch()
        .args(["check", "not-an-id", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized identifier"));
}
