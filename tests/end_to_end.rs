//! End-to-end runs against a throwaway git repository.
//!
//! These tests drive the real git client; they skip cleanly on machines
//! without one.

use std::path::Path;
use std::process::Command;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=strata-test",
            "-c",
            "user.email=strata-test@example.com",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Two commits: `a.txt` alone, then `a.txt` and `b.txt` together.
fn build_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    std::fs::write(dir.join("a.txt"), "one\n").unwrap();
    git(dir, &["add", "a.txt"]);
    git(dir, &["commit", "-q", "-m", "PROJ-1 add a"]);

    std::fs::write(dir.join("a.txt"), "one\ntwo\n").unwrap();
    std::fs::write(dir.join("b.txt"), "b\n").unwrap();
    git(dir, &["add", "a.txt", "b.txt"]);
    git(dir, &["commit", "-q", "-m", "PROJ-2 touch both"]);
}

fn strata(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(args)
        .args(["--format", "json"])
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "strata {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn log_parses_real_commits() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    build_repo(dir.path());

    let entries = strata(dir.path(), &["log"]);
    let rows = entries.as_array().unwrap();
    assert_eq!(rows.len(), 3, "2 commits over 2 files yield 3 entries");

    for row in rows {
        assert!(!row["revision"].as_str().unwrap().is_empty());
        assert!(!row["path"].as_str().unwrap().is_empty());
        assert!(row["added"].as_u64().is_some());
    }
    assert!(rows.iter().any(|r| r["path"] == "a.txt"));
    assert!(rows.iter().any(|r| r["path"] == "b.txt"));
}

#[test]
fn coupling_reflects_shared_commits() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    build_repo(dir.path());

    let report = strata(dir.path(), &["coupling"]);
    let rows = report.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let b_to_a = rows
        .iter()
        .find(|r| r["primary"] == "b.txt")
        .expect("b.txt row");
    assert_eq!(b_to_a["dependency"], "a.txt");
    assert_eq!(b_to_a["coupling"], 1.0);

    let a_to_b = rows
        .iter()
        .find(|r| r["primary"] == "a.txt")
        .expect("a.txt row");
    assert_eq!(a_to_b["coupling"], 0.5);
}

#[test]
fn ages_cover_every_changed_path() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    build_repo(dir.path());

    let report = strata(dir.path(), &["ages"]);
    let rows = report.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        let age = row["ageDays"].as_f64().unwrap();
        assert!(age >= 0.0, "fresh commits have tiny non-negative ages");
        assert!(age < 1.0);
    }
}

#[test]
fn mass_changes_find_the_two_file_commit() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    build_repo(dir.path());

    let report = strata(dir.path(), &["mass-changes", "--threshold", "1"]);
    let rows = report.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["pathCount"], 2);
    assert_eq!(rows[0]["message"], "PROJ-2 touch both");
}

#[test]
fn ticket_coupling_joins_across_commits() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    std::fs::write(dir.path().join("x.txt"), "x\n").unwrap();
    git(dir.path(), &["add", "x.txt"]);
    git(dir.path(), &["commit", "-q", "-m", "SHARED-7 first half"]);
    std::fs::write(dir.path().join("y.txt"), "y\n").unwrap();
    git(dir.path(), &["add", "y.txt"]);
    git(dir.path(), &["commit", "-q", "-m", "SHARED-7 second half"]);

    let report = strata(dir.path(), &["coupling", "--on", "ticket"]);
    let rows = report.as_array().unwrap();
    assert_eq!(rows.len(), 2, "both directions couple under the ticket");
    for row in rows {
        assert_eq!(row["coupling"], 1.0);
    }
}
