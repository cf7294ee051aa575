use std::process::Command;

fn strata() -> Command {
    Command::new(env!("CARGO_BIN_EXE_strata"))
}

#[test]
fn help_lists_report_subcommands() {
    let output = strata().arg("--help").output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["hotspots", "coupling", "ages", "mass-changes", "complexity"] {
        assert!(text.contains(subcommand), "--help should mention {subcommand}");
    }
}

#[test]
fn bare_invocation_prints_welcome() {
    let dir = tempfile::tempdir().unwrap();
    let output = strata().current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Quick start:"));
    assert!(text.contains("strata init"));
}

#[test]
fn doctor_emits_machine_readable_checks() {
    let dir = tempfile::tempdir().unwrap();
    let output = strata()
        .args(["doctor", "--format", "json"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("doctor output should be JSON");
    let checks = json["checks"].as_array().expect("checks array");
    assert!(!checks.is_empty());

    let names: Vec<&str> = checks
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert!(names.contains(&"git_repository"));
    assert!(names.contains(&"config_file"));
    assert!(names.contains(&"git_client"));

    // outside a repo with no config, both checks fail but doctor still exits 0
    let config_check = checks
        .iter()
        .find(|c| c["name"] == "config_file")
        .unwrap();
    assert_eq!(config_check["status"], "fail");
}

#[test]
fn report_outside_repository_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let output = strata()
        .args(["ages", "--path", "."])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());

    let text = String::from_utf8_lossy(&output.stderr);
    assert!(text.contains("git repository"), "stderr was: {text}");
}

#[test]
fn vega_format_rejected_for_non_report_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keep.txt"), "x").unwrap();
    let output = strata()
        .args(["components", "--format", "vega"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());

    let text = String::from_utf8_lossy(&output.stderr);
    assert!(text.contains("Vega output"), "stderr was: {text}");
}

#[test]
fn components_lists_working_tree_labels() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/sub")).unwrap();
    std::fs::write(dir.path().join("src/sub/mod.rs"), "pub fn f() {}\n").unwrap();
    std::fs::write(dir.path().join("top.txt"), "x").unwrap();

    let output = strata()
        .args(["components", "--format", "json", "--depth", "1"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = json.as_array().unwrap();
    let find = |path: &str| {
        rows.iter()
            .find(|r| r["path"] == path)
            .unwrap_or_else(|| panic!("missing row for {path}"))
    };
    assert_eq!(find("src/sub/mod.rs")["component"], "src");
    assert_eq!(find("top.txt")["component"], ".");
}
