//! E2E tests for failure paths and stable error codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn sg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sg"));
    cmd.current_dir(dir);
    cmd.env("SOCIOGRAM_LOG", "error");
    cmd.env_remove("SOCIOGRAM_FORMAT");
    cmd
}

const TINY: &str = r#"{"issues":[{"number":1,"author":"alice","state":"CLOSED","closed_by":"bob"}]}"#;

#[test]
fn missing_event_file_is_e1002() {
    let dir = TempDir::new().expect("tempdir");
    sg_cmd(dir.path())
        .args(["stats", "-e", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"))
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn malformed_bundle_is_e1003() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("bad.json"), "{\"issues\": 7}").expect("write");
    sg_cmd(dir.path())
        .args(["analyze", "-e", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1003]"));
}

#[test]
fn bad_config_is_e1001() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), TINY).expect("write");
    std::fs::write(dir.path().join("sociogram.toml"), "[influence\ntop_k = ").expect("write");
    sg_cmd(dir.path())
        .args(["stats", "-e", "events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn unknown_identity_is_e2001_in_json() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), TINY).expect("write");
    let output = sg_cmd(dir.path())
        .args(["closest", "-e", "events.json", "zed", "--format", "json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("json error on stderr");
    let end = stderr.rfind('}').expect("json error end");
    let json: Value = serde_json::from_str(&stderr[start..=end]).expect("valid JSON");
    assert_eq!(json["error"]["error_code"], "E2001");
    assert!(json["error"]["message"].as_str().is_some_and(|m| m.contains("zed")));
}

#[test]
fn unknown_focus_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), TINY).expect("write");
    sg_cmd(dir.path())
        .args(["analyze", "-e", "events.json", "--focus", "zed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn zero_limit_is_e2002() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), TINY).expect("write");
    sg_cmd(dir.path())
        .args(["closest", "-e", "events.json", "alice", "--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"))
        .stderr(predicate::str::contains("--limit"));
}

#[test]
fn zero_top_is_e2002() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), TINY).expect("write");
    sg_cmd(dir.path())
        .args(["analyze", "-e", "events.json", "--top", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"));
}

#[test]
fn odd_rows_do_not_fail_the_bundle() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("events.json"),
        r#"{"issues":[
            {"number":1,"author":"alice","state":"closed","closed_by":"bob"},
            {"number":"two","author":"carol"}
        ]}"#,
    )
    .expect("write");
    let output = sg_cmd(dir.path())
        .args(["stats", "-e", "events.json", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["stats"]["edge_count"], 1);
    assert_eq!(json["ingest"]["issues"]["seen"], 2);
    assert_eq!(json["ingest"]["issues"]["degraded"], 1);
    assert_eq!(json["ingest"]["degradations"][0]["kind"], "malformed_record");
}

#[test]
fn events_flag_is_required() {
    let dir = TempDir::new().expect("tempdir");
    sg_cmd(dir.path()).args(["groups"]).assert().failure();
}

#[test]
fn completions_are_generated() {
    let dir = TempDir::new().expect("tempdir");
    sg_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sg"))
        .stdout(predicate::str::contains("closest"));
}
