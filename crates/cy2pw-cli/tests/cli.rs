//! Running the `cy2pw` binary

use std::process::Command;

use cy2pw_test_utils::{LOGIN_SPEC, UNRESOLVED_ALIAS};
use pretty_assertions::assert_eq;

fn cy2pw() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cy2pw"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn convert_writes_spec_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("login.cy.ts");
    std::fs::write(&input, LOGIN_SPEC).unwrap();
    let out = dir.path().join("out");

    let output = cy2pw()
        .args(["convert", "--out-dir"])
        .arg(&out)
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let converted = std::fs::read_to_string(out.join("login.spec.ts")).unwrap();
    assert!(converted.starts_with("import { test, expect } from '@playwright/test';"));
    assert!(!converted.contains("cy."));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("6/6 patterns converted"));
}

#[test]
fn convert_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.cy.ts");
    std::fs::write(&input, UNRESOLVED_ALIAS).unwrap();

    let output = cy2pw().args(["convert", "--json"]).arg(&input).output().unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let result = &results[0];
    assert_eq!(result["isValid"], serde_json::Value::Bool(true));
    assert_eq!(result["summary"]["manualReview"], serde_json::json!(1));
    assert!(result["convertedCode"].as_str().unwrap().contains("page.waitForResponse"));
}

#[test]
fn config_files_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.cy.ts");
    std::fs::write(&input, "cy.login('ada');\n").unwrap();
    let config = dir.path().join("cy2pw.toml");
    std::fs::write(&config, "[transform.page_objects]\nlogin = \"loginPage.login\"\n").unwrap();

    let output = cy2pw()
        .args(["convert", "--config"])
        .arg(&config)
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("await loginPage.login('ada');"));
}

#[test]
fn scan_lists_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("login.cy.ts");
    std::fs::write(&input, LOGIN_SPEC).unwrap();

    let output = cy2pw().args(["scan", "--json"]).arg(&input).output().unwrap();
    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["patterns"].as_array().unwrap().len(), 6);
}

#[test]
fn missing_files_fail() {
    let output = cy2pw().args(["convert", "/nonexistent/a.cy.ts"]).output().unwrap();
    assert!(!output.status.success());
}
