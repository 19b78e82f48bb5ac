//! End-to-end tests for the `rulematch` binary.
#![expect(
    clippy::expect_used,
    reason = "integration tests fail fast on setup errors"
)]

use std::fs;
use std::str;

use assert_cmd::Command;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const RULES: &str = r#"{
    "brands": [
        {
            "name": "Stryker",
            "rule": "stryker OR \"salvation beams\"",
            "subbrands": [
                { "name": "Salvation", "rule": "\"salvation beams\" OR salvationbeam*" }
            ]
        },
        { "name": "Tornier", "rule": "\"aequalis humeral nail\"" }
    ]
}"#;

fn rulematch() -> Command {
    let mut cmd = Command::cargo_bin("rulematch").expect("binary exists");
    cmd.env_remove("RULEMATCH_LOG_LEVEL")
        .env_remove("RULEMATCH_MAX_DOCUMENT_BYTES");
    cmd
}

#[fixture]
fn rules_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("rules.json"), RULES).expect("write rules");
    dir
}

fn stdout_of(output: &std::process::Output) -> &str {
    str::from_utf8(&output.stdout).expect("utf8 stdout")
}

#[rstest]
#[case("<p>Report on Wright Medical</p>", "true")]
#[case("Mortal Kombat tournament", "false")]
fn match_reads_stdin(#[case] document: &str, #[case] verdict: &str) {
    let output = rulematch()
        .args(["match", "--query", "stryker OR wright*"])
        .write_stdin(document)
        .output()
        .expect("run rulematch");
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        format!("{{\"document\":\"-\",\"matched\":{verdict}}}\n")
    );
}

#[rstest]
fn classify_reads_files(rules_dir: TempDir) {
    let doc = rules_dir.path().join("article.html");
    fs::write(&doc, "<body>The Salvation Beams system by Stryker</body>").expect("write doc");
    let output = rulematch()
        .arg("classify")
        .arg("--rules")
        .arg(rules_dir.path().join("rules.json"))
        .arg(&doc)
        .output()
        .expect("run rulematch");
    assert!(output.status.success());
    let line: serde_json::Value =
        serde_json::from_str(stdout_of(&output).trim_end()).expect("json line");
    assert_eq!(line["brand"], "Stryker");
    assert_eq!(line["subbrand"], "Salvation");
    assert_eq!(line["document"], doc.display().to_string());
}

#[test]
fn check_is_lenient_unless_strict() {
    let lenient = rulematch()
        .args(["check", "--query", "(stryker AND"])
        .output()
        .expect("run rulematch");
    assert!(lenient.status.success());
    let out = stdout_of(&lenient);
    assert!(out.starts_with("query: stryker\n"));
    assert!(out.contains("warning: "));

    let strict = rulematch()
        .args(["check", "--strict", "--query", "(stryker AND"])
        .output()
        .expect("run rulematch");
    assert_eq!(strict.status.code(), Some(1));
}

#[rstest]
fn check_rules_prints_every_rule(rules_dir: TempDir) {
    let output = rulematch()
        .arg("check")
        .arg("--rules")
        .arg(rules_dir.path().join("rules.json"))
        .output()
        .expect("run rulematch");
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "Stryker: (stryker OR \"salvation beams\")\n\
         Stryker / Salvation: (\"salvation beams\" OR salvationbeam*)\n\
         Tornier: \"aequalis humeral nail\"\n"
    );
}

#[rstest]
#[case::bad_level(&[("RULEMATCH_LOG_LEVEL", "chatty")])]
#[case::zero_limit(&[("RULEMATCH_MAX_DOCUMENT_BYTES", "0")])]
fn invalid_environment_exits_with_status_two(#[case] vars: &[(&str, &str)]) {
    let output = rulematch()
        .envs(vars.iter().copied())
        .args(["match", "--query", "a"])
        .write_stdin("a")
        .output()
        .expect("run rulematch");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = str::from_utf8(&output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("invalid configuration"));
}

#[test]
fn flag_overrides_environment() {
    let output = rulematch()
        .env("RULEMATCH_MAX_DOCUMENT_BYTES", "1")
        .args(["--max-document-bytes", "64", "match", "--query", "stryker"])
        .write_stdin("stryker news")
        .output()
        .expect("run rulematch");
    assert!(output.status.success());
}

#[test]
fn oversized_document_fails() {
    let output = rulematch()
        .args(["match", "--max-document-bytes", "4", "--query", "stryker"])
        .write_stdin("stryker news")
        .output()
        .expect("run rulematch");
    assert_eq!(output.status.code(), Some(1));
    let stderr = str::from_utf8(&output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("exceeds the 4 byte document limit"));
}

#[rstest]
fn invalid_rules_fail(rules_dir: TempDir) {
    let bad = rules_dir.path().join("bad.json");
    fs::write(&bad, r#"{"brands": [{"name": "A", "rule": "a", "sentiment": 1}]}"#)
        .expect("write rules");
    let output = rulematch()
        .arg("classify")
        .arg("--rules")
        .arg(&bad)
        .write_stdin("a")
        .output()
        .expect("run rulematch");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn check_survives_deeply_nested_queries() {
    let query = format!("{}stryker", "(".repeat(5000));
    let output = rulematch()
        .args(["check", "--query", &query])
        .output()
        .expect("run rulematch");
    assert!(output.status.success());
    let out = stdout_of(&output);
    assert!(out.starts_with("query: stryker\n"));
    assert!(out.contains("warning: groups nested deeper than 128 levels"));
}
