//! Runs the `relmap` binary against a temporary database.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};

const SCHEMA: &str = r#"{"types": [
    {"name": "User", "properties": [
        {"name": "email", "type": "String", "uniq": true},
        {"name": "pets", "type": ["Pet"]}
    ]},
    {"name": "Pet", "properties": [{"name": "name", "type": "String"}]}
]}"#;

fn relmap(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relmap"))
        .arg("--database")
        .arg(dir.join("test.db"))
        .arg("--schema")
        .arg(dir.join("schema.json"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run relmap")
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn materialize_insert_and_get() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();

    let report = stdout_json(&relmap(dir.path(), &["materialize"]));
    assert_eq!(report["created"], json!(["Pet", "User", "User_pets"]));

    let again = stdout_json(&relmap(dir.path(), &["materialize"]));
    assert_eq!(again["created"], json!([]));

    let pet = stdout_json(&relmap(dir.path(), &["insert", "Pet", r#"{"name": "Rex"}"#]));
    assert_eq!(pet, json!([1]));

    let user = stdout_json(&relmap(
        dir.path(),
        &["insert", "User", r#"{"email": "ann@example.com", "pets": [1]}"#],
    ));
    assert_eq!(user, json!([1]));

    let found = stdout_json(&relmap(dir.path(), &["get", "User", "1", "--expand", "pets"]));
    assert_eq!(
        found,
        json!([{"id": 1, "email": "ann@example.com", "pets": [{"id": 1, "name": "Rex"}]}])
    );
}

#[test]
fn constraint_failures_exit_with_body() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();

    stdout_json(&relmap(dir.path(), &["materialize"]));
    stdout_json(&relmap(dir.path(), &["insert", "User", r#"{"email": "a@b.c"}"#]));

    let duplicate = relmap(dir.path(), &["insert", "User", r#"{"email": "a@b.c"}"#]);
    assert_eq!(duplicate.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&duplicate.stderr);
    let body: Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(body, json!({"code": "constraint_violation", "field": "email"}));
}

#[test]
fn other_failures_are_unknown_errors() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();

    let output = relmap(dir.path(), &["list", "Nope"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let body: Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(body, json!({"code": "unknown_error"}));
}
