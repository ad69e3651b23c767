//! Integration tests for the fdesc CLI.
//!
//! Run with: `cargo test --package featuredesc-cli --test cli_integration`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const DEFINITIONS: &str = r#"{
    "entities": {
        "customers": { "index": "id" },
        "sessions": { "index": "session_id" },
        "transactions": { "index": "transaction_id" }
    },
    "features": [
        { "type": "aggregation", "primitive": "mean",
          "relationship_path": [ { "parent": "customers", "child": "transactions" } ],
          "base_features": [ { "type": "identity", "entity": "transactions", "column": "amount" } ] },
        { "type": "direct",
          "relationship_path": [ { "parent": "customers", "child": "sessions" } ],
          "base": { "type": "identity", "entity": "customers", "column": "age" } }
    ]
}"#;

/// Run fdesc inside `dir` with an isolated environment and config location.
fn run_fdesc_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fdesc"))
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("FDESC_METADATA_FILE")
        .env_remove("FDESC_OUTPUT_FORMAT")
        .args(args)
        .output()
        .expect("Failed to execute fdesc command")
}

fn write_definitions(dir: &Path) -> String {
    let path = dir.join("features.json");
    fs::write(&path, DEFINITIONS).unwrap();
    path.display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let output = run_fdesc_in_dir(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("describe"));
    assert!(text.contains("config"));
}

#[test]
fn test_describe_text() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());

    let output = run_fdesc_in_dir(dir.path(), &["describe", &definitions]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains(
        "customers: MEAN(transactions.amount): The average of the \"amount\" of all instances \
         of \"transactions\" for each \"id\" in \"customers\"."
    ));
    assert!(text.contains(
        "sessions: customers.age: The \"age\" of the instance of \"customers\" associated \
         with this instance of \"sessions\"."
    ));
}

#[test]
fn test_describe_json_with_feature_filter() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());

    let output = run_fdesc_in_dir(
        dir.path(),
        &[
            "describe",
            &definitions,
            "--format",
            "json",
            "--feature",
            "sessions: customers.age",
        ],
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["feature"], "sessions: customers.age");
}

#[test]
fn test_describe_with_metadata() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());
    let metadata = dir.path().join("metadata.json");
    fs::write(
        &metadata,
        r#"{ "feature_descriptions": { "customers: id": "the customer" } }"#,
    )
    .unwrap();

    let output = run_fdesc_in_dir(
        dir.path(),
        &["describe", &definitions, "--metadata", metadata.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("for each customer."));
}

#[test]
fn test_describe_scalar_where_filter() {
    let dir = TempDir::new().unwrap();
    let definitions = dir.path().join("filtered.json");
    fs::write(
        &definitions,
        r#"{
            "entities": {
                "customers": { "index": "id" },
                "transactions": { "index": "transaction_id" }
            },
            "features": [
                { "type": "aggregation", "primitive": "mean",
                  "relationship_path": [ { "parent": "customers", "child": "transactions" } ],
                  "base_features": [ { "type": "identity", "entity": "transactions", "column": "amount" } ],
                  "where": { "type": "transform", "primitive": "equal_scalar", "value": true,
                             "base_features": [ { "type": "identity", "entity": "transactions", "column": "fraud" } ] } }
            ]
        }"#,
    )
    .unwrap();

    let output = run_fdesc_in_dir(dir.path(), &["describe", definitions.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains(
        "customers: MEAN(transactions.amount WHERE fraud = True): The average of the \"amount\" \
         of all instances of \"transactions\" where the \"fraud\" is True"
    ));
}

#[test]
fn test_describe_missing_metadata_fails() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());

    let output = run_fdesc_in_dir(
        dir.path(),
        &["describe", &definitions, "--metadata", "missing.json"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.json"));
}

#[test]
fn test_describe_unknown_feature_fails() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());

    let output = run_fdesc_in_dir(
        dir.path(),
        &["describe", &definitions, "--feature", "customers: nope"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_metadata_from_environment() {
    let dir = TempDir::new().unwrap();
    let definitions = write_definitions(dir.path());
    let metadata = dir.path().join("metadata.json");
    fs::write(
        &metadata,
        r#"{ "primitive_templates": { "mean": "the mean of {}" } }"#,
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_fdesc"))
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("FDESC_METADATA_FILE", &metadata)
        .env_remove("FDESC_OUTPUT_FORMAT")
        .args(["describe", definitions.as_str()])
        .output()
        .expect("Failed to execute fdesc command");
    assert!(output.status.success());
    assert!(stdout(&output).contains("The mean of the \"amount\""));
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();

    let output = run_fdesc_in_dir(dir.path(), &["config", "set", "output-format", "json"]);
    assert!(output.status.success());

    let output = run_fdesc_in_dir(dir.path(), &["config", "get", "output-format"]);
    assert_eq!(stdout(&output).trim(), "json");

    let output = run_fdesc_in_dir(dir.path(), &["config", "path"]);
    assert!(stdout(&output).contains("config.json"));

    // The configured format applies when --format is absent.
    let definitions = write_definitions(dir.path());
    let output = run_fdesc_in_dir(dir.path(), &["describe", &definitions]);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout(&output)).is_ok());

    let output = run_fdesc_in_dir(dir.path(), &["config", "reset"]);
    assert!(output.status.success());
    let output = run_fdesc_in_dir(dir.path(), &["config", "get", "output-format"]);
    assert_eq!(stdout(&output).trim(), "text");
}

#[test]
fn test_config_unknown_key() {
    let dir = TempDir::new().unwrap();
    let output = run_fdesc_in_dir(dir.path(), &["config", "get", "colour"]);
    assert!(!output.status.success());
}
