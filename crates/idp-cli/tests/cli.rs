//! Integration tests for the idp binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE_LINES: &str = r#"[
    {"text": "INVOICE #1234", "confidence": 0.95},
    {"text": "Date: 2024-01-15", "confidence": 0.9},
    {"text": "Total: $250.00", "confidence": 0.9}
]"#;

fn idp(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_idp"));
    // Keep the default config path inside the sandbox.
    cmd.env("XDG_CONFIG_HOME", config_dir).env("HOME", config_dir);
    cmd
}

#[test]
fn extract_json_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("invoice.json");
    fs::write(&input, INVOICE_LINES).unwrap();

    let output = idp(dir.path()).arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["document_type"], "invoice");
    let fields = value["fields"].as_array().unwrap();
    assert!(fields
        .iter()
        .any(|f| f["name"] == "date" && f["normalized"] == "2024-01-15" && f["line"] == 1));
    assert!(fields
        .iter()
        .any(|f| f["name"] == "total_amount" && f["normalized"] == "250.00"));
}

#[test]
fn extract_text_format() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("invoice.json");
    fs::write(&input, INVOICE_LINES).unwrap();

    idp(dir.path())
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("date: 2024-01-15"))
        .stdout(predicate::str::contains("total_amount: 250.00"));
}

#[test]
fn extract_plain_text_input_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("receipt.txt");
    let out = dir.path().join("out.json");
    fs::write(&input, "RECEIPT\nCashier: Ann\nSubtotal 9.00\nThank you\n").unwrap();

    idp(dir.path())
        .arg("extract")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["document_type"], "receipt");
}

#[test]
fn extract_empty_dump() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.json");
    fs::write(&input, "[]").unwrap();

    let output = idp(dir.path()).arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["document_type"], "unknown");
    assert_eq!(value["confidence"], 0.0);
    assert_eq!(value["text"], "");
}

#[test]
fn extract_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    idp(dir.path())
        .args(["extract", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_malformed_dump_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(&input, "{not json").unwrap();

    idp(dir.path())
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid OCR line dump"));
}

#[test]
fn extract_uses_custom_rules_from_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.txt");
    let config = dir.path().join("config.json");
    fs::write(&input, "Customer ID: C0042\n").unwrap();
    fs::write(
        &config,
        r#"{"extraction": {"custom_rules": {"customer_id": ["customer id[: ]*([a-z0-9]+)"]}}}"#,
    )
    .unwrap();

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("customer_id: C0042"));
}

#[test]
fn extract_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.txt");
    let config = dir.path().join("config.json");
    fs::write(&input, "hello\n").unwrap();
    fs::write(&config, r#"{"classifier": {"threshold": 3.0}}"#).unwrap();

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("classifier.threshold"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.json"), INVOICE_LINES).unwrap();
    fs::write(inputs.join("b.txt"), "Meeting on 2024-03-01\n").unwrap();
    fs::write(inputs.join("broken.json"), "nope").unwrap();

    let pattern = format!("{}/*", inputs.display());
    idp(dir.path())
        .args(["batch", &pattern, "--continue-on-error", "--summary", "-f", "text", "-o"])
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"))
        .stdout(predicate::str::contains("Failed files:"));

    let a = fs::read_to_string(outputs.join("a.txt")).unwrap();
    assert!(a.contains("invoice_number: 1234"));
    assert!(outputs.join("b.txt").exists());
    assert!(!outputs.join("broken.txt").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,document_type"));
    assert!(summary.contains("a.json,ok,invoice"));
    assert!(summary.contains("broken.json,error"));
}

#[test]
fn batch_stops_on_error_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "nope").unwrap();

    let pattern = format!("{}/*.json", dir.path().display());
    idp(dir.path())
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.json", dir.path().display());
    idp(dir.path())
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config.exists());

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "pdf.max_pages"])
        .assert()
        .success()
        .stdout("10\n");

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.day_first", "false"])
        .assert()
        .success();

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.day_first"])
        .assert()
        .success()
        .stdout("false\n");

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "classifier.threshold", "2"])
        .assert()
        .failure();

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_path_and_show_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.json");

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    idp(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"render_dpi\": 200"));
}
