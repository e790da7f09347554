use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../stmtx-core/testdata/etrade")
        .join(name)
}

/// A command whose default config location is inside `home`.
fn stmtx(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stmtx").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

#[test]
fn test_process_json() {
    let home = TempDir::new().unwrap();
    let output = stmtx(&home)
        .arg("process")
        .arg(fixture("InboundDelivery01.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = report["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0]["item"], "security");
    assert_eq!(items[0]["ticker_symbol"], "NXPI");
    assert_eq!(items[0]["name"], "NXP SEMICONDUCTORS, N.V.");

    assert_eq!(items[1]["item"], "portfolio_transaction");
    assert_eq!(items[1]["type"], "delivery_inbound");
    assert_eq!(items[1]["shares"], 523_500_000);
    assert_eq!(items[1]["amount"]["amount"], 95931);
    assert_eq!(items[1]["amount"]["currency_code"], "USD");
    assert_eq!(items[1]["source"], "InboundDelivery01.txt");
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn test_process_csv() {
    let home = TempDir::new().unwrap();
    stmtx(&home)
        .arg("process")
        .arg(fixture("InboundDelivery03.txt"))
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source,type,date,security"))
        .stdout(predicate::str::contains(
            "InboundDelivery03.txt,delivery_inbound,2025-04-14,\"NETAPP,  INC.\",NTAP,16,USD,1332.48,1332.48,356.66,0.00",
        ));
}

#[test]
fn test_process_writes_output_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out.txt");

    stmtx(&home)
        .arg("process")
        .arg(fixture("InboundDelivery02.txt"))
        .args(["-f", "text", "-o"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("Security: NETAPP,  INC. [NTAP]"));
    assert!(text.contains("Amount:   USD 2691.30"));
    assert!(text.contains("1 transaction(s), 0 error(s)"));
}

#[test]
fn test_process_missing_file() {
    let home = TempDir::new().unwrap();
    stmtx(&home)
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unrecognized_document() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("letter.txt");
    fs::write(&input, "Dear customer,\nthank you.\n").unwrap();

    let output = stmtx(&home).arg("process").arg(&input).output().unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["items"].as_array().unwrap().len(), 0);
    assert_eq!(report["unrecognized"][0], "letter.txt");
}

#[test]
fn test_fail_on_errors() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("broken.txt");
    let text = fs::read_to_string(fixture("InboundDelivery01.txt"))
        .unwrap()
        .replace("Total Price ($959.31)", "");
    fs::write(&input, text).unwrap();

    stmtx(&home).arg("process").arg(&input).assert().success();

    let config = home.path().join("strict.json");
    fs::write(&config, r#"{"extraction": {"fail_on_errors": true}}"#).unwrap();

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.txt:4 [Purchase Summary]"));
}

#[test]
fn test_batch_with_summary() {
    let home = TempDir::new().unwrap();
    let input_dir = home.path().join("in");
    let output_dir = home.path().join("out");
    fs::create_dir_all(&input_dir).unwrap();
    for name in ["InboundDelivery01.txt", "InboundDelivery02.txt", "InboundDelivery03.txt"] {
        fs::copy(fixture(name), input_dir.join(name)).unwrap();
    }

    stmtx(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", input_dir.display()))
        .arg("-o")
        .arg(&output_dir)
        .args(["--summary", "-j", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 3 files"));

    for name in ["InboundDelivery01.json", "InboundDelivery02.json", "InboundDelivery03.json"] {
        assert!(output_dir.join(name).exists(), "missing {}", name);
    }

    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("InboundDelivery03.txt,success,1,0,"));
}

#[test]
fn test_batch_no_matches() {
    let home = TempDir::new().unwrap();
    stmtx(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn test_issuers() {
    let home = TempDir::new().unwrap();
    stmtx(&home)
        .arg("issuers")
        .assert()
        .success()
        .stdout(predicate::str::contains("E*TRADE Securities LLC"))
        .stdout(predicate::str::contains("Purchase Summary"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.max_block_lines", "40"])
        .assert()
        .success();

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.max_block_lines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40"));

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "output.format", "yaml"])
        .assert()
        .failure();

    stmtx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
