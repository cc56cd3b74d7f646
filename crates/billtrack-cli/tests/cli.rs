use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "SOURDOUGH FACTORY LLP\n\
                       TAX INVOICE\n\
                       Invoice No: INV-1001\n\
                       Invoice Date: 05 Jan 2025\n\
                       Balance Due: $1,234.56\n";

const LEDGER: &str = "SOURDOUGH FACTORY LLP\n\
                      STATEMENT OF ACCOUNT\n\
                      2025-01-05  20451    2025-02-04  PO5521   1,234.56  1,234.56\n\
                      2025-01-12  20467    2025-02-11           500.00    1,734.56\n\
                      2025-01-31  Total    2025-01-31           1,734.56  1,734.56\n";

// Keeps the user's real config file out of the run.
fn billtrack(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("billtrack").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn suppliers_lists_builtin_layouts() {
    let home = TempDir::new().unwrap();

    billtrack(home.path())
        .args(["suppliers", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sourdough Factory LLP"))
        .stdout(predicate::str::contains("harbour_dairy_statement"));
}

#[test]
fn process_invoice_as_json() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "inv.txt", INVOICE);

    billtrack(home.path())
        .arg("process")
        .arg(&input)
        .args(["-s", "Sourdough Factory LLP", "--company", "Bakehouse Pte Ltd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invoice_no\": \"INV-1001\""))
        .stdout(predicate::str::contains("\"invoice_date\": \"05/01/2025\""))
        .stdout(predicate::str::contains("\"is_valid\": true"));
}

#[test]
fn process_statement_as_csv() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "soa.txt", LEDGER);

    billtrack(home.path())
        .arg("process")
        .arg(&input)
        .args(["-s", "Sourdough Factory LLP", "--company", "Bakehouse Pte Ltd"])
        .args(["--statement", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("supplier_name,company_name,invoice_no"))
        .stdout(predicate::str::contains("20451,05/01/2025,04/02/2025"))
        .stdout(predicate::str::contains("20467"))
        .stdout(predicate::str::contains(",Total,").not());
}

#[test]
fn process_missing_file_fails() {
    let home = TempDir::new().unwrap();

    billtrack(home.path())
        .args(["process", "nope.txt", "-s", "X", "--company", "Y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn classify_reports_selected_supplier() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "inv.txt", INVOICE);

    billtrack(home.path())
        .arg("classify")
        .arg(&input)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"selected\": {"))
        .stdout(predicate::str::contains("\"label\": \"Sourdough Factory LLP\""));
}

#[test]
fn batch_writes_payload_without_known_duplicates() {
    let home = TempDir::new().unwrap();
    let docs = home.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    write(&docs, "a.txt", INVOICE);
    write(&docs, "b.txt", "Corner Mart\nReceipt 0042\n");

    let known = write(home.path(), "known.csv", "invoice_no,invoice_date\nINV-0999,2025-01-01\n");
    let payload = home.path().join("payload.json");
    let out_dir = home.path().join("out");

    billtrack(home.path())
        .arg("batch")
        .arg(format!("{}/*.txt", docs.display()))
        .args(["-s", "Sourdough Factory LLP", "--company", "Bakehouse Pte Ltd"])
        .arg("--known-keys")
        .arg(&known)
        .arg("--payload")
        .arg(&payload)
        .arg("-o")
        .arg(&out_dir)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("1 unmatched"));

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&payload).unwrap()).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["invoice_no"], "INV-1001");

    assert!(out_dir.join("a.txt.json").exists());
    assert!(out_dir.join("b.txt.json").exists());
    assert!(out_dir.join("summary.csv").exists());
}

#[test]
fn batch_excludes_known_keys_from_payload() {
    let home = TempDir::new().unwrap();
    let docs = home.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    write(&docs, "a.txt", INVOICE);

    let known = write(
        home.path(),
        "known.json",
        r#"[{"invoice_no": "INV-1001", "invoice_date": "2025-01-05"}]"#,
    );
    let payload = home.path().join("payload.json");

    billtrack(home.path())
        .arg("batch")
        .arg(format!("{}/*.txt", docs.display()))
        .args(["-s", "Sourdough Factory LLP", "--company", "Bakehouse Pte Ltd"])
        .arg("--known-keys")
        .arg(&known)
        .arg("--payload")
        .arg(&payload)
        .assert()
        .success();

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&payload).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 0);
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("billtrack.json");

    billtrack(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "classifier.invoice_threshold", "90"])
        .assert()
        .success();

    billtrack(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "classifier.invoice_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("90"));

    billtrack(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "classifier.no_such_key", "1"])
        .assert()
        .failure();
}
