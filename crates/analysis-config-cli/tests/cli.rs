//! End-to-end tests of the `anacfg` binary against the default template.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn anacfg(file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("anacfg").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("ANACFG_FILE")
        .arg("--file")
        .arg(file);
    cmd
}

fn init_template(temp: &TempDir) -> PathBuf {
    let file = temp.path().join("analysis.toml");
    anacfg(&file).arg("init").assert().success();
    file
}

#[test]
fn init_writes_template_once() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("analysis.toml");

    anacfg(&file)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized:"));
    assert!(file.exists());

    anacfg(&file)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exists:"));
}

#[test]
fn categories_lists_combinations() {
    let temp = TempDir::new().unwrap();
    let file = init_template(&temp);

    anacfg(&file)
        .args(["categories", "--flat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e__1j"))
        .stdout(predicate::str::contains("mu__2j"))
        .stdout(predicate::str::contains("1097246065"))
        .stdout(predicate::str::contains("8 categories, 4 created by combination"));

    anacfg(&file)
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("    e__2j"));
}

#[test]
fn id_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let file = init_template(&temp);

    anacfg(&file)
        .args(["id", "e__1j"])
        .assert()
        .success()
        .stdout("1097246065\n");

    anacfg(&file)
        .args(["id", "e__1j", "--salt", "x"])
        .assert()
        .success()
        .stdout("1133893061\n");

    anacfg(&file)
        .args(["id", "e__1j", "--hash-len", "16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid hash length"));
}

#[test]
fn processes_prints_trees() {
    let temp = TempDir::new().unwrap();
    let file = init_template(&temp);

    anacfg(&file)
        .arg("processes")
        .assert()
        .success()
        .stdout(predicate::str::contains("  tt (1000)"))
        .stdout(predicate::str::contains("    tt_sl (1100)"))
        .stdout(predicate::str::contains("st (2000)").not());
}

#[test]
fn shifts_show_aliases() {
    let temp = TempDir::new().unwrap();
    let file = init_template(&temp);

    anacfg(&file)
        .args(["shifts", "pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf_weight -> pdf_weight_up"))
        .stdout(predicate::str::contains("pdf_weight -> pdf_weight_down"));

    anacfg(&file)
        .args(["shifts", "jec"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Shift not found: jec_up"));
}

#[test]
fn verify_reports_unregistered_processes() {
    let temp = TempDir::new().unwrap();
    let file = init_template(&temp);

    anacfg(&file)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("Verified:"));

    let content = fs::read_to_string(&file)
        .unwrap()
        .replace("# processes = [\"tt\"]", "processes = [\"st\"]");
    fs::write(&file, content).unwrap();

    anacfg(&file)
        .arg("verify")
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "dataset 'tt_sl_powheg' -> process 'tt_sl'",
        ));

    anacfg(&file)
        .args(["verify", "--warn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING: found 2 dataset(s)"))
        .stdout(predicate::str::contains("Verified:").not());
}

#[test]
fn missing_file_fails() {
    let temp = TempDir::new().unwrap();
    anacfg(&temp.path().join("missing.toml"))
        .arg("categories")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[ERROR]"));
}
