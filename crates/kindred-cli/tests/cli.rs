//! Binary-level tests for the kindred CLI

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kindred(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kindred").unwrap();
    cmd.arg("--config")
        .arg(config_dir.join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

const FAMILY: &str = r#"ADD_PERSON "Alice" FEMALE 1950
ADD_PERSON "Bob" MALE 1950
MARRY P001 P002 1975
ADD_PERSON "Carol" FEMALE 1976
ADD_PARENT_CHILD P001 P003
ADD_PARENT_CHILD P002 P003
"#;

#[test]
fn shell_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let input = format!("{}CHILDREN P001\nSIBLINGS P003\nANCESTORS_AT P003 1\nEXIT\n", FAMILY);

    kindred(dir.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-> P001\n-> P002\nOK\n-> P003\nOK\nOK\n"))
        .stdout(predicate::str::contains("- P003 Carol (b.1976)\n<none>\n"))
        .stdout(predicate::str::contains("- P001 Alice (b.1950)"))
        .stdout(predicate::str::contains("- P002 Bob (b.1950)"));
}

#[test]
fn errors_are_printed_and_the_session_continues() {
    let dir = TempDir::new().unwrap();
    let input = format!(
        "{}ADD_PARENT_CHILD P003 P001\nMARRY P001 P003 2000\nSHOW P003\n",
        FAMILY
    );

    kindred(dir.path())
        .arg("shell")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: Invalid relationship: Cycle detected"))
        .stdout(predicate::str::contains("Error: Invalid marriage"))
        .stdout(predicate::str::contains(
            "P003 | Carol | FEMALE | b.1976 | children=0",
        ));
}

#[test]
fn descendants_tree_rendering() {
    let dir = TempDir::new().unwrap();
    let input = format!(
        "{}ADD_PERSON \"Dan\" MALE 2000\nADD_PARENT_CHILD P003 P004\nDESCENDANTS P001 2\n",
        FAMILY
    );

    kindred(dir.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "- P001 Alice (b.1950)\n-- P003 Carol (b.1976)\n--- P004 Dan (b.2000)\n",
        ));
}

#[test]
fn run_script_in_json() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("family.kin");
    fs::write(&script, format!("{}SPOUSE P001\nSHOW P404\n", FAMILY)).unwrap();

    kindred(dir.path())
        .args(["--format", "json", "run"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"ok":{"created":"P001"}}"#))
        .stdout(predicate::str::contains(r#""spouse":{"id":"P002""#))
        .stdout(predicate::str::contains(r#""kind":"unknown_person""#));
}

#[test]
fn strict_run_fails_on_first_error() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken.kin");
    fs::write(&script, "ADD_PERSON \"Ann\" FEMALE 1990\nMARRY P001 P001 2020\nSHOW P001\n").unwrap();

    kindred(dir.path())
        .arg("run")
        .arg(&script)
        .arg("--strict")
        .assert()
        .failure()
        .stdout(predicate::str::contains("-> P001"))
        .stdout(predicate::str::contains("P001 | Ann").not())
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn config_controls_ids_and_policy() {
    let dir = TempDir::new().unwrap();

    kindred(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    kindred(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    kindred(dir.path())
        .args(["config", "set", "id_prefix", "K"])
        .assert()
        .success();
    kindred(dir.path())
        .args(["config", "set", "reference_year", "1960"])
        .assert()
        .success();
    kindred(dir.path())
        .args(["config", "get", "reference_year"])
        .assert()
        .success()
        .stdout("1960\n");

    // Born 1950 is a minor relative to 1960, so the marriage is refused.
    kindred(dir.path())
        .write_stdin("ADD_PERSON \"Ann\" FEMALE 1950\nADD_PERSON \"Ben\" MALE 1930\nMARRY K001 K002 1980\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-> K001\n-> K002\nError: Invalid marriage"));
}

#[test]
fn far_future_birth_year_does_not_abort_the_session() {
    let dir = TempDir::new().unwrap();

    kindred(dir.path())
        .write_stdin("ADD_PERSON \"Ann\" FEMALE 2147483647\nSHOW P001\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-> P001\n"))
        .stdout(predicate::str::contains("b.2147483647"));
}

#[test]
fn negative_reference_year_in_config_file_is_refused() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "reference_year = -2\n").unwrap();

    kindred(dir.path())
        .write_stdin("ADD_PERSON \"Ann\" FEMALE 2147483647\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));

    let fresh = TempDir::new().unwrap();
    kindred(fresh.path())
        .args(["config", "set", "age_of_majority", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn config_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();

    kindred(dir.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn completions_are_generated() {
    let dir = TempDir::new().unwrap();

    kindred(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kindred"));
}
