use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd(vault_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("keybox").unwrap();
    cmd.env("KEYBOX_PATH", vault_path);
    cmd
}

#[test]
fn init_add_list_show_roundtrip() {
    let dir = tempdir().unwrap();
    let vault_path = dir.path().join("test.keybox");

    cmd(&vault_path)
        .arg("init")
        .write_stdin("masterpw\nmasterpw\n")
        .assert()
        .success();
    assert!(vault_path.exists());

    cmd(&vault_path)
        .args(["add", "--site", "example.com", "--user", "alice"])
        .write_stdin("masterpw\nsecretpw\nsecretpw\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("added record 0"));

    cmd(&vault_path)
        .arg("list")
        .write_stdin("masterpw\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"))
        .stdout(predicate::str::contains("alice"));

    cmd(&vault_path)
        .args(["show", "0", "--reveal"])
        .write_stdin("masterpw\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("secretpw"));
}

#[test]
fn passwd_rotates_and_old_passphrase_stops_working() {
    let dir = tempdir().unwrap();
    let vault_path = dir.path().join("test.keybox");

    cmd(&vault_path)
        .arg("init")
        .write_stdin("oldpass\noldpass\n")
        .assert()
        .success();

    cmd(&vault_path)
        .args(["add", "--site", "a.com", "--user", "bob", "--password", "p1"])
        .write_stdin("oldpass\n")
        .assert()
        .success();

    cmd(&vault_path)
        .arg("passwd")
        .write_stdin("oldpass\noldpass\nnewpass\nnewpass\n")
        .assert()
        .success();

    cmd(&vault_path)
        .args(["show", "0", "--reveal"])
        .write_stdin("newpass\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("p1"));

    cmd(&vault_path)
        .arg("list")
        .write_stdin("oldpass\n")
        .assert()
        .failure();
}

#[test]
fn init_refuses_to_overwrite_existing_vault() {
    let dir = tempdir().unwrap();
    let vault_path = dir.path().join("test.keybox");

    cmd(&vault_path)
        .arg("init")
        .write_stdin("pw\npw\n")
        .assert()
        .success();

    cmd(&vault_path)
        .arg("init")
        .write_stdin("pw\npw\n")
        .assert()
        .failure();
}
