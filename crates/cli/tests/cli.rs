use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn git_ok(repo: &Path, args: &[&str]) {
    let out = std::process::Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("git command");
    assert!(out.status.success(), "git {:?} failed", args);
}

fn cobot(storage: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cobot").unwrap();
    cmd.env_remove("COBOT_LANGUAGE")
        .env_remove("COBOT_MINIMUM_SCORE")
        .env_remove("COBOT_CACHE_DIR")
        .env("COBOT_STORAGE_PATH", storage)
        .arg("--quiet");
    cmd
}

fn seeded_storage() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path();
    git_ok(repo, &["init", "--quiet"]);
    cobot(repo).arg("init").assert().success();

    std::fs::write(
        repo.join("agent-config.yaml"),
        "agent:\n  name: ops\nactions: [restart, shutdown, ps]\n",
    )
    .unwrap();
    std::fs::write(
        repo.join("actions/restart.yaml"),
        "description: restart the server\n",
    )
    .unwrap();
    std::fs::write(
        repo.join("actions/shutdown.yaml"),
        "description: shut down the machine\n",
    )
    .unwrap();
    std::fs::write(
        repo.join("actions/ps.yaml"),
        "description: list running processes\n",
    )
    .unwrap();
    tmp
}

#[test]
fn init_creates_layout() {
    let tmp = TempDir::new().unwrap();
    git_ok(tmp.path(), &["init", "--quiet"]);

    cobot(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent-config.yaml"))
        .stdout(predicate::str::contains("Storage ready"));
    assert!(tmp.path().join("actions").is_dir());
    assert!(tmp.path().join("local/cache").is_dir());
    let ignore = std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
    assert!(ignore.lines().any(|l| l == "local/*"));

    // Second run creates nothing new.
    cobot(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created").not());
}

#[test]
fn init_outside_git_fails() {
    let tmp = TempDir::new().unwrap();
    cobot(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("git init"));
}

#[test]
fn query_json_ranks_actions() {
    let tmp = seeded_storage();
    let out = cobot(tmp.path())
        .args(["query", "restart server please", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["query"], "restart server please");
    let matches = value["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["name"], "restart");
}

#[test]
fn query_limit_and_score_flags() {
    let tmp = seeded_storage();
    cobot(tmp.path())
        .args(["query", "reboot the box", "--minimum-score", "0", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. restart"))
        .stdout(predicate::str::contains("2. shutdown"))
        .stdout(predicate::str::contains("ps").not());

    cobot(tmp.path())
        .args(["query", "reboot the box"])
        .assert()
        .success()
        .stdout("No matches.\n");
}

#[test]
fn negative_score_is_rejected() {
    let tmp = seeded_storage();
    cobot(tmp.path())
        .args(["query", "anything", "--minimum-score=-1"])
        .assert()
        .failure();
}

#[test]
fn console_dispatches_lines_until_empty() {
    let tmp = seeded_storage();
    cobot(tmp.path())
        .arg("console")
        .write_stdin("ps\nrestart server\nreboot the box\n\nshutdown\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello! Agent ops ready."))
        .stdout(predicate::str::contains("Run action 'ps'."))
        .stdout(predicate::str::contains("Run action 'restart'."))
        .stdout(predicate::str::contains(
            "No similar match for user input: 'reboot the box'.",
        ))
        .stdout(predicate::str::contains("Run action 'shutdown'.").not())
        .stdout(predicate::str::contains("Bye! Agent ops shutting down."));
}

#[test]
fn console_ends_on_eof() {
    let tmp = seeded_storage();
    cobot(tmp.path())
        .arg("console")
        .write_stdin("ps\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bye! Agent ops shutting down."));
}

#[test]
fn status_json_reports_dirty_tree() {
    let tmp = seeded_storage();
    let out = cobot(tmp.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["agent"], "ops");
    assert_eq!(value["language"], "english");
    assert_eq!(value["version"], "v0.0.0");
    assert_eq!(value["dirty"], true);
    assert_eq!(value["actions"], 3);
}

#[test]
fn rebuild_writes_artifact() {
    let tmp = seeded_storage();
    cobot(tmp.path())
        .args(["rebuild", "--language", "spanish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spanish.vocabulary"))
        .stdout(predicate::str::contains("3 actions"));
    assert!(tmp
        .path()
        .join("local/cache/v0.0.0/spanish.vocabulary")
        .is_file());
}

#[test]
fn log_file_receives_output() {
    let tmp = seeded_storage();
    let log = tmp.path().join("local/logs/cobot.log");
    Command::cargo_bin("cobot")
        .unwrap()
        .env("COBOT_STORAGE_PATH", tmp.path())
        .env_remove("RUST_LOG")
        .args(["--verbose", "--log-file"])
        .arg(&log)
        .arg("status")
        .assert()
        .success();
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(!text.is_empty());
}
