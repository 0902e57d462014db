use cobot_catalog::{
    definitions::AGENT_CONFIG_PATH, ActionCatalog, ActionSet, CatalogError, GitCatalog,
    DEFAULT_VERSION_ID,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git(repo: &Path, args: &[&str]) -> (bool, String) {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("git command");
    let ok = out.status.success();
    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (ok, stdout)
}

fn git_ok(repo: &Path, args: &[&str]) -> String {
    let (ok, stdout) = git(repo, args);
    assert!(ok, "git {:?} failed", args);
    stdout
}

fn init_repo() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let repo = dir.path();
    git_ok(repo, &["init", "--quiet"]);
    git_ok(repo, &["config", "user.email", "test@example.com"]);
    git_ok(repo, &["config", "user.name", "Test"]);
    git_ok(repo, &["config", "commit.gpgsign", "false"]);
    dir
}

fn commit_all(repo: &Path, message: &str) -> String {
    git_ok(repo, &["add", "-A"]);
    git_ok(repo, &["commit", "--quiet", "-m", message]);
    git_ok(repo, &["rev-parse", "HEAD"])
}

#[test]
fn outside_work_tree_is_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let err = GitCatalog::open(dir.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)), "{err}");
}

#[test]
fn version_is_default_until_first_commit() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    assert_eq!(catalog.current_version_id().unwrap(), DEFAULT_VERSION_ID);

    catalog.init_layout().unwrap();
    let head = commit_all(dir.path(), "layout");
    assert_eq!(catalog.current_version_id().unwrap(), head);
    assert!(!catalog.has_uncommitted_changes().unwrap());
}

#[test]
fn local_directory_is_ignored() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    catalog.init_layout().unwrap();
    commit_all(dir.path(), "layout");

    std::fs::write(dir.path().join("local/cache/junk.bin"), b"x").unwrap();
    assert!(!catalog.has_uncommitted_changes().unwrap());
}

#[test]
fn changed_actions_are_listed_sorted_and_filtered() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    catalog.init_layout().unwrap();
    catalog
        .write_bytes("actions/restart.yaml", b"description: restart the server\n")
        .unwrap();
    commit_all(dir.path(), "c1");

    catalog
        .write_bytes("actions/restart.yaml", b"description: restart the web server\n")
        .unwrap();
    catalog
        .write_bytes("actions/ps.yaml", b"description: list running processes\n")
        .unwrap();
    catalog
        .write_bytes("actions/nested/deep.yaml", b"description: nested\n")
        .unwrap();
    catalog.write_bytes(AGENT_CONFIG_PATH, b"agent:\n  name: ops\n").unwrap();

    assert!(catalog.has_uncommitted_changes().unwrap());
    assert_eq!(
        catalog.list_changed("actions/*.yaml").unwrap(),
        vec!["actions/nested/deep.yaml", "actions/ps.yaml", "actions/restart.yaml"]
    );
    assert_eq!(
        catalog.list_changed("*.yaml").unwrap().len(),
        4,
        "agent config is matched by a bare star pattern"
    );
}

#[test]
fn renamed_action_reports_new_path_only() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    catalog.init_layout().unwrap();
    catalog
        .write_bytes("actions/old.yaml", b"description: restart the server\n")
        .unwrap();
    commit_all(dir.path(), "c1");

    git_ok(dir.path(), &["mv", "actions/old.yaml", "actions/new.yaml"]);
    assert_eq!(
        catalog.list_changed("actions/*.yaml").unwrap(),
        vec!["actions/new.yaml"]
    );
}

#[test]
fn subdirectory_root_reports_relative_paths() {
    let dir = init_repo();
    let storage = dir.path().join("storage");
    std::fs::create_dir_all(&storage).unwrap();
    std::fs::write(dir.path().join("outside.yaml"), b"x").unwrap();

    let catalog = GitCatalog::open(&storage).unwrap();
    catalog.init_layout().unwrap();
    catalog
        .write_bytes("actions/ls.yaml", b"description: list files\n")
        .unwrap();

    assert_eq!(catalog.list_changed("actions/*").unwrap(), vec!["actions/ls.yaml"]);
    assert!(!catalog
        .list_changed("*")
        .unwrap()
        .iter()
        .any(|p| p.contains("outside")));
}

#[test]
fn paths_escaping_the_root_are_not_found() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    assert!(!catalog.exists("../etc/passwd"));
    assert!(catalog.read_bytes("../etc/passwd").unwrap_err().is_not_found());
    assert!(catalog.read_bytes("actions/none.yaml").unwrap_err().is_not_found());
}

#[test]
fn action_set_loads_from_git_storage() {
    let dir = init_repo();
    let catalog = GitCatalog::open(dir.path()).unwrap();
    catalog.init_layout().unwrap();
    catalog
        .write_bytes(
            AGENT_CONFIG_PATH,
            b"agent:\n  name: ops\nactions: [restart, shutdown, ps]\n",
        )
        .unwrap();
    catalog
        .write_bytes("actions/restart.yaml", b"description: restart the server\n")
        .unwrap();
    catalog
        .write_bytes("actions/ps.yaml", b"description: list running processes\n")
        .unwrap();

    let config = cobot_catalog::load_or_create_agent_config(&catalog).unwrap();
    assert_eq!(config.agent.name, "ops");
    let set = ActionSet::load(&catalog, &config);
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["restart", "ps"]);
}
