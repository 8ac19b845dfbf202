use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const URL: &str = "https://example.com/acme/widgets.git";

fn git(repo: &Path, args: &[&str]) -> String {
    let out = std::process::Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("git command");
    assert!(out.status.success(), "git {:?} failed", args);
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A workspace with one repository (`widgets`) whose `upstream` remote is `URL`.
fn setup_workspace() -> (TempDir, String) {
    let temp = tempdir().unwrap();
    let repo = temp.path().join("widgets");
    std::fs::create_dir_all(&repo).unwrap();
    git(&repo, &["init"]);
    git(&repo, &["config", "user.email", "test@example.com"]);
    git(&repo, &["config", "user.name", "Test"]);
    std::fs::write(repo.join("a.txt"), "alpha\n").unwrap();
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "-m", "c1"]);
    git(&repo, &["remote", "add", "upstream", URL]);
    let head = git(&repo, &["rev-parse", "HEAD"]);
    (temp, head)
}

#[allow(deprecated)]
fn repolink(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repolink").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("REPOLINK_CONFIG")
        .arg("--quiet");
    cmd
}

#[test]
fn parse_prints_link_event_json() {
    let temp = tempdir().unwrap();
    let output = repolink(temp.path())
        .arg("parse")
        .arg(format!(
            "vscode://eamodio.gitlens/repolink/abc/tag/v1.0?url={URL}"
        ))
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["repo_id"], "abc");
    assert_eq!(body["link_type"], "tag");
    assert_eq!(body["target_id"], "v1.0");
    assert_eq!(body["remote_url"], URL);
}

#[test]
fn parse_rejects_non_deep_links() {
    let temp = tempdir().unwrap();
    repolink(temp.path())
        .arg("parse")
        .arg("vscode://eamodio.gitlens/auth?code=1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse deep link"));
}

#[test]
fn resolve_commit_link_prints_graph_follow_up() {
    let (temp, head) = setup_workspace();
    let output = repolink(temp.path())
        .arg("--search-root")
        .arg(temp.path())
        .arg("resolve")
        .arg(format!(
            "vscode://eamodio.gitlens/repolink/{head}/commit/{head}?url={URL}"
        ))
        .output()
        .expect("run");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("follow-up line");
    let follow_up: Value = serde_json::from_str(first).expect("json follow-up");
    assert_eq!(follow_up["follow_up"], "open_target_in_graph");
    assert_eq!(follow_up["ref"]["sha"], head.as_str());
    assert!(stdout.contains("Deep link resolved:"));
}

#[test]
fn resolve_remote_link_opens_repo_view() {
    let (temp, head) = setup_workspace();
    repolink(temp.path())
        .arg("--repo")
        .arg(temp.path().join("widgets"))
        .arg("resolve")
        .arg(format!("vscode://eamodio.gitlens/repolink/{head}?url={URL}"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""follow_up":"open_repo_view""#));
}

#[test]
fn resolve_unknown_repository_fails() {
    let (temp, _) = setup_workspace();
    repolink(temp.path())
        .arg("--search-root")
        .arg(temp.path())
        .arg("resolve")
        .arg("vscode://eamodio.gitlens/repolink/abc/branch/main?url=https://example.com/other.git")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error resolving deep link: No matching repo found.",
        ));
}

#[test]
fn repos_lists_discovered_repositories_from_config_file() {
    let (temp, _) = setup_workspace();
    let config = temp.path().join("repolink.toml");
    std::fs::write(
        &config,
        format!(
            "[git]\nsearch_roots = [{:?}]\n",
            temp.path().display().to_string()
        ),
    )
    .unwrap();

    let output = repolink(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("repos")
        .output()
        .expect("run");
    assert!(output.status.success(), "{output:?}");

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let repos = body.as_array().expect("array");
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["name"], "widgets");
}

#[test]
fn schema_describes_link_event_fields() {
    let temp = tempdir().unwrap();
    let output = repolink(temp.path()).arg("schema").output().expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let properties = &body["link_event"]["properties"];
    for field in ["repo_id", "link_type", "target_id", "remote_url", "raw_uri"] {
        assert!(properties.get(field).is_some(), "missing {field}");
    }
}
