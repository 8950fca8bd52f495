//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use similar_asserts::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

const CREATED: i64 = 1_600_000_000;
const RENAMED: i64 = 1_600_100_000;
const EDITED: i64 = 1_600_200_000;
const MISC: i64 = 1_600_300_000;

const INTRO: &str = "Spring beans are created by the container.\n\
The container wires every bean and the bean lifecycle is managed by the container.\n";
const MISC_TEXT: &str = "Rust ownership rules: each value has one owner.\n\
Borrowing lets code read a value without taking ownership.\n";

fn postmeta() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("postmeta"))
}

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str], epoch: i64) {
    let date = format!("{epoch} +0000");
    let status = StdCommand::new("git")
        .current_dir(dir)
        .args(["-c", "user.name=Notes", "-c", "user.email=notes@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .status()
        .expect("run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// A Hexo site with two generated posts and, optionally, a notes repository whose history
/// adds `Java/old.md`, renames it to `Java/intro.md`, edits it, then adds `misc.md`.
fn site(with_notes: bool) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("temp site");
    let root = temp.path().to_path_buf();
    fs::write(root.join("package.json"), "{}").expect("package.json");
    fs::write(root.join("_config.yml"), "title: test\n").expect("_config.yml");

    let posts = root.join("source/_posts");
    fs::create_dir_all(posts.join("Java")).expect("mkdir posts");
    fs::write(posts.join("Java/intro.md"), INTRO).expect("write post");
    fs::write(posts.join("misc.md"), MISC_TEXT).expect("write post");

    if with_notes {
        let notes = root.join("notes");
        fs::create_dir_all(notes.join("Java")).expect("mkdir notes");
        git(&notes, &["init", "-q"], CREATED);
        fs::write(notes.join("Java/old.md"), INTRO).expect("write note");
        git(&notes, &["add", "-A"], CREATED);
        git(&notes, &["commit", "-q", "-m", "add"], CREATED);
        git(&notes, &["mv", "Java/old.md", "Java/intro.md"], RENAMED);
        git(&notes, &["commit", "-q", "-m", "rename"], RENAMED);
        fs::write(notes.join("Java/intro.md"), format!("{INTRO}One more line.\n")).expect("edit");
        git(&notes, &["commit", "-q", "-am", "edit"], EDITED);
        fs::write(notes.join("misc.md"), MISC_TEXT).expect("write note");
        git(&notes, &["add", "-A"], MISC);
        git(&notes, &["commit", "-q", "-m", "misc"], MISC);
    }
    (temp, root)
}

fn target_arg(root: &Path) -> String {
    root.join("source/_posts").to_str().expect("utf8 path").to_string()
}

#[test]
fn test_cli_version() {
    postmeta().arg("--version").assert().success().stdout(predicate::str::contains("postmeta"));
}

#[test]
fn test_cli_help() {
    postmeta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hexo front matter"))
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("dates"))
        .stdout(predicate::str::contains("tags"));
}

#[test]
fn test_unknown_tag_method_is_rejected() {
    postmeta()
        .args(["tags", "--tag-method", "lda"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'lda'"));
}

#[test]
fn test_tag_method_aliases_are_accepted() {
    let (_temp, root) = site(false);
    postmeta()
        .args(["tags", "--target", &target_arg(&root), "--tag-method", "TextRank"])
        .assert()
        .success();
}

#[test]
fn test_dates_follow_renames() {
    if !git_available() {
        eprintln!("skipping history test: git not available");
        return;
    }
    let (_temp, root) = site(true);
    let output = postmeta()
        .args(["dates", "--target", &target_arg(&root)])
        .output()
        .expect("run postmeta");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let index: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(index["Java/intro.md"]["created"].as_i64(), Some(CREATED));
    assert_eq!(index["Java/intro.md"]["updated"].as_i64(), Some(EDITED));
    assert_eq!(index["misc.md"]["created"].as_i64(), Some(MISC));
    assert_eq!(index["misc.md"]["updated"].as_i64(), Some(MISC));
}

#[test]
fn test_dates_without_notes_repository_is_empty() {
    let (_temp, root) = site(false);
    postmeta()
        .args(["dates", "--target", &target_arg(&root)])
        .assert()
        .success()
        .stdout(predicate::str::contains("{}"))
        .stderr(predicate::str::contains("notes repository not found"));
}

#[test]
fn test_strict_process_without_notes_repository_fails_on_first_post() {
    let (_temp, root) = site(false);
    postmeta()
        .args(["process", "--target", &target_arg(&root), "--tag-method", "none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no git history found for Java/intro.md"));
    let post = fs::read_to_string(root.join("source/_posts/Java/intro.md")).expect("read post");
    assert_eq!(post, INTRO);
}

#[test]
fn test_relaxed_process_without_notes_repository_uses_timestamp() {
    let (_temp, root) = site(false);
    postmeta()
        .args([
            "process",
            "--target",
            &target_arg(&root),
            "--tag-method",
            "none",
            "--relaxed",
            "--timestamp",
            "0",
        ])
        .env("TZ", "UTC")
        .assert()
        .success()
        .stdout(predicate::str::contains("processed: 2 files"));
    let post = fs::read_to_string(root.join("source/_posts/Java/intro.md")).expect("read post");
    assert!(post.contains("date: \"1970-1-1 00:00:00\"\nupdated: \"1970-1-1 00:00:00\"\n"), "{post}");
}

#[test]
fn test_tags_respect_count_and_budget() {
    let (_temp, root) = site(false);
    let output = postmeta()
        .args(["tags", "--target", &target_arg(&root), "--tag-count", "2", "--tag-budget", "3"])
        .output()
        .expect("run postmeta");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[tags] unique="));

    let tags: Value = serde_json::from_slice(&output.stdout).expect("json output");
    let map = tags.as_object().expect("object");
    assert_eq!(map.len(), 2);
    let mut unique = std::collections::BTreeSet::new();
    for list in map.values() {
        let list = list.as_array().expect("array");
        assert!(list.len() <= 2);
        unique.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
    }
    assert!(unique.len() <= 3);
    assert!(!unique.contains("the"));
}

#[test]
fn test_process_writes_front_matter() {
    if !git_available() {
        eprintln!("skipping history test: git not available");
        return;
    }
    let (_temp, root) = site(true);
    postmeta()
        .args(["process", "--target", &target_arg(&root), "--tag-method", "none"])
        .env("TZ", "UTC")
        .assert()
        .success()
        .stdout(predicate::str::contains("processed: 2 files"));

    let post = fs::read_to_string(root.join("source/_posts/Java/intro.md")).expect("read post");
    assert!(post.starts_with("---\ntitle: \"intro\"\n"), "{post}");
    assert!(post.contains("date: \"2020-9-13 12:26:40\"\n"), "{post}");
    assert!(post.contains("updated: \"2020-9-15 20:00:00\"\n"), "{post}");
    assert!(post.contains("tags: []\ncategories:\n  - \"Java\"\n"), "{post}");
    assert!(post.ends_with(INTRO), "{post}");

    let misc = fs::read_to_string(root.join("source/_posts/misc.md")).expect("read post");
    assert!(misc.contains("categories: []\n"), "{misc}");
    assert!(misc.contains("cover: \"/images/cover/cover-"), "{misc}");
}

#[test]
fn test_process_strict_mode_names_missing_note() {
    if !git_available() {
        eprintln!("skipping history test: git not available");
        return;
    }
    let (_temp, root) = site(true);
    fs::write(root.join("source/_posts/orphan.md"), "no history\n").expect("write post");
    postmeta()
        .args(["process", "--target", &target_arg(&root), "--tag-method", "none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("orphan.md"));
    // Nothing is rewritten when any post lacks history.
    let intro = fs::read_to_string(root.join("source/_posts/Java/intro.md")).expect("read post");
    assert_eq!(intro, INTRO);

    // Relaxed mode falls back to the given timestamp instead.
    postmeta()
        .args([
            "process",
            "--target",
            &target_arg(&root),
            "--tag-method",
            "none",
            "--relaxed",
            "--timestamp",
            "0",
        ])
        .env("TZ", "UTC")
        .assert()
        .success();
    let orphan = fs::read_to_string(root.join("source/_posts/orphan.md")).expect("read post");
    assert!(orphan.contains("date: \"1970-1-1 00:00:00\"\n"), "{orphan}");
}

#[test]
fn test_config_file_is_discovered_at_site_root() {
    let (_temp, root) = site(false);
    fs::write(root.join("postmeta.toml"), "tag_method = 'off'\n").expect("write config");
    let output = postmeta()
        .args(["tags", "--target", &target_arg(&root)])
        .output()
        .expect("run postmeta");
    assert!(output.status.success());
    let tags: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert!(tags.as_object().expect("object").values().all(|v| v.as_array().is_some_and(|a| a.is_empty())));
}
