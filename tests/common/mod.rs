//! Shared fixtures for integration tests
//!
//! Builds real upstream git repositories with the git CLI, the same way the
//! library itself drives git.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use srcsync::{Origin, SourceDescriptor, VcsRef};

pub fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(repo)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {args:?} failed in {repo:?}");
}

pub fn git_stdout(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .stderr(Stdio::null())
        .output()
        .expect("Failed to run git");
    assert!(output.status.success(), "git {args:?} failed in {repo:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialize an upstream repository with one commit on `main`.
pub fn init_upstream(path: &Path) {
    std::fs::create_dir_all(path).expect("Failed to create upstream dir");
    git(path, &["init", "-b", "main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    commit(path, "initial commit");
}

/// Add an empty commit to the upstream repository.
pub fn commit(path: &Path, message: &str) {
    git(path, &["commit", "--allow-empty", "-m", message]);
}

pub fn head_commit(path: &Path) -> String {
    git_stdout(path, &["rev-parse", "HEAD"])
}

/// file:// URL for a local upstream; keeps git on the pack protocol so
/// depth-limited fetches behave as they would against a real remote.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub fn branch_descriptor(name: &str, upstream: &Path, source_dir: PathBuf) -> SourceDescriptor {
    SourceDescriptor::new(
        name,
        Origin::Git {
            url: file_url(upstream),
            reference: VcsRef::Branch("main".to_string()),
            commit: None,
            disable_shallow_fetch: false,
        },
        source_dir,
    )
}

pub fn tag_descriptor(
    name: &str,
    upstream: &Path,
    tag: &str,
    source_dir: PathBuf,
) -> SourceDescriptor {
    SourceDescriptor::new(
        name,
        Origin::Git {
            url: file_url(upstream),
            reference: VcsRef::Tag(tag.to_string()),
            commit: None,
            disable_shallow_fetch: false,
        },
        source_dir,
    )
}
