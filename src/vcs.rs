//! Subprocess plumbing for the external version control tools
//!
//! Every VCS operation is delegated to `git`, `hg`, or `svn` as a black-box
//! subprocess; exit status and output format are part of the contract:
//!
//! - `git show-ref --verify <ref>` prints `"<commit> <ref>"`, exit 0 iff the
//!   ref exists locally
//! - `git ls-remote --exit-code <url> <ref>` prints `"<commit>\t<ref>"`,
//!   exit 0 iff the remote ref exists
//! - `hg manifest --pager never -r <rev>` exits 0 iff the revision resolves
//!
//! A non-zero exit from a query means "the tool reports absence" and is
//! returned as `Ok(None)`. Failing to spawn the tool at all (not installed,
//! exec error) is a fatal [`SyncError`], never silently collapsed.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SyncError};

fn spawn_error(tool: &'static str, err: io::Error) -> SyncError {
    if err.kind() == io::ErrorKind::NotFound {
        SyncError::ToolMissing { tool }
    } else {
        SyncError::ToolSpawnFailed {
            tool,
            reason: err.to_string(),
        }
    }
}

/// Extract and validate the commit hash from `show-ref`/`ls-remote` output.
///
/// Both commands print the 40-hex commit first on the line, separated from
/// the ref path by whitespace.
fn parse_commit(stdout: &str, reference: &str) -> Result<String> {
    let line = stdout
        .lines()
        .next()
        .ok_or_else(|| SyncError::RefParseFailed {
            reference: reference.to_string(),
            reason: "no output".to_string(),
        })?;

    let commit = line
        .split_whitespace()
        .next()
        .ok_or_else(|| SyncError::RefParseFailed {
            reference: reference.to_string(),
            reason: "blank line".to_string(),
        })?;

    if commit.len() != 40 || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SyncError::RefParseFailed {
            reference: reference.to_string(),
            reason: format!("invalid commit hash: {commit}"),
        });
    }

    Ok(commit.to_string())
}

/// Commit at a local git ref via a verified ref lookup.
///
/// Returns `Ok(None)` when the ref does not exist in the repository.
pub(crate) fn git_local_commit(repo_dir: &Path, tracking_ref: &str) -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["show-ref", "--verify", tracking_ref])
        .current_dir(repo_dir)
        .stderr(Stdio::null())
        .output()
        .map_err(|e| spawn_error("git", e))?;

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_commit(&stdout, tracking_ref).map(Some)
}

/// Commit at an upstream git ref, queried without touching the working copy.
///
/// Returns `Ok(None)` when the remote ref does not exist or the query fails
/// (network, auth, absent remote); the caller treats that as "no comparison
/// possible".
pub(crate) fn git_remote_commit(url: &str, upstream_ref: &str) -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["ls-remote", "--exit-code", url, upstream_ref])
        .stderr(Stdio::null())
        .output()
        .map_err(|e| spawn_error("git", e))?;

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_commit(&stdout, upstream_ref).map(Some)
}

/// Whether a mercurial revision resolves inside an existing working copy.
pub(crate) fn hg_ref_resolvable(repo_dir: &Path, rev: &str) -> Result<bool> {
    let status = Command::new("hg")
        .args(["manifest", "--pager", "never", "-r", rev])
        .current_dir(repo_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| spawn_error("hg", e))?;

    Ok(status.success())
}

/// Run a transfer command to completion, inheriting stdio so the tool's own
/// progress output reaches the user. Non-zero exit is fatal.
///
/// Arguments are passed through as `OsStr`: working-copy paths need not be
/// valid UTF-8.
pub(crate) fn run_transfer<I, S>(
    source_name: &str,
    tool: &'static str,
    args: I,
    cwd: Option<&Path>,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<OsString> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_os_string())
        .collect();

    let mut command = Command::new(tool);
    command.args(&args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command.status().map_err(|e| spawn_error(tool, e))?;
    if !status.success() {
        let rendered = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        return Err(SyncError::TransferFailed {
            name: source_name.to_string(),
            reason: format!("{tool} {rendered} exited with {status}"),
        });
    }

    Ok(())
}
