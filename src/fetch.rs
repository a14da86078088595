//! Fetch execution: bring a working copy in line with its descriptor
//!
//! [`fetch`] performs the least-cost transfer consistent with correctness:
//! shallow where history can never be needed, full otherwise. Shallow-ness
//! is re-derived on every call from the descriptor, the pin record, and
//! whether this is the first fetch; it is never cached.
//!
//! No retry and no partial-state cleanup happen here. A failed transfer
//! propagates as-is; retry policy belongs to the caller.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

use crate::descriptor::{Origin, PinSet, SourceDescriptor, VcsRef};
use crate::error::{Result, SyncError};
use crate::vcs;

/// Whether this particular fetch may pass `--depth=1`.
///
/// Tags are immutable, so a depth-1 fetch is always sufficient when shallow
/// fetching is allowed at all. Branches may be fetched shallowly only on the
/// very first fetch and only when no commit is pinned: a shallow clone is
/// not guaranteed to contain an arbitrary historical commit, and incremental
/// fetches must pull all new commits without truncating history.
fn depth_limited(
    reference: &VcsRef,
    init: bool,
    disable_shallow_fetch: bool,
    rolling_version: bool,
    pinned: bool,
) -> bool {
    // Rolling versions always keep full history so that later staleness
    // comparisons and arbitrary pins remain valid.
    let shallow = !disable_shallow_fetch && !rolling_version;
    match reference {
        VcsRef::Tag(_) => shallow,
        VcsRef::Branch(_) => shallow && !pinned && init,
    }
}

fn fetch_git(
    source: &SourceDescriptor,
    pins: &PinSet,
    url: &str,
    reference: &VcsRef,
    commit: Option<&str>,
    disable_shallow_fetch: bool,
) -> Result<()> {
    let pinned = commit.is_some() || pins.fixed_commit(&source.name).is_some();

    let init = !source.source_dir.is_dir();
    if init {
        fs::create_dir_all(&source.source_dir)?;
        vcs::run_transfer(&source.name, "git", &["init"], Some(&source.source_dir))?;
        vcs::run_transfer(
            &source.name,
            "git",
            &["remote", "add", "origin", url],
            Some(&source.source_dir),
        )?;
    }

    let mut args: Vec<String> = vec!["fetch".to_string()];
    if depth_limited(
        reference,
        init,
        disable_shallow_fetch,
        source.rolling_version,
        pinned,
    ) {
        args.push("--depth=1".to_string());
    }
    // Fetch from the URL directly rather than through the named remote, so
    // the transfer does not depend on remote-tracking config state.
    args.push(url.to_string());
    args.push(match reference {
        VcsRef::Tag(tag) => format!("refs/tags/{tag}:refs/tags/{tag}"),
        VcsRef::Branch(branch) => format!("refs/heads/{branch}:refs/remotes/origin/{branch}"),
    });

    tracing::debug!(source = %source.name, args = ?args, "running git fetch");
    vcs::run_transfer(&source.name, "git", &args, Some(&source.source_dir))
}

/// Stream the archive URL's response body verbatim into the archive file.
///
/// Overwrites any existing file. An interrupted transfer leaves a truncated
/// file; the caller retries from scratch.
fn download_archive(source: &SourceDescriptor, url: &str) -> Result<()> {
    if let Some(parent) = source.source_archive_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|e| SyncError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let mut file = fs::File::create(&source.source_archive_file)?;
    let mut body = response;
    io::copy(&mut body, &mut file).map_err(|e| SyncError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Bring the working copy of one source into a state consistent with its
/// descriptor.
///
/// Creates the working copy on first invocation and updates it
/// incrementally thereafter; never deletes it. Fails fatally when the
/// required external tool is absent or the transfer subprocess exits
/// non-zero.
pub fn fetch(pins: &PinSet, source: &SourceDescriptor) -> Result<()> {
    match &source.origin {
        Origin::Git {
            url,
            reference,
            commit,
            disable_shallow_fetch,
        } => fetch_git(
            source,
            pins,
            url,
            reference,
            commit.as_deref(),
            *disable_shallow_fetch,
        ),

        Origin::Mercurial { url, .. } => {
            ensure_dir(&source.source_dir)?;
            vcs::run_transfer(
                &source.name,
                "hg",
                [OsStr::new("clone"), OsStr::new(url), source.source_dir.as_os_str()],
                None,
            )
        }

        Origin::Subversion { url } => {
            ensure_dir(&source.source_dir)?;
            vcs::run_transfer(
                &source.name,
                "svn",
                [OsStr::new("co"), OsStr::new(url), source.source_dir.as_os_str()],
                None,
            )
        }

        Origin::Archive { url } => download_archive(source, url),
    }
}
