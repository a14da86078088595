//! Status evaluation: is a working copy absent, current, or stale?
//!
//! [`evaluate`] reports one of [`RepoStatus::Good`], [`RepoStatus::Missing`],
//! or [`RepoStatus::Outdated`] without mutating anything beyond read-only
//! subprocess invocations and, when warranted, one network round-trip.
//!
//! Expected non-existence (missing directory, unresolvable ref, unreachable
//! remote) degrades to a conservative answer rather than an error; only a
//! tool that cannot be spawned or emits garbage surfaces as [`SyncError`].

use crate::descriptor::{Origin, SourceDescriptor};
use crate::error::Result;
use crate::vcs;

/// State of a local working copy relative to its declared upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    /// Present and consistent with the descriptor
    Good,
    /// No working copy, or the descriptor's ref is not materialized in it
    Missing,
    /// Present, but the upstream branch has moved past the tracking ref
    Outdated,
}

/// How aggressively to consult the remote during evaluation
///
/// Levels are ordered: each level performs every check of the levels below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RemoteCheck {
    /// Local checks only; upstream movement is invisible
    #[default]
    Skip,
    /// Query the remote for branch refs; tags are assumed immutable
    Branches,
    /// Query the remote for every ref, tags included
    All,
}

fn remote_check_warranted(level: RemoteCheck, is_branch: bool) -> bool {
    match level {
        RemoteCheck::Skip => false,
        RemoteCheck::Branches => is_branch,
        RemoteCheck::All => true,
    }
}

/// Evaluate the status of one source's working copy.
///
/// Never mutates the filesystem. The commit pin record does not participate:
/// a pinned commit affects how a fetch is performed, not whether one is
/// needed.
pub fn evaluate(source: &SourceDescriptor, remote_check: RemoteCheck) -> Result<RepoStatus> {
    match &source.origin {
        // Archives are fetched once and treated as immutable.
        Origin::Archive { .. } => {
            if source.source_archive_file.exists() {
                Ok(RepoStatus::Good)
            } else {
                Ok(RepoStatus::Missing)
            }
        }

        // Working-copy corruption is out of scope; presence is the signal.
        Origin::Subversion { .. } => {
            if source.source_dir.is_dir() {
                Ok(RepoStatus::Good)
            } else {
                Ok(RepoStatus::Missing)
            }
        }

        Origin::Mercurial { reference, .. } => {
            if !source.source_dir.is_dir() {
                return Ok(RepoStatus::Missing);
            }
            if vcs::hg_ref_resolvable(&source.source_dir, reference.name())? {
                Ok(RepoStatus::Good)
            } else {
                Ok(RepoStatus::Missing)
            }
        }

        Origin::Git { url, reference, .. } => {
            // TOCTOU between this check and a later fetch is accepted; we
            // assume users do not concurrently delete working copies.
            if !source.source_dir.is_dir() {
                return Ok(RepoStatus::Missing);
            }

            let Some(local_commit) =
                vcs::git_local_commit(&source.source_dir, &reference.tracking_ref())?
            else {
                return Ok(RepoStatus::Missing);
            };

            if remote_check_warranted(remote_check, reference.is_branch()) {
                tracing::info!(source = %source.name, "checking for remote updates");
                if let Some(remote_commit) = vcs::git_remote_commit(url, &reference.upstream_ref())? {
                    if remote_commit != local_commit {
                        return Ok(RepoStatus::Outdated);
                    }
                }
            }

            Ok(RepoStatus::Good)
        }
    }
}
