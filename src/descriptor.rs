//! Source descriptors and commit pin records
//!
//! This module defines the data handed over by the manifest layer:
//! - [`SourceDescriptor`]: one upstream source and its local working copy
//! - [`Origin`]: closed sum type over the supported origin kinds
//! - [`VcsRef`]: tag-xor-branch reference for git and mercurial origins
//! - [`PinSet`]: optional fixed-commit record keyed by source name
//!
//! Descriptors are constructed once per process invocation and never mutated
//! by this crate. Making `Origin` and `VcsRef` enums keeps the
//! exactly-one-origin and tag-xor-branch invariants unrepresentable as
//! errors: both the status evaluator and the fetch executor match on them
//! exhaustively, so adding an origin kind is a compile-time-checked change
//! in both places.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;

/// A tag or branch reference within a git or mercurial origin
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VcsRef {
    /// An immutable release tag
    Tag(String),
    /// A branch whose tip may advance
    Branch(String),
}

impl VcsRef {
    /// The bare ref name, without any `refs/` prefix
    pub fn name(&self) -> &str {
        match self {
            VcsRef::Tag(name) | VcsRef::Branch(name) => name,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, VcsRef::Branch(_))
    }

    /// The ref as it exists in the upstream repository
    pub fn upstream_ref(&self) -> String {
        match self {
            VcsRef::Tag(tag) => format!("refs/tags/{tag}"),
            VcsRef::Branch(branch) => format!("refs/heads/{branch}"),
        }
    }

    /// The local ref recording the last-fetched position of the upstream ref.
    ///
    /// For tags the tracking ref and the upstream ref share the same path;
    /// branches are tracked under `refs/remotes/origin/`.
    pub fn tracking_ref(&self) -> String {
        match self {
            VcsRef::Tag(tag) => format!("refs/tags/{tag}"),
            VcsRef::Branch(branch) => format!("refs/remotes/origin/{branch}"),
        }
    }
}

/// Where a source comes from and how to address it upstream
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A git repository, addressed by tag or branch
    Git {
        url: String,

        #[serde(rename = "ref", with = "serde_yaml::with::singleton_map")]
        reference: VcsRef,

        /// Commit pinned in the descriptor itself. Forces full-history
        /// fetches for branch refs (a shallow clone is not guaranteed to
        /// contain an arbitrary historical commit).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        commit: Option<String>,

        #[serde(default)]
        disable_shallow_fetch: bool,
    },

    /// A mercurial repository, addressed by tag or branch
    Mercurial {
        url: String,

        #[serde(rename = "ref", with = "serde_yaml::with::singleton_map")]
        reference: VcsRef,
    },

    /// A subversion repository, checked out in full
    Subversion { url: String },

    /// A plain archive, downloaded once and treated as immutable
    Archive { url: String },
}

/// One declared source: its upstream origin and its local working copy
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceDescriptor {
    /// Identifying name, unique among sources
    pub name: String,

    /// Serialized as a singleton map (`git: {...}`), not a YAML tag, so the
    /// manifest shape stays plain YAML
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub origin: Origin,

    /// True if the tracked branch tip is expected to move and must always
    /// be synchronized with full history available
    #[serde(default)]
    pub rolling_version: bool,

    /// Filesystem path of the working copy
    pub source_dir: PathBuf,

    /// Download target, used only for archive origins
    pub source_archive_file: PathBuf,
}

impl SourceDescriptor {
    /// Create a descriptor with the given origin; flags default to off
    pub fn new(name: impl Into<String>, origin: Origin, source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let source_archive_file = source_dir.with_extension("archive");
        Self {
            name: name.into(),
            origin,
            rolling_version: false,
            source_dir,
            source_archive_file,
        }
    }

    pub fn with_rolling_version(mut self, rolling: bool) -> Self {
        self.rolling_version = rolling;
        self
    }

    pub fn with_archive_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_archive_file = path.into();
        self
    }
}

/// Fixed-commit record for one source
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommitPin {
    /// Commit that must be reachable after fetch, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_commit: Option<String>,
}

/// Commit pins keyed by source name, owned by the orchestrator's lock record
///
/// The on-disk shape mirrors the orchestrator's commit file:
///
/// ```yaml
/// commits:
///   libfoo:
///     fixed_commit: 0123abc...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PinSet {
    #[serde(default)]
    commits: BTreeMap<String, CommitPin>,
}

impl PinSet {
    /// An empty pin set; every lookup misses
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pin set from the orchestrator's YAML commit record
    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// The pinned commit for a source, if any
    pub fn fixed_commit(&self, name: &str) -> Option<&str> {
        self.commits
            .get(name)
            .and_then(|pin| pin.fixed_commit.as_deref())
    }

    /// Record a pin for a source
    pub fn pin(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.commits.insert(
            name.into(),
            CommitPin {
                fixed_commit: Some(commit.into()),
            },
        );
    }
}
