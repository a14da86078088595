//! srcsync - source-tree synchronization for build orchestration
//!
//! Given a declarative description of a source repository (git, mercurial,
//! subversion, or plain-archive origin, addressed by tag, branch, or fixed
//! commit pin), this crate answers two questions:
//!
//! - [`status::evaluate`]: is the local working copy absent, current, or
//!   stale relative to its declared upstream?
//! - [`fetch::fetch`]: what is the minimal transfer that brings the working
//!   copy into the desired state?
//!
//! All version control work is delegated to the external `git`, `hg`, and
//! `svn` executables; archive downloads go over plain HTTP(S). Both entry
//! points are stateless across invocations: persistent state lives entirely
//! in the filesystem. Calls are synchronous and blocking, and safe to issue
//! concurrently for *distinct* sources; serializing operations against one
//! source is the caller's responsibility.

pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod status;
mod vcs;

pub use descriptor::{CommitPin, Origin, PinSet, SourceDescriptor, VcsRef};
pub use error::{Result, SyncError};
pub use fetch::fetch;
pub use status::{RemoteCheck, RepoStatus, evaluate};
