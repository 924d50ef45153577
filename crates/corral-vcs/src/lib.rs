//! Uniform operations over git/hg/bzr/svn working copies.
//!
//! The core never embeds VCS-specific logic above this abstraction: every
//! caller goes through the [`VcsDriver`] trait, and every driver shells out
//! to the corresponding command-line tool rather than linking a VCS
//! library. This mirrors how the source manager is specified to work —
//! "the core invokes per-VCS command-line tools" — and keeps each adapter a
//! thin, auditable translation from driver calls to argv.

mod bzr;
mod error;
mod git;
mod hg;
mod process;
mod svn;

use std::path::Path;

use async_trait::async_trait;

pub use error::Error;
pub use process::ProcessOutput;

/// Which version-control system a [`VcsDriver`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    Hg,
    Bzr,
    Svn,
}

impl VcsKind {
    pub fn program(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
            Self::Bzr => "bzr",
            Self::Svn => "svn",
        }
    }
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// A ref discovered by [`VcsDriver::list_refs`]: a named head (branch or
/// tag) together with the revision it currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub revision: String,
    pub kind: RefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Branch,
    Tag,
}

/// Uniform operations over one VCS, invoked as command-line subprocesses.
///
/// Every method is a suspension point: it may spawn a subprocess and/or
/// touch the network. Implementations must check the passed
/// [`tokio_util::sync::CancellationToken`]-equivalent before spawning (the
/// source manager is responsible for the actual cancellation plumbing; the
/// driver only needs to propagate a cancellation error if asked to run
/// after the caller has already given up — see [`Error::Cancelled`]).
#[async_trait]
pub trait VcsDriver: Send + Sync {
    fn kind(&self) -> VcsKind;

    /// List the remote's branches and tags without requiring a local clone.
    async fn list_remote_refs(&self, remote_url: &str) -> Result<Vec<RemoteRef>, Error>;

    /// List refs from an existing local working copy — used as a fallback
    /// when the network ref listing fails but a clone already exists.
    async fn list_local_refs(&self, working_copy: &Path) -> Result<Vec<RemoteRef>, Error>;

    /// Create a fresh working copy of `remote_url` at `dest`, or update it
    /// in place if `dest` already holds a clone of the same remote.
    async fn fetch(&self, remote_url: &str, dest: &Path) -> Result<(), Error>;

    /// Check whether `revision` is present in the local working copy
    /// without fetching.
    async fn has_revision(&self, working_copy: &Path, revision: &str) -> Result<bool, Error>;

    /// Export the tree at `revision` from `working_copy` into `dest`,
    /// without any VCS metadata directory.
    async fn export(&self, working_copy: &Path, revision: &str, dest: &Path) -> Result<(), Error>;

    /// Resolve a named ref (branch, tag, or abbreviated revision) to its
    /// full revision string.
    async fn resolve_revision(&self, working_copy: &Path, name: &str) -> Result<String, Error>;
}

/// Construct the driver for a given [`VcsKind`], erroring if the
/// corresponding binary cannot be located on `PATH`.
pub fn driver_for(kind: VcsKind) -> Result<Box<dyn VcsDriver>, Error> {
    which::which(kind.program()).map_err(|_| Error::ToolNotFound(kind))?;
    Ok(match kind {
        VcsKind::Git => Box::new(git::GitDriver),
        VcsKind::Hg => Box::new(hg::HgDriver),
        VcsKind::Bzr => Box::new(bzr::BzrDriver),
        VcsKind::Svn => Box::new(svn::SvnDriver),
    })
}
