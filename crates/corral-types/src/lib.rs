//! Shared domain types for the corral dependency resolver.
//!
//! Every other crate in the workspace depends on this one for the
//! vocabulary described in the resolver's data model: project identifiers,
//! versions, constraints, manifests, locks, and package trees. Keeping them
//! in one crate means the solver, the source manager, and the analyzer all
//! agree on what a "version" or a "constraint" is without depending on each
//! other.

mod constraint;
mod identifier;
mod lock;
mod manifest;
mod package_tree;
mod reach;
mod version;

pub use constraint::{Constraint, SemverConstraint};
pub use identifier::{ProjectRoot, Source};
pub use lock::{Lock, LockFile, LockedProject, LockedProjectFile};
pub use manifest::{Manifest, ManifestEntry, ProjectProperties};
pub use package_tree::{Package, PackageError, PackageTree};
pub use reach::ReachMap;
pub use version::{PairedVersion, UnpairedVersion, Version};

/// A project identifier: a `ProjectRoot` plus an optional upstream `Source`
/// override. Per the data model, two identifiers compare equal exactly when
/// their `ProjectRoot`s match; the `Source` is reconciled separately by
/// whoever owns identity (only the root project's overrides, per the
/// solver's rules).
#[derive(Debug, Clone)]
pub struct ProjectIdentifier {
    pub root: ProjectRoot,
    pub source: Option<Source>,
}

impl ProjectIdentifier {
    pub fn new(root: ProjectRoot) -> Self {
        Self { root, source: None }
    }

    pub fn with_source(root: ProjectRoot, source: Source) -> Self {
        Self {
            root,
            source: Some(source),
        }
    }
}

impl PartialEq for ProjectIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for ProjectIdentifier {}

impl std::hash::Hash for ProjectIdentifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

impl PartialOrd for ProjectIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.root.cmp(&other.root)
    }
}

impl std::fmt::Display for ProjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
