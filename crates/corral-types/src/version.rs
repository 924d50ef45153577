use std::fmt;

/// A version that has not yet been bound to a concrete revision.
///
/// These are the three "symbolic" kinds the solver reasons about before it
/// knows what revision they point to; see [`Version::Paired`] for how a
/// symbolic version becomes usable in a lock.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnpairedVersion {
    /// An uninterpreted tag string, e.g. `release-42`.
    Plain(String),
    /// A parsed semantic version.
    Semver(semver::Version),
    /// A branch name, optionally the repository's default branch.
    Branch { name: String, default: bool },
}

impl fmt::Display for UnpairedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(tag) => write!(f, "{tag}"),
            Self::Semver(v) => write!(f, "{v}"),
            Self::Branch { name, .. } => write!(f, "{name}"),
        }
    }
}

/// A symbolic version bound to the revision it currently resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedVersion {
    pub unpaired: UnpairedVersion,
    pub revision: String,
}

impl fmt::Display for PairedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.unpaired, self.revision)
    }
}

/// A version of a project, as produced by listing or selected by the
/// solver.
///
/// Invariant (enforced by the solver, not representable as a type-level
/// guarantee without losing ergonomics): any version the solver selects
/// must be [`Version::Paired`] or a bare [`Version::Revision`] before being
/// emitted in a lock — a dangling [`Version::Unpaired`] in a lock is a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// An opaque VCS revision string, not otherwise tied to a tag or branch.
    Revision(String),
    /// A symbolic version not yet bound to a revision.
    Unpaired(UnpairedVersion),
    /// A symbolic version bound to the revision it resolves to.
    Paired(PairedVersion),
}

impl Version {
    pub fn revision(rev: impl Into<String>) -> Self {
        Self::Revision(rev.into())
    }

    pub fn paired(unpaired: UnpairedVersion, revision: impl Into<String>) -> Self {
        Self::Paired(PairedVersion {
            unpaired,
            revision: revision.into(),
        })
    }

    /// The underlying revision, if this version has been paired (or is
    /// itself a bare revision). `None` for a still-unpaired symbolic
    /// version.
    pub fn underlying_revision(&self) -> Option<&str> {
        match self {
            Self::Revision(rev) => Some(rev),
            Self::Paired(p) => Some(&p.revision),
            Self::Unpaired(_) => None,
        }
    }

    pub fn is_paired(&self) -> bool {
        !matches!(self, Self::Unpaired(_))
    }

    /// The semver value, if this is (or wraps) a semver-typed version.
    pub fn as_semver(&self) -> Option<&semver::Version> {
        match self {
            Self::Unpaired(UnpairedVersion::Semver(v)) => Some(v),
            Self::Paired(PairedVersion {
                unpaired: UnpairedVersion::Semver(v),
                ..
            }) => Some(v),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<(&str, bool)> {
        match self {
            Self::Unpaired(UnpairedVersion::Branch { name, default }) => Some((name, *default)),
            Self::Paired(PairedVersion {
                unpaired: UnpairedVersion::Branch { name, default },
                ..
            }) => Some((name, *default)),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revision(rev) => write!(f, "{rev}"),
            Self::Unpaired(v) => write!(f, "{v}"),
            Self::Paired(p) => write!(f, "{p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_revision_has_itself_as_underlying() {
        let v = Version::revision("deadbeef");
        assert_eq!(v.underlying_revision(), Some("deadbeef"));
    }

    #[test]
    fn unpaired_version_has_no_underlying_revision() {
        let v = Version::Unpaired(UnpairedVersion::Plain("v1".into()));
        assert_eq!(v.underlying_revision(), None);
        assert!(!v.is_paired());
    }

    #[test]
    fn paired_version_exposes_revision_and_semver() {
        let v = Version::paired(
            UnpairedVersion::Semver(semver::Version::new(1, 2, 3)),
            "abc123",
        );
        assert_eq!(v.underlying_revision(), Some("abc123"));
        assert_eq!(v.as_semver(), Some(&semver::Version::new(1, 2, 3)));
        assert!(v.is_paired());
    }
}
