use std::fmt;

use semver::{Comparator, Op};

use crate::version::{PairedVersion, UnpairedVersion};
use crate::Version;

/// A semver range, represented as the flat list of comparators that must
/// all hold. Building our own thin wrapper (rather than using
/// `semver::VersionReq` directly) lets us intersect two ranges by simply
/// concatenating and deduplicating their comparators, which is what the
/// solver needs and what `VersionReq` does not expose.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SemverConstraint(Vec<Comparator>);

impl SemverConstraint {
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn parse(text: &str) -> Result<Self, semver::Error> {
        let req = semver::VersionReq::parse(text)?;
        Ok(Self(canonicalize(req.comparators)))
    }

    pub fn exact(version: &semver::Version) -> Self {
        Self(canonicalize(vec![Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        }]))
    }

    pub fn matches(&self, version: &semver::Version) -> bool {
        self.0.iter().all(|c| c.matches(version))
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for c in &other.0 {
            if !merged.contains(c) {
                merged.push(c.clone());
            }
        }
        Self(canonicalize(merged))
    }
}

/// Sorts and dedups a comparator list so that two semantically identical
/// sets of comparators, built in any order, compare equal under the
/// derived `PartialEq` — needed because `intersect` merges `self`'s and
/// `other`'s comparators in argument order, and `a.intersect(&b)` must
/// equal `b.intersect(&a)`.
fn canonicalize(mut comparators: Vec<Comparator>) -> Vec<Comparator> {
    comparators.sort_by(|a, b| comparator_key(a).cmp(&comparator_key(b)));
    comparators.dedup();
    comparators
}

fn comparator_key(c: &Comparator) -> (u8, u64, u64, u64, String) {
    let op_rank = match c.op {
        Op::Exact => 0,
        Op::Greater => 1,
        Op::GreaterEq => 2,
        Op::Less => 3,
        Op::LessEq => 4,
        Op::Tilde => 5,
        Op::Caret => 6,
        Op::Wildcard => 7,
        _ => 8,
    };
    (op_rank, c.major, c.minor.unwrap_or(0), c.patch.unwrap_or(0), c.pre.to_string())
}

impl fmt::Display for SemverConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "*");
        }
        let rendered = self
            .0
            .iter()
            .map(|c| {
                let op = match c.op {
                    Op::Exact => "=",
                    Op::Greater => ">",
                    Op::GreaterEq => ">=",
                    Op::Less => "<",
                    Op::LessEq => "<=",
                    Op::Tilde => "~",
                    Op::Caret => "^",
                    Op::Wildcard => "",
                    _ => "",
                };
                format!("{op}{}", version_core(c))
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{rendered}")
    }
}

fn version_core(c: &Comparator) -> String {
    let mut s = format!("{}", c.major);
    if let Some(minor) = c.minor {
        s.push_str(&format!(".{minor}"));
        if let Some(patch) = c.patch {
            s.push_str(&format!(".{patch}"));
            if !c.pre.is_empty() {
                s.push_str(&format!("-{}", c.pre));
            }
        }
    }
    s
}

/// A predicate over versions.
///
/// Intersection is total: any two constraints combine into another
/// constraint, possibly [`Constraint::None`]. Constraints of different
/// concrete kinds (a semver range vs. an exact branch, say) are treated as
/// disjoint — nothing can simultaneously be "within `^1.2`" and "exactly
/// branch `main`" — except when both sides happen to name the exact same
/// revision, tag, or branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No restriction; matches any version.
    Any,
    /// Matches nothing.
    None,
    /// A semver range (a single exact version is represented as a
    /// single-comparator range).
    Semver(SemverConstraint),
    /// Exactly this revision.
    Revision(String),
    /// Exactly this tag.
    Tag(String),
    /// Exactly this branch.
    Branch(String),
}

impl Constraint {
    pub fn exact_semver(version: semver::Version) -> Self {
        Self::Semver(SemverConstraint::exact(&version))
    }

    pub fn semver_range(text: &str) -> Result<Self, semver::Error> {
        Ok(Self::Semver(SemverConstraint::parse(text)?))
    }

    /// Intersect two constraints. Commutative and associative; `Any` is the
    /// identity, `None` is the absorbing element.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Any, x) | (x, Self::Any) => x.clone(),
            (Self::None, _) | (_, Self::None) => Self::None,
            (Self::Semver(a), Self::Semver(b)) => Self::Semver(a.intersect(b)),
            (Self::Revision(a), Self::Revision(b)) => {
                if a == b {
                    self.clone()
                } else {
                    Self::None
                }
            }
            (Self::Tag(a), Self::Tag(b)) => {
                if a == b {
                    self.clone()
                } else {
                    Self::None
                }
            }
            (Self::Branch(a), Self::Branch(b)) => {
                if a == b {
                    self.clone()
                } else {
                    Self::None
                }
            }
            _ => Self::None,
        }
    }

    /// Whether `version` satisfies this constraint.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::None => false,
            Self::Semver(range) => version.as_semver().is_some_and(|v| range.matches(v)),
            Self::Revision(rev) => version.underlying_revision() == Some(rev.as_str()),
            Self::Tag(tag) => matches!(
                version,
                Version::Unpaired(UnpairedVersion::Plain(t))
                    | Version::Paired(PairedVersion {
                        unpaired: UnpairedVersion::Plain(t),
                        ..
                    }) if t == tag
            ),
            Self::Branch(name) => version
                .as_branch()
                .is_some_and(|(branch, _default)| branch == name),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::None => write!(f, "<none>"),
            Self::Semver(s) => write!(f, "{s}"),
            Self::Revision(r) => write!(f, "={r}"),
            Self::Tag(t) => write!(f, "={t}"),
            Self::Branch(b) => write!(f, "branch={b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_identity() {
        let c = Constraint::Branch("main".into());
        assert_eq!(c.intersect(&Constraint::Any), c);
        assert_eq!(Constraint::Any.intersect(&c), c);
    }

    #[test]
    fn none_is_absorbing() {
        let c = Constraint::semver_range("^1.2").unwrap();
        assert_eq!(c.intersect(&Constraint::None), Constraint::None);
        assert_eq!(Constraint::None.intersect(&c), Constraint::None);
    }

    #[test]
    fn intersection_is_commutative() {
        let a = Constraint::semver_range("^1.2").unwrap();
        let b = Constraint::semver_range(">=1.2.5").unwrap();
        assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn intersection_is_associative() {
        let a = Constraint::semver_range(">=1.0.0").unwrap();
        let b = Constraint::semver_range("<2.0.0").unwrap();
        let c = Constraint::semver_range(">=1.5.0").unwrap();
        assert_eq!(a.intersect(&b).intersect(&c), a.intersect(&b.intersect(&c)));
    }

    #[test]
    fn disjoint_kinds_intersect_to_none() {
        let a = Constraint::Branch("main".into());
        let b = Constraint::Tag("v1.0.0".into());
        assert_eq!(a.intersect(&b), Constraint::None);
    }

    #[test]
    fn semver_range_matches_semver_version() {
        let c = Constraint::semver_range("^1.2").unwrap();
        let v = Version::Unpaired(UnpairedVersion::Semver(semver::Version::new(1, 3, 0)));
        assert!(c.matches(&v));
        let v2 = Version::Unpaired(UnpairedVersion::Semver(semver::Version::new(2, 0, 0)));
        assert!(!c.matches(&v2));
    }
}
