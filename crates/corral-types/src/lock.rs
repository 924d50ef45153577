use serde::{Deserialize, Serialize};

use crate::identifier::{ProjectRoot, Source};
use crate::version::Version;

/// One resolved project in a [`Lock`].
#[derive(Debug, Clone)]
pub struct LockedProject {
    pub root: ProjectRoot,
    pub source: Option<Source>,
    pub version: Version,
    /// Sub-package relative paths within the project that were reached,
    /// sorted and deduplicated. Contains `"."` for the project root itself.
    pub packages: Vec<String>,
}

impl LockedProject {
    pub fn new(root: ProjectRoot, version: Version, mut packages: Vec<String>) -> Self {
        packages.sort();
        packages.dedup();
        Self {
            root,
            source: None,
            version,
            packages,
        }
    }
}

/// The solver's output: an ordered list of [`LockedProject`]s and the memo
/// digest of the inputs that produced them.
///
/// Two locks are considered equal for the idempotence invariant (spec §8)
/// when their projects match in order and content — the memo alone is not
/// sufficient, since a caller could hand-edit a lock without changing its
/// inputs.
#[derive(Debug, Clone, Default)]
pub struct Lock {
    pub memo: String,
    pub projects: Vec<LockedProject>,
}

impl Lock {
    pub fn new(memo: String, mut projects: Vec<LockedProject>) -> Self {
        projects.sort_by(|a, b| a.root.cmp(&b.root));
        Self { memo, projects }
    }

    pub fn find(&self, root: &ProjectRoot) -> Option<&LockedProject> {
        self.projects.iter().find(|p| &p.root == root)
    }
}

/// The on-disk shape of a [`LockedProject`], matching spec §6:
/// `{name, version?, branch?, revision, packages: [relative-path]}`.
/// At least `revision` must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedProjectFile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub revision: String,
    pub packages: Vec<String>,
}

/// The on-disk shape of a [`Lock`]: `{memo, projects: [LockedProjectFile]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockFile {
    pub memo: String,
    pub projects: Vec<LockedProjectFile>,
}

impl From<&LockedProject> for LockedProjectFile {
    fn from(p: &LockedProject) -> Self {
        let revision = p
            .version
            .underlying_revision()
            .expect("a locked project's version must be paired with a revision")
            .to_string();
        let (version, branch) = match &p.version {
            Version::Paired(paired) => match &paired.unpaired {
                crate::version::UnpairedVersion::Semver(v) => (Some(v.to_string()), None),
                crate::version::UnpairedVersion::Plain(t) => (Some(t.clone()), None),
                crate::version::UnpairedVersion::Branch { name, .. } => (None, Some(name.clone())),
            },
            Version::Revision(_) | Version::Unpaired(_) => (None, None),
        };
        Self {
            name: p.root.to_string(),
            version,
            branch,
            revision,
            packages: p.packages.clone(),
        }
    }
}

impl From<&Lock> for LockFile {
    fn from(lock: &Lock) -> Self {
        Self {
            memo: lock.memo.clone(),
            projects: lock.projects.iter().map(LockedProjectFile::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::UnpairedVersion;

    #[test]
    fn locked_project_sorts_and_dedups_packages() {
        let p = LockedProject::new(
            ProjectRoot::new("example.com/foo"),
            Version::revision("abc"),
            vec!["b".into(), "a".into(), "a".into()],
        );
        assert_eq!(p.packages, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn lock_file_round_trips_semver() {
        let p = LockedProject::new(
            ProjectRoot::new("example.com/foo"),
            Version::paired(UnpairedVersion::Semver(semver::Version::new(1, 2, 3)), "deadbeef"),
            vec![".".into()],
        );
        let lock = Lock::new("memo123".into(), vec![p]);
        let file = LockFile::from(&lock);
        assert_eq!(file.memo, "memo123");
        assert_eq!(file.projects[0].version.as_deref(), Some("1.2.3"));
        assert_eq!(file.projects[0].revision, "deadbeef");
    }
}
