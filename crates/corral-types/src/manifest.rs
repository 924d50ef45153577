use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::identifier::{ProjectRoot, Source};

/// The value attached to a project name in a manifest: a constraint plus an
/// optional source override.
#[derive(Debug, Clone)]
pub struct ProjectProperties {
    pub constraint: Constraint,
    pub source: Option<Source>,
}

impl ProjectProperties {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// The declarative input describing constraints, overrides, ignores, and
/// required packages for a root project.
///
/// `DependencyConstraints` apply only to direct imports of the root.
/// `Overrides` apply to any project transitively, but per the solver's
/// rules (spec §4.4 step 5) only the *root* project's overrides are ever
/// honored — overrides declared by a non-root manifest are not part of this
/// type at all, since a non-root project's manifest is consulted only for
/// its own `DependencyConstraints`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub dependency_constraints: BTreeMap<ProjectRoot, ProjectProperties>,
    pub overrides: BTreeMap<ProjectRoot, ProjectProperties>,
    pub ignored: Vec<String>,
    pub required: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `import_path` has been explicitly ignored by a literal match
    /// or a `prefix/*`-style glob entry.
    pub fn is_ignored(&self, import_path: &str) -> bool {
        self.ignored.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix("/*") {
                import_path == prefix || import_path.starts_with(&format!("{prefix}/"))
            } else {
                pattern == import_path
            }
        })
    }
}

/// The serializable shape of one manifest entry, matching spec §6's
/// `{name, version|branch|revision, source?, metadata?}`. Exactly one of
/// `version`, `branch`, or `revision` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_matches_literal_and_glob_prefix() {
        let mut manifest = Manifest::new();
        manifest.ignored.push("example.com/foo/internal".into());
        manifest.ignored.push("example.com/bar/*".into());

        assert!(manifest.is_ignored("example.com/foo/internal"));
        assert!(!manifest.is_ignored("example.com/foo/internal/sub"));
        assert!(manifest.is_ignored("example.com/bar/sub"));
        assert!(manifest.is_ignored("example.com/bar"));
        assert!(!manifest.is_ignored("example.com/barnacle"));
    }
}
