use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use corral_source::ManifestParser;
use corral_types::{
    Constraint, Lock, LockFile, LockedProject, Manifest, ManifestEntry, ProjectProperties, ProjectRoot, Source,
    UnpairedVersion, Version,
};

/// The on-disk shape of `corral.toml`: `constraint`/`override` tables plus
/// the flat `required`/`ignored` import-path lists (spec §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ManifestFile {
    /// The root project's own import path. Not part of spec §6's
    /// recognized-keys list for a dependency entry, but the root manifest
    /// needs to name itself somehow; an unrecognized key elsewhere in the
    /// file is a warning, not an error, so adding this one is harmless to
    /// read back with an older parser.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    constraint: Vec<ManifestEntry>,
    #[serde(default, rename = "override")]
    overrides: Vec<ManifestEntry>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    ignored: Vec<String>,
}

/// Reads just the root project's own import path out of `corral.toml`,
/// without requiring the rest of the file to parse cleanly.
pub fn read_root_name(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    let file: ManifestFile = toml::from_str(text).ok()?;
    file.name
}

/// Parses `corral.toml`/`corral.lock` with the `toml` crate, deliberately
/// kept out of `corral-source` so the library stays agnostic to any one
/// serialization format.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlManifestParser;

impl ManifestParser for TomlManifestParser {
    fn parse_manifest(&self, bytes: &[u8]) -> Option<Manifest> {
        let text = std::str::from_utf8(bytes).ok()?;
        let file: ManifestFile = toml::from_str(text)
            .inspect_err(|err| tracing::warn!("malformed manifest: {err}"))
            .ok()?;

        let mut manifest = Manifest::new();
        for entry in &file.constraint {
            if let Some((root, props)) = entry_to_properties(entry) {
                manifest.dependency_constraints.insert(root, props);
            }
        }
        for entry in &file.overrides {
            if let Some((root, props)) = entry_to_properties(entry) {
                manifest.overrides.insert(root, props);
            }
        }
        manifest.required = file.required;
        manifest.ignored = file.ignored;
        Some(manifest)
    }

    fn parse_lock(&self, bytes: &[u8]) -> Option<Lock> {
        let text = std::str::from_utf8(bytes).ok()?;
        let file: LockFile = toml::from_str(text)
            .inspect_err(|err| tracing::warn!("malformed lock: {err}"))
            .ok()?;

        let projects = file
            .projects
            .iter()
            .map(|p| {
                let version = if let Some(text) = &p.version {
                    match semver::Version::parse(text) {
                        Ok(v) => Version::paired(UnpairedVersion::Semver(v), p.revision.clone()),
                        Err(_) => Version::paired(UnpairedVersion::Plain(text.clone()), p.revision.clone()),
                    }
                } else if let Some(name) = &p.branch {
                    Version::paired(
                        UnpairedVersion::Branch {
                            name: name.clone(),
                            default: false,
                        },
                        p.revision.clone(),
                    )
                } else {
                    Version::revision(p.revision.clone())
                };
                LockedProject::new(ProjectRoot::new(p.name.clone()), version, p.packages.clone())
            })
            .collect();
        Some(Lock::new(file.memo, projects))
    }
}

/// Serializes a [`Lock`] back to `corral.lock`'s TOML shape.
pub fn render_lock(lock: &Lock) -> String {
    let file = LockFile::from(lock);
    toml::to_string_pretty(&file).expect("a Lock always serializes")
}

/// Writes a manifest skeleton for `corral init`.
pub fn render_empty_manifest(root: &str) -> String {
    let file = ManifestFile {
        name: Some(root.to_string()),
        ..ManifestFile::default()
    };
    toml::to_string_pretty(&file).expect("an empty ManifestFile always serializes")
}

fn entry_to_properties(entry: &ManifestEntry) -> Option<(ProjectRoot, ProjectProperties)> {
    let constraint = match (&entry.version, &entry.branch, &entry.revision) {
        (Some(v), None, None) => Constraint::semver_range(v)
            .inspect_err(|err| tracing::warn!("{}: not a semver range ({err}), treating as a tag", entry.name))
            .unwrap_or_else(|_| Constraint::Tag(v.clone())),
        (None, Some(b), None) => Constraint::Branch(b.clone()),
        (None, None, Some(r)) => Constraint::Revision(r.clone()),
        (None, None, None) => Constraint::Any,
        _ => {
            tracing::warn!("{}: exactly one of version/branch/revision may be set", entry.name);
            return None;
        }
    };
    let mut props = ProjectProperties::new(constraint);
    if let Some(source) = &entry.source {
        match Source::parse(source) {
            Ok(source) => props = props.with_source(source),
            Err(err) => tracing::warn!("{}: invalid source url {source}: {err}", entry.name),
        }
    }
    Some((ProjectRoot::new(entry.name.clone()), props))
}

/// Renders a project's constraint back to the abbreviated-revision warning
/// the manifest format calls for (spec §6): any revision entry shorter than
/// a full VCS hash is suspicious enough to flag.
pub fn warn_on_abbreviated_revision(name: &str, revision: &str) {
    if revision.len() < 40 && revision.chars().all(|c| c.is_ascii_hexdigit()) {
        tracing::warn!("{name}: revision {revision} looks abbreviated; prefer the full hash");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_constraint_entry() {
        let toml = r#"
            [[constraint]]
            name = "example.com/a"
            version = "^1.2"
        "#;
        let manifest = TomlManifestParser.parse_manifest(toml.as_bytes()).unwrap();
        let props = manifest
            .dependency_constraints
            .get(&ProjectRoot::new("example.com/a"))
            .unwrap();
        assert_eq!(props.constraint, Constraint::semver_range("^1.2").unwrap());
    }

    #[test]
    fn rejects_an_entry_with_two_version_kinds() {
        let toml = r#"
            [[constraint]]
            name = "example.com/a"
            version = "^1.2"
            branch = "main"
        "#;
        let manifest = TomlManifestParser.parse_manifest(toml.as_bytes()).unwrap();
        assert!(manifest.dependency_constraints.is_empty());
    }

    #[test]
    fn parses_required_and_ignored_lists() {
        let toml = r#"
            required = ["example.com/force"]
            ignored = ["example.com/skip/*"]
        "#;
        let manifest = TomlManifestParser.parse_manifest(toml.as_bytes()).unwrap();
        assert_eq!(manifest.required, vec!["example.com/force".to_string()]);
        assert!(manifest.is_ignored("example.com/skip/sub"));
    }

    #[test]
    fn lock_round_trips_through_toml() {
        let p = LockedProject::new(
            ProjectRoot::new("example.com/a"),
            Version::paired(UnpairedVersion::Semver(semver::Version::new(1, 2, 3)), "deadbeef"),
            vec![".".into()],
        );
        let lock = Lock::new("memo123".into(), vec![p]);
        let rendered = render_lock(&lock);
        let parsed = TomlManifestParser.parse_lock(rendered.as_bytes()).unwrap();
        assert_eq!(parsed.memo, "memo123");
        assert_eq!(parsed.projects[0].root, ProjectRoot::new("example.com/a"));
    }
}
