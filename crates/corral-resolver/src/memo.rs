use sha2::{Digest, Sha256};

use corral_types::{Constraint, Manifest, ProjectRoot};

/// The solver's and analyzer's identities as recorded in the memo: a
/// re-solve is forced whenever either changes, even if every other input
/// is bit-identical.
pub const ANALYZER_NAME_VERSION: &str = concat!("corral-analyzer/", env!("CARGO_PKG_VERSION"));
pub const SOLVER_NAME_VERSION: &str = concat!("corral-resolver/", env!("CARGO_PKG_VERSION"));

/// Computes the deterministic hex digest over every input the solver's
/// output depends on (spec §4.4 "Input hashing"). Changing any field
/// here changes the memo; holding every field fixed reproduces it
/// byte-for-byte, which is what lets a lock be reused without resolving.
pub fn compute(root: &ProjectRoot, manifest: &Manifest, external_imports: &[String]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(b"root:");
    hasher.update(root.as_str().as_bytes());
    hasher.update(b"\n");

    hasher.update(b"constraints:\n");
    for (dep_root, props) in &manifest.dependency_constraints {
        hash_constraint_line(&mut hasher, dep_root, &props.constraint);
    }

    hasher.update(b"overrides:\n");
    for (dep_root, props) in &manifest.overrides {
        hash_constraint_line(&mut hasher, dep_root, &props.constraint);
    }

    hasher.update(b"ignored:\n");
    let mut ignored = manifest.ignored.clone();
    ignored.sort();
    for entry in &ignored {
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }

    hasher.update(b"required:\n");
    let mut required = manifest.required.clone();
    required.sort();
    for entry in &required {
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }

    hasher.update(b"externals:\n");
    let mut externals = external_imports.to_vec();
    externals.sort();
    externals.dedup();
    for entry in &externals {
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }

    hasher.update(b"analyzer:");
    hasher.update(ANALYZER_NAME_VERSION.as_bytes());
    hasher.update(b"\nsolver:");
    hasher.update(SOLVER_NAME_VERSION.as_bytes());

    hex::encode(hasher.finalize())
}

fn hash_constraint_line(hasher: &mut Sha256, root: &ProjectRoot, constraint: &Constraint) {
    hasher.update(root.as_str().as_bytes());
    hasher.update(b"=");
    hasher.update(constraint.to_string().as_bytes());
    hasher.update(b"\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_types::ProjectProperties;

    fn manifest_with(root: &str, constraint: Constraint) -> Manifest {
        let mut manifest = Manifest::new();
        manifest
            .dependency_constraints
            .insert(ProjectRoot::new(root), ProjectProperties::new(constraint));
        manifest
    }

    #[test]
    fn identical_inputs_produce_identical_memo() {
        let root = ProjectRoot::new("example.com/root");
        let manifest = manifest_with("example.com/a", Constraint::Any);
        let externals = vec!["example.com/a".to_string()];
        assert_eq!(
            compute(&root, &manifest, &externals),
            compute(&root, &manifest, &externals)
        );
    }

    #[test]
    fn changing_a_constraint_changes_the_memo() {
        let root = ProjectRoot::new("example.com/root");
        let a = manifest_with("example.com/a", Constraint::Any);
        let b = manifest_with("example.com/a", Constraint::None);
        let externals = vec!["example.com/a".to_string()];
        assert_ne!(compute(&root, &a, &externals), compute(&root, &b, &externals));
    }

    #[test]
    fn unrelated_change_leaves_memo_unchanged() {
        let root = ProjectRoot::new("example.com/root");
        let manifest = manifest_with("example.com/a", Constraint::Any);
        let externals = vec!["example.com/a".to_string()];
        let first = compute(&root, &manifest, &externals);
        let second = compute(&root, &manifest.clone(), &externals.clone());
        assert_eq!(first, second);
    }
}
