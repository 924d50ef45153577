//! Walks a source tree into a [`PackageTree`](corral_types::PackageTree)
//! and computes the external-import reach of every package in it.
//!
//! The two halves are independent: [`tree::list_packages`] never touches
//! import semantics beyond spotting relative imports, and [`reach`] never
//! touches the filesystem. The solver calls both through [`analyze`].

mod reach;
mod source_file;
mod tree;

use std::path::Path;

use rustc_hash::FxHashSet;

use corral_types::{PackageTree, ReachMap};

pub use reach::{external_reach, is_stdlib, ReachOptions};
pub use tree::list_packages;

/// Walks `file_root` into a package tree rooted at `import_root`, then
/// computes its external reach in one pass. Convenience wrapper around
/// [`list_packages`] and [`external_reach`] for callers that don't need
/// the intermediate tree on its own.
pub fn analyze(
    file_root: &Path,
    import_root: &str,
    ignore: &FxHashSet<String>,
    options: ReachOptions,
) -> (PackageTree, ReachMap) {
    let tree = list_packages(file_root, import_root);
    let reach = external_reach(&tree, ignore, options);
    (tree, reach)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn analyze_combines_walk_and_reach() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.src"),
            "package widget\nimport \"example.com/dep\"\n",
        )
        .unwrap();
        let (tree, reach) = analyze(
            dir.path(),
            "example.com/widget",
            &FxHashSet::default(),
            ReachOptions::default(),
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(
            reach.get("example.com/widget"),
            Some(&["example.com/dep".to_string()][..])
        );
    }
}
