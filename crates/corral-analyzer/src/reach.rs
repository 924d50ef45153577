use rustc_hash::{FxHashMap, FxHashSet};

use corral_types::{PackageTree, ReachMap};

/// Which import buckets feed the traversal.
#[derive(Debug, Clone, Copy)]
pub struct ReachOptions {
    pub include_main: bool,
    pub include_tests: bool,
}

impl Default for ReachOptions {
    fn default() -> Self {
        Self {
            include_main: true,
            include_tests: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    Active,
    Done,
}

/// Computes, for every healthy internal import path in `tree`, the sorted
/// set of external imports transitively reachable from it. `ignore` names
/// import paths — internal or external — to treat as absent: an ignored
/// external import is elided from reach sets, an ignored internal import
/// behaves as if it doesn't exist (its own reach is never followed).
///
/// A path that (transitively) reaches a package with a recorded error, or
/// an ignored internal package, is poisoned and dropped from the result
/// entirely, along with every ancestor that reaches it. Cycles — an
/// active-to-active revisit during the walk — are tolerated and treated
/// as contributing no further reach from the repeated node.
pub fn external_reach(tree: &PackageTree, ignore: &FxHashSet<String>, options: ReachOptions) -> ReachMap {
    let mut colors: FxHashMap<String, Color> = FxHashMap::default();
    let mut memo: FxHashMap<String, Option<Vec<String>>> = FxHashMap::default();
    let mut map = ReachMap::new();

    for path in tree.healthy_paths() {
        if ignore.contains(path) {
            continue;
        }
        if let Some(externals) = visit(path, tree, ignore, options, &mut colors, &mut memo) {
            map.insert(path.clone(), externals);
        }
    }
    map
}

fn visit(
    path: &str,
    tree: &PackageTree,
    ignore: &FxHashSet<String>,
    options: ReachOptions,
    colors: &mut FxHashMap<String, Color>,
    memo: &mut FxHashMap<String, Option<Vec<String>>>,
) -> Option<Vec<String>> {
    if let Some(cached) = memo.get(path) {
        return cached.clone();
    }
    if ignore.contains(path) {
        return None;
    }

    let color = colors.get(path).copied().unwrap_or(Color::Unvisited);
    if color == Color::Active {
        // Cycle: contribute nothing further from here, don't poison.
        return Some(Vec::new());
    }
    colors.insert(path.to_string(), Color::Active);

    let result = visit_inner(path, tree, ignore, options, colors, memo);

    colors.insert(path.to_string(), Color::Done);
    memo.insert(path.to_string(), result.clone());
    result
}

fn visit_inner(
    path: &str,
    tree: &PackageTree,
    ignore: &FxHashSet<String>,
    options: ReachOptions,
    colors: &mut FxHashMap<String, Color>,
    memo: &mut FxHashMap<String, Option<Vec<String>>>,
) -> Option<Vec<String>> {
    let pkg = match tree.get(path) {
        Some(Ok(pkg)) => pkg,
        _ => return None, // missing or erroring: poisons the caller
    };

    let mut direct_imports: Vec<&String> = Vec::new();
    if options.include_main {
        direct_imports.extend(pkg.imports.iter());
    }
    if options.include_tests {
        direct_imports.extend(pkg.test_imports.iter());
    }

    let mut externals = Vec::new();
    for import in direct_imports {
        if is_stdlib(import) {
            continue;
        }
        if ignore.contains(import) {
            continue;
        }
        if tree.get(import).is_some() {
            // Internal dependency: recurse, propagating poison.
            let child = visit(import, tree, ignore, options, colors, memo)?;
            externals.extend(child);
        } else {
            externals.push(import.clone());
        }
    }

    externals.retain(|e| !ignore.contains(e));
    externals.sort();
    externals.dedup();
    Some(externals)
}

/// An import path whose first segment has no `.` is standard-library and
/// excluded from reach.
pub fn is_stdlib(import_path: &str) -> bool {
    import_path
        .split('/')
        .next()
        .map(|first| !first.contains('.'))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_types::Package;

    fn pkg(imports: &[&str]) -> Result<Package, corral_types::PackageError> {
        Ok(Package {
            name: "p".to_string(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            test_imports: Vec::new(),
        })
    }

    #[test]
    fn stdlib_imports_are_excluded() {
        assert!(is_stdlib("fmt"));
        assert!(is_stdlib("os/exec"));
        assert!(!is_stdlib("example.com/pkg"));
    }

    #[test]
    fn direct_external_reach() {
        let mut tree = PackageTree::new();
        tree.insert("root", pkg(&["example.com/dep", "fmt"]));
        let reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
        assert_eq!(reach.get("root"), Some(&["example.com/dep".to_string()][..]));
    }

    #[test]
    fn transitive_reach_through_internal_packages() {
        let mut tree = PackageTree::new();
        tree.insert("root", pkg(&["root/internal"]));
        tree.insert("root/internal", pkg(&["example.com/dep"]));
        let reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
        assert_eq!(reach.get("root"), Some(&["example.com/dep".to_string()][..]));
    }

    #[test]
    fn cycles_are_tolerated() {
        let mut tree = PackageTree::new();
        tree.insert("a", pkg(&["b"]));
        tree.insert("b", pkg(&["a", "example.com/dep"]));
        let reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
        assert_eq!(reach.get("a"), Some(&["example.com/dep".to_string()][..]));
        assert_eq!(reach.get("b"), Some(&["example.com/dep".to_string()][..]));
    }

    #[test]
    fn erroring_package_poisons_ancestors() {
        let mut tree = PackageTree::new();
        tree.insert("root", pkg(&["root/broken"]));
        tree.insert("root/broken", Err(corral_types::PackageError::NoSourceFiles));
        let reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
        assert!(reach.get("root").is_none());
    }

    #[test]
    fn ignored_internal_package_poisons_ancestors_but_not_itself() {
        let mut tree = PackageTree::new();
        tree.insert("root", pkg(&["root/internal"]));
        tree.insert("root/internal", pkg(&["example.com/dep"]));
        let mut ignore = FxHashSet::default();
        ignore.insert("root/internal".to_string());
        let reach = external_reach(&tree, &ignore, ReachOptions::default());
        assert!(reach.get("root").is_none());
        assert!(reach.get("root/internal").is_none());
    }

    #[test]
    fn ignored_external_import_is_elided() {
        let mut tree = PackageTree::new();
        tree.insert("root", pkg(&["example.com/dep", "example.com/other"]));
        let mut ignore = FxHashSet::default();
        ignore.insert("example.com/dep".to_string());
        let reach = external_reach(&tree, &ignore, ReachOptions::default());
        assert_eq!(reach.get("root"), Some(&["example.com/other".to_string()][..]));
    }

    #[test]
    fn test_imports_only_counted_when_requested() {
        let mut tree = PackageTree::new();
        tree.insert(
            "root",
            Ok(Package {
                name: "p".to_string(),
                imports: vec![],
                test_imports: vec!["example.com/testdep".to_string()],
            }),
        );
        let default_reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
        assert!(default_reach.get("root").unwrap().is_empty());

        let with_tests = external_reach(
            &tree,
            &FxHashSet::default(),
            ReachOptions {
                include_main: true,
                include_tests: true,
            },
        );
        assert_eq!(
            with_tests.get("root"),
            Some(&["example.com/testdep".to_string()][..])
        );
    }
}
