//! Integration coverage for the package-tree walk and external-reach
//! computation exercised together through [`corral_analyzer::analyze`],
//! the way a resolver caller would use this crate (spec §8's reach
//! monotonicity, ignore-correctness, and cycle-tolerance invariants).

use std::fs;

use rustc_hash::FxHashSet;

use corral_analyzer::{analyze, external_reach, list_packages, ReachOptions};

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn reach_is_transitive_across_local_packages() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    write(dir.path(), "a.src", "package widget\nimport \"example.com/widget/sub\"\n");
    write(&dir.path().join("sub"), "b.src", "package sub\nimport \"example.com/external\"\n");

    let (tree, reach) = analyze(dir.path(), "example.com/widget", &FxHashSet::default(), ReachOptions::default());
    assert_eq!(tree.len(), 2);
    assert_eq!(reach.get("example.com/widget"), Some(&["example.com/external".to_string()][..]));
}

#[test]
fn ignored_package_does_not_contribute_its_imports() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.src", "package widget\nimport \"example.com/widget/internal\"\n");
    fs::create_dir_all(dir.path().join("internal")).unwrap();
    write(&dir.path().join("internal"), "b.src", "package internal\nimport \"example.com/external\"\n");

    let mut ignore = FxHashSet::default();
    ignore.insert("example.com/widget/internal".to_string());

    let (_, reach) = analyze(dir.path(), "example.com/widget", &ignore, ReachOptions::default());
    assert_eq!(reach.get("example.com/widget"), Some(&[][..]));
}

#[test]
fn import_cycles_do_not_hang_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    write(&dir.path().join("a"), "a.src", "package a\nimport \"example.com/cycle/b\"\n");
    write(&dir.path().join("b"), "b.src", "package b\nimport \"example.com/cycle/a\"\n");

    let tree = list_packages(dir.path(), "example.com/cycle");
    let reach = external_reach(&tree, &FxHashSet::default(), ReachOptions::default());
    assert_eq!(reach.get("example.com/cycle/a"), Some(&[][..]));
    assert_eq!(reach.get("example.com/cycle/b"), Some(&[][..]));
}

#[test]
fn relative_import_resolving_to_stdlib_passes_through_analyze() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.src", "package widget\nimport \"../fmt\"\n");

    let (tree, reach) = analyze(dir.path(), "example.com/widget", &FxHashSet::default(), ReachOptions::default());
    let pkg = tree.get("example.com/widget").unwrap().as_ref().unwrap();
    assert_eq!(pkg.imports, vec!["fmt"]);
    assert_eq!(reach.get("example.com/widget"), Some(&[][..]));
}
