use std::path::{Path, PathBuf};

use corral_types::{Package, PackageError, PackageTree};

use crate::source_file::{self, ParsedFile};

/// Walks the tree rooted at `file_root`, producing a [`PackageTree`] whose
/// keys are import paths rooted at `import_root`. One entry is recorded
/// per directory that contains at least one regular file; directories
/// that are pure namespaces (only subdirectories) contribute no entry of
/// their own but are still walked.
pub fn list_packages(file_root: &Path, import_root: &str) -> PackageTree {
    let mut tree = PackageTree::new();
    walk_dir(file_root, file_root, import_root, &mut tree);
    tree
}

fn walk_dir(file_root: &Path, dir: &Path, import_path: &str, tree: &mut PackageTree) {
    let entries = match fs_err::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tree.insert(
                import_path.to_string(),
                Err(PackageError::ParseFailure(err.to_string())),
            );
            return;
        }
    };

    let mut files = Vec::new();
    let mut subdirs: Vec<(String, PathBuf)> = Vec::new();

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        let resolved_dir = if file_type.is_symlink() {
            resolve_symlink_dir(file_root, &path)
        } else if file_type.is_dir() {
            Some(path.clone())
        } else {
            None
        };

        if let Some(target) = resolved_dir {
            if should_skip_dir(&name) {
                continue;
            }
            subdirs.push((name, target));
        } else if file_type.is_symlink() {
            // Symlink to a non-directory, or rejected by the containment
            // check: neither a package file nor a subpackage.
            continue;
        } else {
            files.push(path);
        }
    }

    if !files.is_empty() {
        tree.insert(import_path.to_string(), analyze_directory(&files));
    }

    subdirs.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, subdir_path) in subdirs {
        let child_import = format!("{import_path}/{name}");
        walk_dir(file_root, &subdir_path, &child_import, tree);
    }
}

fn should_skip_dir(name: &str) -> bool {
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

/// Follows a symlink only if its target is relative and stays within
/// `file_root`. Returns `None` for absolute symlinks, symlinks escaping
/// the root, or symlinks to non-directories.
fn resolve_symlink_dir(file_root: &Path, link: &Path) -> Option<PathBuf> {
    let target = fs_err::read_link(link).ok()?;
    if target.is_absolute() {
        return None;
    }
    let resolved = link.parent()?.join(&target);
    if !resolved.is_dir() {
        return None;
    }
    let canonical_target = fs_err::canonicalize(&resolved).ok()?;
    let canonical_root = fs_err::canonicalize(file_root).ok()?;
    canonical_target
        .starts_with(&canonical_root)
        .then_some(canonical_target)
}

/// Strips leading `./`/`../` components off a relative import, so it can
/// be checked against [`crate::is_stdlib`] the way a resolved import
/// would be. A relative import that resolves this way to a standard
/// library path is not actually local at all — e.g. a generated file
/// importing `../fmt` from one directory down.
fn strip_relative_prefix(import: &str) -> &str {
    let mut rest = import;
    loop {
        if let Some(r) = rest.strip_prefix("../") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else {
            break;
        }
    }
    rest
}

fn analyze_directory(files: &[PathBuf]) -> Result<Package, PackageError> {
    let mut parsed: Vec<(PathBuf, ParsedFile)> = Vec::new();
    for path in files {
        let Ok(content) = fs_err::read_to_string(path) else {
            continue;
        };
        if let Some(p) = source_file::parse(&content) {
            parsed.push((path.clone(), p));
        }
    }

    if parsed.is_empty() {
        return Err(PackageError::NoSourceFiles);
    }

    let is_test = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().ends_with("_test"))
            .unwrap_or(false)
    };

    let contributing: Vec<&(PathBuf, ParsedFile)> =
        parsed.iter().filter(|(_, p)| !p.ignore_tagged).collect();

    let package_names: std::collections::BTreeSet<&str> = contributing
        .iter()
        .filter_map(|(_, p)| p.package_name.as_deref())
        .collect();

    if package_names.len() > 1 {
        return Err(PackageError::MultiplePackage);
    }

    let mut imports = Vec::new();
    let mut test_imports = Vec::new();
    let mut local_imports = Vec::new();

    for (path, p) in &parsed {
        let bucket = if is_test(path) {
            &mut test_imports
        } else {
            &mut imports
        };
        for import in &p.imports {
            if source_file::is_local_import(import) {
                let resolved = strip_relative_prefix(import);
                if crate::is_stdlib(resolved) {
                    bucket.push(resolved.to_string());
                } else {
                    local_imports.push(import.clone());
                }
            } else {
                bucket.push(import.clone());
            }
        }
    }

    if !local_imports.is_empty() {
        local_imports.sort();
        local_imports.dedup();
        return Err(PackageError::LocalImports(local_imports));
    }

    let name = package_names
        .into_iter()
        .next()
        .unwrap_or("main")
        .to_string();

    imports.sort();
    imports.dedup();
    test_imports.sort();
    test_imports.dedup();

    Ok(Package {
        name,
        imports,
        test_imports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn single_package_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.src"),
            "package widget\nimport \"example.com/dep\"\n",
        )
        .unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        let pkg = tree.get("example.com/widget").unwrap().as_ref().unwrap();
        assert_eq!(pkg.name, "widget");
        assert_eq!(pkg.imports, vec!["example.com/dep"]);
    }

    #[test]
    fn test_file_imports_are_separated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.src"), "package widget\n").unwrap();
        fs::write(
            dir.path().join("a_test.src"),
            "package widget\nimport \"example.com/testonly\"\n",
        )
        .unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        let pkg = tree.get("example.com/widget").unwrap().as_ref().unwrap();
        assert!(pkg.imports.is_empty());
        assert_eq!(pkg.test_imports, vec!["example.com/testonly"]);
    }

    #[test]
    fn conflicting_packages_without_ignore_tag_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.src"), "package widget\n").unwrap();
        fs::write(dir.path().join("b.src"), "package other\n").unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        assert!(matches!(
            tree.get("example.com/widget").unwrap(),
            Err(PackageError::MultiplePackage)
        ));
    }

    #[test]
    fn ignore_tagged_file_is_excluded_from_multiple_package_check() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.src"), "package widget\n").unwrap();
        fs::write(dir.path().join("b.src"), "// +ignore\npackage other\n").unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        let pkg = tree.get("example.com/widget").unwrap().as_ref().unwrap();
        assert_eq!(pkg.name, "widget");
    }

    #[test]
    fn local_imports_are_flagged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.src"),
            "package widget\nimport \"../sibling\"\n",
        )
        .unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        assert!(matches!(
            tree.get("example.com/widget").unwrap(),
            Err(PackageError::LocalImports(_))
        ));
    }

    #[test]
    fn relative_import_resolving_to_stdlib_is_not_flagged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.src"),
            "package widget\nimport \"../fmt\"\n",
        )
        .unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        let pkg = tree.get("example.com/widget").unwrap().as_ref().unwrap();
        assert_eq!(pkg.imports, vec!["fmt"]);
    }

    #[test]
    fn vendor_and_dotted_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/a.src"), "package ignored\n").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join("testdata")).unwrap();
        fs::write(dir.path().join("a.src"), "package widget\n").unwrap();
        let tree = list_packages(dir.path(), "example.com/widget");
        assert_eq!(tree.len(), 1);
        assert!(tree.get("example.com/widget/vendor").is_none());
    }

    #[test]
    fn namespace_only_directory_contributes_no_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.src"), "package sub\n").unwrap();
        let tree = list_packages(dir.path(), "example.com/root");
        assert!(tree.get("example.com/root").is_none());
        assert!(tree.get("example.com/root/sub").is_some());
    }
}
