use std::collections::BTreeMap;

/// One parsed package: its declared name, its non-test imports, and its
/// test-only imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
}

/// Why a directory failed to become a healthy [`Package`] entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    #[error("multiple packages found in one directory")]
    MultiplePackage,
    #[error("failed to parse source file: {0}")]
    ParseFailure(String),
    #[error("relative import(s) outside the standard library: {0:?}")]
    LocalImports(Vec<String>),
    #[error("no eligible source files in directory")]
    NoSourceFiles,
}

/// For one source tree rooted at an import prefix: a mapping from import
/// path to either a parsed [`Package`] or the [`PackageError`] that
/// prevented parsing it. A per-path error does not abort analysis of
/// siblings.
#[derive(Debug, Clone, Default)]
pub struct PackageTree {
    entries: BTreeMap<String, Result<Package, PackageError>>,
}

impl PackageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, import_path: impl Into<String>, entry: Result<Package, PackageError>) {
        self.entries.insert(import_path.into(), entry);
    }

    pub fn get(&self, import_path: &str) -> Option<&Result<Package, PackageError>> {
        self.entries.get(import_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Result<Package, PackageError>)> {
        self.entries.iter()
    }

    pub fn healthy_paths(&self) -> impl Iterator<Item = &String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_ok())
            .map(|(path, _)| path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
