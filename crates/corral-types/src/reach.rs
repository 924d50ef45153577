use std::collections::BTreeMap;

/// A mapping from internal import path to the sorted, deduplicated list of
/// external imports transitively reachable from it.
#[derive(Debug, Clone, Default)]
pub struct ReachMap(BTreeMap<String, Vec<String>>);

impl ReachMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, internal_path: impl Into<String>, mut externals: Vec<String>) {
        externals.sort();
        externals.dedup();
        self.0.insert(internal_path.into(), externals);
    }

    pub fn get(&self, internal_path: &str) -> Option<&[String]> {
        self.0.get(internal_path).map(Vec::as_slice)
    }

    /// The union of every package's external reach, i.e. "every external
    /// import reachable from this tree at all" — what the solver uses to
    /// seed its unselected-projects queue from the root.
    pub fn all_externals(&self) -> Vec<String> {
        let mut all: Vec<String> = self.0.values().flatten().cloned().collect();
        all.sort();
        all.dedup();
        all
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
