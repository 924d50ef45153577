use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Keyed mutual exclusion: at most one metadata-mutating operation per key
/// runs at a time, while distinct keys run fully in parallel. Callers that
/// only need to read may skip the gate entirely — it exists to serialize
/// writes, not to protect every access.
pub(crate) struct ProjectGate<K> {
    locks: std::sync::Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> ProjectGate<K> {
    pub(crate) fn new() -> Self {
        Self {
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `key`, creating it on first use. Hold the
    /// returned lock's guard for the duration of the mutating operation.
    pub(crate) fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

impl<K: Eq + Hash + Clone> Default for ProjectGate<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_serializes() {
        let gate: ProjectGate<String> = ProjectGate::new();
        let lock = gate.lock_for(&"a".to_string());
        let _guard = lock.lock().await;
        // A second acquisition attempt on the same key would block here;
        // we just confirm the same Arc is handed back for the same key.
        let lock2 = gate.lock_for(&"a".to_string());
        assert!(Arc::ptr_eq(&lock, &lock2));
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let gate: ProjectGate<String> = ProjectGate::new();
        let a = gate.lock_for(&"a".to_string());
        let b = gate.lock_for(&"b".to_string());
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
