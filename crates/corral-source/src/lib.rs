//! The concurrent, per-project source cache (spec §4.2): deduces
//! `ProjectRoot`s, lists versions, exports package trees and manifests at
//! a revision, and materializes working copies on disk.
//!
//! Everything here is safe to call from many tasks at once for distinct
//! projects; within one project, mutating operations (clone, fetch) are
//! serialized by [`gate::ProjectGate`] while cached reads proceed freely.

mod cache_layout;
mod error;
mod existence;
mod gate;
mod lockfile;
mod manager;
mod manifest_parser;
mod source;

pub use corral_pathdeduce::Error as PathDeduceError;
pub use error::Error;
pub use manager::SourceManager;
pub use manifest_parser::ManifestParser;
pub use source::ProjectSource;

#[cfg(test)]
mod tests {
    use super::*;
    use corral_types::ProjectRoot;

    #[tokio::test]
    async fn rejects_cache_dir_overlapping_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("workspace");
        fs_err::create_dir_all(&workspace).unwrap();
        let err = SourceManager::new(&workspace, &[workspace.clone()], None).unwrap_err();
        assert!(matches!(err, Error::InvalidCacheRoot(_)));
    }

    #[tokio::test]
    async fn deduce_project_root_for_well_known_host() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SourceManager::new(dir.path().join("cache"), &[], None).unwrap();
        let root = manager
            .deduce_project_root("github.com/example/widget")
            .await
            .unwrap();
        assert_eq!(root, ProjectRoot::new("github.com/example/widget"));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SourceManager::new(dir.path().join("cache"), &[], None).unwrap();
        let root = ProjectRoot::new("github.com/example/widget");
        manager.release(&root);
        manager.release(&root);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_work() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SourceManager::new(dir.path().join("cache"), &[], None).unwrap();
        manager.shutdown();
        let err = manager
            .deduce_project_root("github.com/example/widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShuttingDown));
    }
}
