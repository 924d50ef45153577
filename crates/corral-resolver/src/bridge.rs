use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use corral_source::SourceManager;
use corral_types::{Lock, Manifest, PackageTree, ProjectRoot, Version};

/// Everything the solver needs from the outside world, narrowed to five
/// calls so its own unit tests can swap in a fixture (spec §4.5). The
/// root project is special-cased here, not in the solver: the source
/// manager has no notion of "the project being resolved", only of
/// upstream projects it can fetch.
#[async_trait]
pub trait Bridge: Send + Sync {
    fn root(&self) -> &ProjectRoot;
    fn root_manifest(&self) -> &Manifest;
    fn root_tree(&self) -> &PackageTree;

    async fn list_versions(&self, root: &ProjectRoot) -> Result<Vec<Version>, BridgeError>;
    async fn list_packages(&self, root: &ProjectRoot, version: &Version) -> Result<PackageTree, BridgeError>;
    async fn get_manifest_and_lock(
        &self,
        root: &ProjectRoot,
        version: &Version,
    ) -> Result<(Option<Manifest>, Option<Lock>), BridgeError>;
    async fn revision_present_in(&self, root: &ProjectRoot, revision: &str) -> Result<bool, BridgeError>;
    async fn deduce_project_root(&self, import_path: &str) -> Result<ProjectRoot, BridgeError>;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BridgeError(pub String);

impl From<corral_source::Error> for BridgeError {
    fn from(err: corral_source::Error) -> Self {
        Self(err.to_string())
    }
}

/// The production [`Bridge`]: the root project's tree/manifest are held
/// directly, everything else is delegated to a [`SourceManager`]. Source
/// overrides declared in the root manifest are registered with the
/// manager lazily, the first time the solver asks about that project —
/// not every non-root manifest's overrides, which the solver never even
/// sees through this interface.
pub struct SourceManagerBridge {
    manager: Arc<SourceManager>,
    root: ProjectRoot,
    root_manifest: Manifest,
    root_tree: PackageTree,
    applied_overrides: Mutex<HashSet<ProjectRoot>>,
}

impl SourceManagerBridge {
    pub fn new(
        manager: Arc<SourceManager>,
        root: ProjectRoot,
        root_manifest: Manifest,
        root_tree: PackageTree,
    ) -> Self {
        Self {
            manager,
            root,
            root_manifest,
            root_tree,
            applied_overrides: Mutex::new(HashSet::new()),
        }
    }

    async fn apply_override_if_needed(&self, root: &ProjectRoot) -> Result<(), BridgeError> {
        if root == &self.root {
            return Ok(());
        }
        if self.applied_overrides.lock().unwrap().contains(root) {
            return Ok(());
        }
        if let Some(props) = self.root_manifest.overrides.get(root) {
            if let Some(source) = &props.source {
                self.manager
                    .register_override(root.clone(), source.clone(), corral_vcs_default_kind())
                    .map_err(BridgeError::from)?;
            }
        }
        self.applied_overrides.lock().unwrap().insert(root.clone());
        Ok(())
    }
}

/// Overrides declared in a manifest don't carry a VCS kind (spec §6's
/// manifest shape has no such field); git covers the overwhelming
/// majority of override use cases (pinning a fork or a local mirror), so
/// it's the default used when an override supplies only a URL.
fn corral_vcs_default_kind() -> corral_vcs::VcsKind {
    corral_vcs::VcsKind::Git
}

#[async_trait]
impl Bridge for SourceManagerBridge {
    fn root(&self) -> &ProjectRoot {
        &self.root
    }

    fn root_manifest(&self) -> &Manifest {
        &self.root_manifest
    }

    fn root_tree(&self) -> &PackageTree {
        &self.root_tree
    }

    async fn list_versions(&self, root: &ProjectRoot) -> Result<Vec<Version>, BridgeError> {
        self.apply_override_if_needed(root).await?;
        Ok(self.manager.list_versions(root).await?)
    }

    async fn list_packages(&self, root: &ProjectRoot, version: &Version) -> Result<PackageTree, BridgeError> {
        if root == &self.root {
            return Ok(self.root_tree.clone());
        }
        Ok(self.manager.list_packages(root, version).await?)
    }

    async fn get_manifest_and_lock(
        &self,
        root: &ProjectRoot,
        version: &Version,
    ) -> Result<(Option<Manifest>, Option<Lock>), BridgeError> {
        if root == &self.root {
            return Ok((Some(self.root_manifest.clone()), None));
        }
        Ok(self.manager.get_manifest_and_lock(root, version).await?)
    }

    async fn revision_present_in(&self, root: &ProjectRoot, revision: &str) -> Result<bool, BridgeError> {
        Ok(self.manager.revision_present_in(root, revision).await?)
    }

    async fn deduce_project_root(&self, import_path: &str) -> Result<ProjectRoot, BridgeError> {
        if self.root.owns(import_path) {
            return Ok(self.root.clone());
        }
        Ok(self.manager.deduce_project_root(import_path).await?)
    }
}
