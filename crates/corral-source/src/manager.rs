use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use corral_pathdeduce::{Deduction, PathDeducer};
use corral_types::{Lock, Manifest, PackageTree, ProjectRoot, Source as UpstreamSource, Version};
use corral_vcs::VcsDriver;

use crate::cache_layout::validate_cache_root;
use crate::error::Error;
use crate::gate::ProjectGate;
use crate::manifest_parser::ManifestParser;
use crate::source::ProjectSource;

#[derive(Clone)]
struct Resolved {
    source: Arc<ProjectSource>,
    vcs: Arc<dyn VcsDriver>,
}

/// The concurrent, per-project metadata and working-copy cache (spec
/// §4.2). Operations on distinct projects run fully in parallel; the
/// [`ProjectGate`] serializes the metadata-mutating steps (cloning,
/// fetching) for any one project, while reads of already-cached data
/// never block on it.
pub struct SourceManager {
    cache_dir: PathBuf,
    temp_root: PathBuf,
    deducer: PathDeducer,
    manifest_parser: Option<Arc<dyn ManifestParser>>,

    gate: ProjectGate<ProjectRoot>,
    resolved: Mutex<FxHashMap<ProjectRoot, Resolved>>,

    shutting_down: AtomicBool,
}

impl std::fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceManager").finish_non_exhaustive()
    }
}

impl SourceManager {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        workspace_paths: &[PathBuf],
        manifest_parser: Option<Arc<dyn ManifestParser>>,
    ) -> Result<Self, Error> {
        let cache_dir = cache_dir.into();
        validate_cache_root(&cache_dir, workspace_paths).map_err(Error::InvalidCacheRoot)?;
        let temp_root = cache_dir.join("tmp");
        fs_err::create_dir_all(&temp_root).map_err(|source| Error::Io {
            path: temp_root.clone(),
            source,
        })?;
        Ok(Self {
            cache_dir,
            temp_root,
            deducer: PathDeducer::new(),
            manifest_parser,
            gate: ProjectGate::new(),
            resolved: Mutex::new(FxHashMap::default()),
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Blocks new work and marks the manager as draining. In-flight
    /// operations are left to finish; idempotent.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    /// Alias kept for callers that treat shutdown as releasing every
    /// project at once; semantically identical to [`Self::shutdown`].
    pub fn release_all(&self) {
        self.shutdown();
    }

    /// Drops the cached state for one project, e.g. after the solver
    /// backtracks past every candidate that used it. Idempotent.
    pub fn release(&self, root: &ProjectRoot) {
        self.resolved.lock().unwrap().remove(root);
    }

    fn check_shutdown(&self) -> Result<(), Error> {
        if self.shutting_down.load(Ordering::SeqCst) {
            Err(Error::ShuttingDown)
        } else {
            Ok(())
        }
    }

    pub async fn deduce_project_root(&self, import_path: &str) -> Result<ProjectRoot, Error> {
        self.check_shutdown()?;
        let deduction = self.deducer.deduce(import_path).await?;
        Ok(deduction.root)
    }

    async fn resolve(&self, root: &ProjectRoot) -> Result<Resolved, Error> {
        self.check_shutdown()?;
        if let Some(r) = self.resolved.lock().unwrap().get(root).cloned() {
            return Ok(r);
        }

        let lock = self.gate.lock_for(root);
        let _guard = lock.lock().await;
        if let Some(r) = self.resolved.lock().unwrap().get(root).cloned() {
            return Ok(r);
        }

        let deduction: Deduction = self
            .deducer
            .deduce(root.as_str())
            .await?;
        for candidate in &deduction.candidates {
            let Ok(driver) = corral_vcs::driver_for(candidate.vcs) else {
                continue;
            };
            let Ok(upstream) = UpstreamSource::parse(&candidate.url) else {
                continue;
            };
            let source = Arc::new(ProjectSource::new(root.clone(), upstream, &self.cache_dir));
            let resolved = Resolved {
                source,
                vcs: Arc::from(driver),
            };
            self.resolved.lock().unwrap().insert(root.clone(), resolved.clone());
            return Ok(resolved);
        }
        Err(Error::NoDeduction(root.clone()))
    }

    /// Registers an explicit upstream override for `root` (e.g. a
    /// manifest `source` field), bypassing path deduction entirely.
    pub fn register_override(&self, root: ProjectRoot, upstream: UpstreamSource, vcs: corral_vcs::VcsKind) -> Result<(), Error> {
        let driver = corral_vcs::driver_for(vcs)?;
        let source = Arc::new(ProjectSource::new(root.clone(), upstream, &self.cache_dir));
        self.resolved.lock().unwrap().insert(
            root,
            Resolved {
                source,
                vcs: Arc::from(driver),
            },
        );
        Ok(())
    }

    pub async fn list_versions(&self, root: &ProjectRoot) -> Result<Vec<Version>, Error> {
        self.check_shutdown()?;
        let resolved = self.resolve(root).await?;
        resolved.source.list_versions(resolved.vcs.as_ref()).await
    }

    pub async fn list_packages(&self, root: &ProjectRoot, version: &Version) -> Result<PackageTree, Error> {
        self.check_shutdown()?;
        let resolved = self.resolve(root).await?;
        let revision = revision_of(version, root)?;
        resolved
            .source
            .package_tree(resolved.vcs.as_ref(), &revision, root.as_str(), &self.temp_root)
            .await
    }

    pub async fn get_manifest_and_lock(
        &self,
        root: &ProjectRoot,
        version: &Version,
    ) -> Result<(Option<Manifest>, Option<Lock>), Error> {
        self.check_shutdown()?;
        let resolved = self.resolve(root).await?;
        let revision = revision_of(version, root)?;
        resolved
            .source
            .manifest_and_lock(
                resolved.vcs.as_ref(),
                &revision,
                self.manifest_parser.as_deref(),
                &self.temp_root,
            )
            .await
    }

    pub async fn revision_present_in(&self, root: &ProjectRoot, revision: &str) -> Result<bool, Error> {
        self.check_shutdown()?;
        let resolved = self.resolve(root).await?;
        resolved.source.revision_present(resolved.vcs.as_ref(), revision).await
    }

    pub async fn export_project(
        &self,
        root: &ProjectRoot,
        version: &Version,
        destination: &Path,
    ) -> Result<(), Error> {
        self.check_shutdown()?;
        let resolved = self.resolve(root).await?;
        let revision = revision_of(version, root)?;
        resolved
            .source
            .export(resolved.vcs.as_ref(), &revision, destination)
            .await
    }
}

fn revision_of(version: &Version, root: &ProjectRoot) -> Result<String, Error> {
    version
        .underlying_revision()
        .map(str::to_string)
        .ok_or_else(|| Error::RevisionNotFound {
            root: root.clone(),
            revision: version.to_string(),
        })
}
