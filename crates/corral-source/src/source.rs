use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use corral_analyzer::{self, ReachOptions};
use corral_types::{Lock, Manifest, PackageTree, ProjectRoot, Source as UpstreamSource, Version};
use corral_vcs::VcsDriver;

use crate::cache_layout::working_copy_dir;
use crate::error::Error;
use crate::existence::ExistenceLevels;
use crate::lockfile::WorkingCopyLock;
use crate::manifest_parser::ManifestParser;

/// All cached state for one upstream project: its working copy on disk
/// plus in-memory caches for the data the solver repeatedly asks for.
/// Reads from the caches never touch the VCS; a cache miss fetches once
/// and fills every relevant cache before returning.
pub struct ProjectSource {
    pub root: ProjectRoot,
    pub upstream: UpstreamSource,
    working_copy: PathBuf,

    existence: Mutex<ExistenceLevels>,
    versions: Mutex<Option<Vec<Version>>>,
    package_trees: Mutex<FxHashMap<String, PackageTree>>,
    manifests: Mutex<FxHashMap<String, Option<Manifest>>>,
    locks: Mutex<FxHashMap<String, Option<Lock>>>,
    revisions: Mutex<FxHashMap<String, String>>,
}

impl ProjectSource {
    pub(crate) fn new(root: ProjectRoot, upstream: UpstreamSource, cache_dir: &Path) -> Self {
        let working_copy = working_copy_dir(cache_dir, &upstream);
        Self {
            root,
            upstream,
            working_copy,
            existence: Mutex::new(ExistenceLevels::default()),
            versions: Mutex::new(None),
            package_trees: Mutex::new(FxHashMap::default()),
            manifests: Mutex::new(FxHashMap::default()),
            locks: Mutex::new(FxHashMap::default()),
            revisions: Mutex::new(FxHashMap::default()),
        }
    }

    pub(crate) fn working_copy(&self) -> &Path {
        &self.working_copy
    }

    /// Ensures the working copy exists on disk, cloning it on first use.
    /// Held under the per-project gate by the caller.
    pub(crate) async fn ensure_cloned(&self, vcs: &dyn VcsDriver) -> Result<(), Error> {
        if self.working_copy.join(".git").exists() || fs_err::read_dir(&self.working_copy).is_ok() {
            let found = {
                let existence = self.existence.lock().unwrap();
                existence.in_cache.found()
            };
            if found == Some(true) {
                return Ok(());
            }
        }
        let _disk_lock = WorkingCopyLock::acquire(&self.working_copy)
            .map_err(|source| Error::Io { path: self.working_copy.clone(), source })?;
        vcs.fetch(self.upstream.url().as_str(), &self.working_copy).await?;
        self.existence.lock().unwrap().in_cache.record(true);
        Ok(())
    }

    /// Lists versions, retrying once via a forced fetch if the cache is
    /// empty or stale. Falls back to local refs if the remote listing
    /// fails but a clone already exists.
    pub(crate) async fn list_versions(&self, vcs: &dyn VcsDriver) -> Result<Vec<Version>, Error> {
        if let Some(cached) = self.versions.lock().unwrap().clone() {
            return Ok(cached);
        }

        let remote_refs = match vcs.list_remote_refs(self.upstream.url().as_str()).await {
            Ok(refs) => Some(refs),
            Err(remote_err) => {
                self.ensure_cloned(vcs).await.map_err(|_| remote_err)?;
                match vcs.list_local_refs(&self.working_copy).await {
                    Ok(refs) => Some(refs),
                    Err(_) => None,
                }
            }
        };

        let refs = match remote_refs {
            Some(refs) => refs,
            None => {
                self.ensure_cloned(vcs).await?;
                vcs.list_remote_refs(self.upstream.url().as_str()).await?
            }
        };

        let mut revisions = self.revisions.lock().unwrap();
        let mut versions = Vec::with_capacity(refs.len());
        for r in &refs {
            revisions.insert(r.name.clone(), r.revision.clone());
            versions.push(match r.kind {
                corral_vcs::RefKind::Tag => {
                    let unpaired = match semver::Version::parse(r.name.trim_start_matches('v')) {
                        Ok(semver) => corral_types::UnpairedVersion::Semver(semver),
                        Err(_) => corral_types::UnpairedVersion::Plain(r.name.clone()),
                    };
                    Version::paired(unpaired, r.revision.clone())
                }
                corral_vcs::RefKind::Branch => Version::paired(
                    corral_types::UnpairedVersion::Branch {
                        name: r.name.clone(),
                        default: r.name == "main" || r.name == "master" || r.name == "trunk",
                    },
                    r.revision.clone(),
                ),
            });
        }
        drop(revisions);

        *self.versions.lock().unwrap() = Some(versions.clone());
        Ok(versions)
    }

    pub(crate) async fn revision_present(
        &self,
        vcs: &dyn VcsDriver,
        revision: &str,
    ) -> Result<bool, Error> {
        self.ensure_cloned(vcs).await?;
        Ok(vcs.has_revision(&self.working_copy, revision).await?)
    }

    pub(crate) async fn export(
        &self,
        vcs: &dyn VcsDriver,
        revision: &str,
        dest: &Path,
    ) -> Result<(), Error> {
        self.ensure_cloned(vcs).await?;
        vcs.export(&self.working_copy, revision, dest).await?;
        Ok(())
    }

    pub(crate) async fn package_tree(
        &self,
        vcs: &dyn VcsDriver,
        revision: &str,
        import_root: &str,
        temp_root: &Path,
    ) -> Result<PackageTree, Error> {
        if let Some(cached) = self.package_trees.lock().unwrap().get(revision) {
            return Ok(cached.clone());
        }
        let export_dir = temp_root.join(revision);
        self.export(vcs, revision, &export_dir).await?;
        let (tree, _) = corral_analyzer::analyze(
            &export_dir,
            import_root,
            &rustc_hash::FxHashSet::default(),
            ReachOptions::default(),
        );
        self.package_trees
            .lock()
            .unwrap()
            .insert(revision.to_string(), tree.clone());
        let _ = fs_err::remove_dir_all(&export_dir);
        Ok(tree)
    }

    pub(crate) async fn manifest_and_lock(
        &self,
        vcs: &dyn VcsDriver,
        revision: &str,
        parser: Option<&dyn ManifestParser>,
        temp_root: &Path,
    ) -> Result<(Option<Manifest>, Option<Lock>), Error> {
        if let (Some(m), Some(l)) = (
            self.manifests.lock().unwrap().get(revision).cloned(),
            self.locks.lock().unwrap().get(revision).cloned(),
        ) {
            return Ok((m, l));
        }
        let Some(parser) = parser else {
            return Ok((None, None));
        };

        let export_dir = temp_root.join(format!("{revision}-manifest"));
        self.export(vcs, revision, &export_dir).await?;
        let manifest = fs_err::read(export_dir.join("corral.toml"))
            .ok()
            .and_then(|bytes| parser.parse_manifest(&bytes));
        let lock = fs_err::read(export_dir.join("corral.lock"))
            .ok()
            .and_then(|bytes| parser.parse_lock(&bytes));
        let _ = fs_err::remove_dir_all(&export_dir);

        self.manifests
            .lock()
            .unwrap()
            .insert(revision.to_string(), manifest.clone());
        self.locks
            .lock()
            .unwrap()
            .insert(revision.to_string(), lock.clone());
        Ok((manifest, lock))
    }
}
