use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use corral_resolver::{solve, ChangePolicy, SolveOptions, SourceManagerBridge};
use corral_source::{ManifestParser, SourceManager};

use crate::manifest_toml::{render_lock, warn_on_abbreviated_revision, TomlManifestParser};
use crate::workspace::{cache_dir, workspace_paths};

use super::root::load_root;
use super::{ExitStatus, LOCK_FILE_NAME};

/// Runs the solver against the working copy and writes the resulting
/// `corral.lock`, reusing an existing one as a pin when present.
pub(crate) async fn ensure(workspace_root: &Path, cache_dir_override: Option<PathBuf>, downgrade: bool) -> Result<ExitStatus> {
    let (root, root_manifest, root_tree) = load_root(workspace_root)?;

    let cache_dir = cache_dir(cache_dir_override)?;
    let manager = Arc::new(
        SourceManager::new(&cache_dir, &workspace_paths(), Some(Arc::new(TomlManifestParser)))
            .context("constructing source manager")?,
    );
    let bridge = SourceManagerBridge::new(manager, root, root_manifest, root_tree);

    let lock_path = workspace_root.join(LOCK_FILE_NAME);
    let prior_lock = fs_err::read(&lock_path)
        .ok()
        .and_then(|bytes| TomlManifestParser.parse_lock(&bytes));

    let policy = if downgrade {
        ChangePolicy::Downgrade
    } else {
        ChangePolicy::Upgrade
    };

    let lock = match solve(&bridge, SolveOptions { policy, prior_lock }).await {
        Ok(lock) => lock,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitStatus::SolveFailure);
        }
    };

    for project in &lock.projects {
        if let Some(revision) = project.version.underlying_revision() {
            warn_on_abbreviated_revision(project.root.as_str(), revision);
        }
    }

    fs_err::write(&lock_path, render_lock(&lock)).with_context(|| format!("writing {}", lock_path.display()))?;
    println!("wrote {} ({} projects, memo {})", lock_path.display(), lock.projects.len(), lock.memo);
    Ok(ExitStatus::Success)
}
