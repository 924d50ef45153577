use std::path::Path;

use anyhow::{Context, Result};

use corral_source::ManifestParser;

use crate::manifest_toml::{warn_on_abbreviated_revision, TomlManifestParser};

use super::root::load_root;
use super::{ExitStatus, LOCK_FILE_NAME};

/// Compares the root project's current memo digest against the one
/// recorded in `corral.lock`, without resolving or touching the network.
/// Reports whether the lock is still trustworthy for the working copy as
/// it stands.
pub(crate) fn status(workspace_root: &Path) -> Result<ExitStatus> {
    let (root, manifest, tree) = load_root(workspace_root)?;
    let current = corral_resolver::root_memo(&root, &manifest, &tree);

    let lock_path = workspace_root.join(LOCK_FILE_NAME);
    if !lock_path.exists() {
        println!("no {LOCK_FILE_NAME} found; run `corral ensure` first");
        return Ok(ExitStatus::UserError);
    }
    let bytes = fs_err::read(&lock_path).with_context(|| format!("reading {}", lock_path.display()))?;
    let Some(lock) = TomlManifestParser.parse_lock(&bytes) else {
        println!("{LOCK_FILE_NAME} is malformed");
        return Ok(ExitStatus::UserError);
    };

    for project in &lock.projects {
        if let Some(revision) = project.version.underlying_revision() {
            warn_on_abbreviated_revision(project.root.as_str(), revision);
        }
    }

    if lock.memo == current {
        println!("up to date ({current})");
        Ok(ExitStatus::Success)
    } else {
        println!("stale: lock has {}, workspace now hashes to {current}", lock.memo);
        Ok(ExitStatus::SolveFailure)
    }
}
