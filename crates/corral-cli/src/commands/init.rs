use std::path::Path;

use anyhow::{Context, Result};

use crate::manifest_toml::render_empty_manifest;

use super::{ExitStatus, MANIFEST_FILE_NAME};

/// Writes an empty `corral.toml` naming `root` as the project's own import
/// path. Refuses to clobber an existing manifest.
pub(crate) fn init(workspace_root: &Path, root: &str) -> Result<ExitStatus> {
    let manifest_path = workspace_root.join(MANIFEST_FILE_NAME);
    if manifest_path.exists() {
        anyhow::bail!("{} already exists", manifest_path.display());
    }
    fs_err::write(&manifest_path, render_empty_manifest(root))
        .with_context(|| format!("writing {}", manifest_path.display()))?;
    tracing::info!("wrote {}", manifest_path.display());
    Ok(ExitStatus::Success)
}
