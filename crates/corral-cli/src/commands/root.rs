use std::path::Path;

use anyhow::{Context, Result};

use corral_analyzer::list_packages;
use corral_types::{Manifest, PackageTree, ProjectRoot};

use crate::manifest_toml::{read_root_name, TomlManifestParser};
use corral_source::ManifestParser;

use super::MANIFEST_FILE_NAME;

/// Reads `corral.toml` and walks the working directory, producing the
/// three things the solver's `Bridge` needs from the root project. Doesn't
/// touch the network or the source manager's cache — everything here is
/// local-filesystem-only.
pub(crate) fn load_root(workspace_root: &Path) -> Result<(ProjectRoot, Manifest, PackageTree)> {
    let manifest_path = workspace_root.join(MANIFEST_FILE_NAME);
    let bytes = fs_err::read(&manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;

    let name = read_root_name(&bytes)
        .ok_or_else(|| anyhow::anyhow!("{MANIFEST_FILE_NAME} is missing a top-level `name`"))?;
    let root = ProjectRoot::new(name);

    let manifest = TomlManifestParser.parse_manifest(&bytes).unwrap_or_default();
    let tree = list_packages(workspace_root, root.as_str());

    Ok((root, manifest, tree))
}
