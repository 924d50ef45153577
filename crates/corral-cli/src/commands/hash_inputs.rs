use std::path::Path;

use anyhow::Result;

use super::root::load_root;
use super::ExitStatus;

/// Prints the memo digest for the current root project, entirely offline.
pub(crate) fn hash_inputs(workspace_root: &Path) -> Result<ExitStatus> {
    let (root, manifest, tree) = load_root(workspace_root)?;
    let memo = corral_resolver::root_memo(&root, &manifest, &tree);
    println!("{memo}");
    Ok(ExitStatus::Success)
}
