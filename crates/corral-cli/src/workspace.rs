use std::path::PathBuf;

/// Name of the environment variable locating the developer's source
/// layout: a platform-native list of directories (colon-separated on Unix,
/// semicolon-separated on Windows) searched in order for a project's
/// working copy before falling back to the cache. Named after Go's
/// `GOPATH`, the closest ambient precedent for this kind of import-path
/// workspace.
pub(crate) const WORKSPACE_PATH_VAR: &str = "CORRAL_PATH";

/// Overrides the default cache directory (`dirs::cache_dir()/corral`).
pub(crate) const CACHE_DIR_VAR: &str = "CORRAL_CACHE_DIR";

/// Parses [`WORKSPACE_PATH_VAR`] using the platform's native list
/// separator. Absent or empty means no workspace paths are configured.
pub(crate) fn workspace_paths() -> Vec<PathBuf> {
    std::env::var_os(WORKSPACE_PATH_VAR)
        .map(|value| std::env::split_paths(&value).collect())
        .unwrap_or_default()
}

/// The cache root: `CORRAL_CACHE_DIR` if set, else the platform cache
/// directory's `corral` subdirectory.
pub(crate) fn cache_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(CACHE_DIR_VAR) {
        return Ok(PathBuf::from(dir));
    }
    dirs::cache_dir()
        .map(|dir| dir.join("corral"))
        .ok_or_else(|| anyhow::anyhow!("could not determine a platform cache directory; set {CACHE_DIR_VAR}"))
}
