use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use rustc_hash::FxHasher;

use corral_types::Source;

/// Computes `<cacheDir>/sources/<sanitized-url>/` for a given upstream
/// source. The sanitized segment keeps the host readable (for operators
/// browsing the cache) and appends a hex digest of the full canonical key
/// so two sources that only differ by path or scheme never collide.
pub(crate) fn working_copy_dir(cache_dir: &Path, source: &Source) -> PathBuf {
    let mut hasher = FxHasher::default();
    source.canonical_key().hash(&mut hasher);
    let digest = hasher.finish();

    let host = source.url().host_str().unwrap_or("unknown-host");
    let readable: String = source
        .url()
        .path()
        .trim_start_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();

    cache_dir
        .join("sources")
        .join(format!("{host}-{readable}-{digest:016x}"))
}

/// Refuses to treat a directory as a valid cache root if it's (or
/// contains) the caller's own workspace path — accidental self-reference
/// would let a "clean cache" operation eat the project being resolved.
pub(crate) fn validate_cache_root(cache_dir: &Path, workspace_paths: &[PathBuf]) -> Result<(), String> {
    for workspace in workspace_paths {
        if cache_dir == workspace || cache_dir.starts_with(workspace) || workspace.starts_with(cache_dir) {
            return Err(format!(
                "cache directory {} overlaps workspace path {}",
                cache_dir.display(),
                workspace.display()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_copy_dir_is_deterministic() {
        let cache = Path::new("/cache");
        let source = Source::parse("https://example.com/foo/bar.git").unwrap();
        let a = working_copy_dir(cache, &source);
        let b = working_copy_dir(cache, &source);
        assert_eq!(a, b);
    }

    #[test]
    fn canonically_equal_sources_share_a_directory() {
        let cache = Path::new("/cache");
        let a = working_copy_dir(cache, &Source::parse("https://github.com/Foo/Bar.git").unwrap());
        let b = working_copy_dir(cache, &Source::parse("https://github.com/foo/bar").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn overlapping_cache_and_workspace_is_rejected() {
        let cache = Path::new("/home/user/project");
        let workspaces = vec![PathBuf::from("/home/user/project")];
        assert!(validate_cache_root(cache, &workspaces).is_err());
    }

    #[test]
    fn disjoint_cache_and_workspace_is_accepted() {
        let cache = Path::new("/home/user/.cache/corral");
        let workspaces = vec![PathBuf::from("/home/user/project")];
        assert!(validate_cache_root(cache, &workspaces).is_ok());
    }
}
