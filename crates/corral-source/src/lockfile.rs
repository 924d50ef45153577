use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use fs_err::File;

/// Advisory, cross-process exclusive lock on a working copy's on-disk
/// directory, held via a sidecar `.lock` file. Unlike [`crate::gate`]'s
/// in-process mutexes, this also protects against two separate
/// invocations of the binary racing on the same clone.
pub(crate) struct WorkingCopyLock(File);

impl WorkingCopyLock {
    pub(crate) fn acquire(working_copy_dir: &Path) -> io::Result<Self> {
        fs_err::create_dir_all(working_copy_dir)?;
        let lock_path: PathBuf = working_copy_dir.join(".corral-lock");
        let file = File::create(lock_path)?;
        file.file().lock_exclusive()?;
        Ok(Self(file))
    }
}

impl Drop for WorkingCopyLock {
    fn drop(&mut self) {
        if let Err(err) = self.0.file().unlock() {
            tracing::error!(
                "failed to release working-copy lock at {}: {err}",
                self.0.path().display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let lock = WorkingCopyLock::acquire(dir.path()).unwrap();
        assert!(dir.path().join(".corral-lock").exists());
        drop(lock);
    }
}
