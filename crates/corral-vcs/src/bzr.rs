use std::path::Path;

use async_trait::async_trait;

use crate::process::run;
use crate::{Error, RefKind, RemoteRef, VcsDriver, VcsKind};

pub(crate) struct BzrDriver;

#[async_trait]
impl VcsDriver for BzrDriver {
    fn kind(&self) -> VcsKind {
        VcsKind::Bzr
    }

    async fn list_remote_refs(&self, remote_url: &str) -> Result<Vec<RemoteRef>, Error> {
        // Bazaar branches (Launchpad's native VCS) have no notion of
        // multiple named heads in one remote location the way git/hg do;
        // each URL is itself a single branch. Report that branch's tip
        // under the conventional name `trunk`.
        let output = run("bzr", &["revno", remote_url], &std::env::temp_dir()).await?;
        let revno = output.stdout.trim().to_string();
        Ok(vec![RemoteRef {
            name: "trunk".to_string(),
            revision: revno,
            kind: RefKind::Branch,
        }])
    }

    async fn list_local_refs(&self, working_copy: &Path) -> Result<Vec<RemoteRef>, Error> {
        let output = run("bzr", &["revno"], working_copy).await?;
        Ok(vec![RemoteRef {
            name: "trunk".to_string(),
            revision: output.stdout.trim().to_string(),
            kind: RefKind::Branch,
        }])
    }

    async fn fetch(&self, remote_url: &str, dest: &Path) -> Result<(), Error> {
        if dest.join(".bzr").is_dir() {
            run("bzr", &["pull"], dest).await?;
        } else {
            let dest_str = dest.display().to_string();
            run("bzr", &["branch", remote_url, &dest_str], &std::env::temp_dir()).await?;
        }
        Ok(())
    }

    async fn has_revision(&self, working_copy: &Path, revision: &str) -> Result<bool, Error> {
        match run("bzr", &["log", "--revision", revision], working_copy).await {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn export(&self, working_copy: &Path, revision: &str, dest: &Path) -> Result<(), Error> {
        let dest_str = dest.display().to_string();
        run(
            "bzr",
            &["export", "--revision", revision, &dest_str],
            working_copy,
        )
        .await?;
        Ok(())
    }

    async fn resolve_revision(&self, working_copy: &Path, name: &str) -> Result<String, Error> {
        let output = run("bzr", &["revno", "--revision", name], working_copy).await?;
        Ok(output.stdout.trim().to_string())
    }
}
