use std::path::Path;

use async_trait::async_trait;

use crate::process::run;
use crate::{Error, RefKind, RemoteRef, VcsDriver, VcsKind};

pub(crate) struct SvnDriver;

#[async_trait]
impl VcsDriver for SvnDriver {
    fn kind(&self) -> VcsKind {
        VcsKind::Svn
    }

    async fn list_remote_refs(&self, remote_url: &str) -> Result<Vec<RemoteRef>, Error> {
        // Subversion has no branch/tag concept at the protocol level — the
        // layout convention (trunk/branches/tags) is a repository policy,
        // not something the driver can assume. Report the HEAD revision of
        // the given URL as a single `head` ref; higher layers that know
        // about a repository's branches/tags layout can call this once per
        // branch URL.
        let output = run(
            "svn",
            &["info", "--show-item", "revision", remote_url],
            &std::env::temp_dir(),
        )
        .await?;
        Ok(vec![RemoteRef {
            name: "head".to_string(),
            revision: output.stdout.trim().to_string(),
            kind: RefKind::Branch,
        }])
    }

    async fn list_local_refs(&self, working_copy: &Path) -> Result<Vec<RemoteRef>, Error> {
        let output = run(
            "svn",
            &["info", "--show-item", "revision"],
            working_copy,
        )
        .await?;
        Ok(vec![RemoteRef {
            name: "head".to_string(),
            revision: output.stdout.trim().to_string(),
            kind: RefKind::Branch,
        }])
    }

    async fn fetch(&self, remote_url: &str, dest: &Path) -> Result<(), Error> {
        if dest.join(".svn").is_dir() {
            run("svn", &["update"], dest).await?;
        } else {
            let dest_str = dest.display().to_string();
            run("svn", &["checkout", remote_url, &dest_str], &std::env::temp_dir()).await?;
        }
        Ok(())
    }

    async fn has_revision(&self, working_copy: &Path, revision: &str) -> Result<bool, Error> {
        match run(
            "svn",
            &["log", "--revision", revision, "--limit", "1"],
            working_copy,
        )
        .await
        {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn export(&self, working_copy: &Path, revision: &str, dest: &Path) -> Result<(), Error> {
        let dest_str = dest.display().to_string();
        let source_url = run("svn", &["info", "--show-item", "url"], working_copy)
            .await?
            .stdout
            .trim()
            .to_string();
        run(
            "svn",
            &["export", "--revision", revision, &source_url, &dest_str],
            working_copy,
        )
        .await?;
        Ok(())
    }

    async fn resolve_revision(&self, working_copy: &Path, name: &str) -> Result<String, Error> {
        if name.chars().all(|c| c.is_ascii_digit()) {
            return Ok(name.to_string());
        }
        let output = run(
            "svn",
            &["info", "--show-item", "revision", "--revision", name],
            working_copy,
        )
        .await?;
        Ok(output.stdout.trim().to_string())
    }
}
