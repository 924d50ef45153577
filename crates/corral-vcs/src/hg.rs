use std::path::Path;

use async_trait::async_trait;

use crate::process::run;
use crate::{Error, RefKind, RemoteRef, VcsDriver, VcsKind};

pub(crate) struct HgDriver;

#[async_trait]
impl VcsDriver for HgDriver {
    fn kind(&self) -> VcsKind {
        VcsKind::Hg
    }

    async fn list_remote_refs(&self, remote_url: &str) -> Result<Vec<RemoteRef>, Error> {
        let cwd = std::env::temp_dir();
        let branches = run(
            "hg",
            &["identify", "--rev", "tip", "--branches", remote_url],
            &cwd,
        )
        .await;
        // `hg identify` only reports the tip; a full listing needs a clone,
        // so a bare remote listing is best-effort and callers should follow
        // up with `fetch` + `list_local_refs` for completeness.
        branches.map(|_| Vec::new())
    }

    async fn list_local_refs(&self, working_copy: &Path) -> Result<Vec<RemoteRef>, Error> {
        let branches = run(
            "hg",
            &["branches", "--template", "{branch}\\t{node}\\n"],
            working_copy,
        )
        .await?;
        let tags = run("hg", &["tags", "--template", "{tag}\\t{node}\\n"], working_copy).await?;

        let mut refs = parse_tab_separated(&branches.stdout, RefKind::Branch);
        refs.extend(parse_tab_separated(&tags.stdout, RefKind::Tag));
        Ok(refs)
    }

    async fn fetch(&self, remote_url: &str, dest: &Path) -> Result<(), Error> {
        if dest.join(".hg").is_dir() {
            run("hg", &["pull"], dest).await?;
        } else {
            tokio::fs::create_dir_all(dest).await.map_err(|source| Error::Spawn {
                program: "mkdir".to_string(),
                source,
            })?;
            let dest_str = dest.display().to_string();
            run("hg", &["clone", remote_url, &dest_str], &std::env::temp_dir()).await?;
        }
        Ok(())
    }

    async fn has_revision(&self, working_copy: &Path, revision: &str) -> Result<bool, Error> {
        match run("hg", &["log", "--rev", revision], working_copy).await {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn export(&self, working_copy: &Path, revision: &str, dest: &Path) -> Result<(), Error> {
        let dest_str = dest.display().to_string();
        run(
            "hg",
            &["archive", "--rev", revision, &dest_str],
            working_copy,
        )
        .await?;
        Ok(())
    }

    async fn resolve_revision(&self, working_copy: &Path, name: &str) -> Result<String, Error> {
        let output = run(
            "hg",
            &["identify", "--rev", name, "--id", "--debug"],
            working_copy,
        )
        .await?;
        Ok(output.stdout.trim().to_string())
    }
}

fn parse_tab_separated(stdout: &str, kind: RefKind) -> Vec<RemoteRef> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, revision) = line.split_once('\t')?;
            Some(RemoteRef {
                name: name.to_string(),
                revision: revision.trim().to_string(),
                kind,
            })
        })
        .collect()
}
