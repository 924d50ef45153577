use std::path::Path;

use async_trait::async_trait;

use crate::process::run;
use crate::{Error, RefKind, RemoteRef, VcsDriver, VcsKind};

pub(crate) struct GitDriver;

#[async_trait]
impl VcsDriver for GitDriver {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    async fn list_remote_refs(&self, remote_url: &str) -> Result<Vec<RemoteRef>, Error> {
        // `git ls-remote` needs a cwd; any existing directory works since it
        // never reads the working tree for a remote listing.
        let cwd = std::env::temp_dir();
        let output = run(
            "git",
            &["ls-remote", "--heads", "--tags", remote_url],
            &cwd,
        )
        .await?;
        Ok(parse_ls_remote(&output.stdout))
    }

    async fn list_local_refs(&self, working_copy: &Path) -> Result<Vec<RemoteRef>, Error> {
        let output = run("git", &["show-ref", "--heads", "--tags"], working_copy).await?;
        Ok(parse_show_ref(&output.stdout))
    }

    async fn fetch(&self, remote_url: &str, dest: &Path) -> Result<(), Error> {
        if dest.join(".git").is_dir() {
            run("git", &["fetch", "--tags", "--force", "origin"], dest).await?;
        } else {
            tokio::fs::create_dir_all(dest).await.map_err(|source| Error::Spawn {
                program: "mkdir".to_string(),
                source,
            })?;
            run(
                "git",
                &["clone", "--bare", remote_url, "."],
                dest,
            )
            .await?;
        }
        Ok(())
    }

    async fn has_revision(&self, working_copy: &Path, revision: &str) -> Result<bool, Error> {
        match run("git", &["cat-file", "-e", revision], working_copy).await {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn export(&self, working_copy: &Path, revision: &str, dest: &Path) -> Result<(), Error> {
        tokio::fs::create_dir_all(dest).await.map_err(|source| Error::Spawn {
            program: "mkdir".to_string(),
            source,
        })?;
        let dest_display = dest.display().to_string();
        run(
            "git",
            &[
                "archive",
                "--format=tar",
                revision,
                "--output",
                &format!("{dest_display}.tar"),
            ],
            working_copy,
        )
        .await?;
        run(
            "tar",
            &["-xf", &format!("{dest_display}.tar"), "-C", &dest_display],
            working_copy,
        )
        .await?;
        let _ = tokio::fs::remove_file(format!("{dest_display}.tar")).await;
        Ok(())
    }

    async fn resolve_revision(&self, working_copy: &Path, name: &str) -> Result<String, Error> {
        let output = run("git", &["rev-parse", name], working_copy).await?;
        Ok(output.stdout.trim().to_string())
    }
}

/// Parse `git ls-remote --heads --tags` output:
/// `<sha>\trefs/heads/<branch>` or `<sha>\trefs/tags/<tag>` (and
/// `<sha>\trefs/tags/<tag>^{}` for the dereferenced tag object, which we
/// prefer over the tag-object sha when both are present).
fn parse_ls_remote(stdout: &str) -> Vec<RemoteRef> {
    parse_ref_lines(stdout)
}

fn parse_show_ref(stdout: &str) -> Vec<RemoteRef> {
    parse_ref_lines(stdout)
}

fn parse_ref_lines(stdout: &str) -> Vec<RemoteRef> {
    let mut refs: Vec<RemoteRef> = Vec::new();
    for line in stdout.lines() {
        let Some((sha, refname)) = line.split_once('\t') else {
            continue;
        };
        let sha = sha.trim();

        if let Some(branch) = refname.strip_prefix("refs/heads/") {
            refs.push(RemoteRef {
                name: branch.to_string(),
                revision: sha.to_string(),
                kind: RefKind::Branch,
            });
        } else if let Some(tag) = refname.strip_prefix("refs/tags/") {
            let dereferenced = tag.strip_suffix("^{}");
            let name = dereferenced.unwrap_or(tag).to_string();

            if dereferenced.is_some() {
                // The peeled commit sha for an annotated tag; replace any
                // earlier entry for the same tag pointing at the tag object.
                if let Some(existing) = refs.iter_mut().find(|r| r.kind == RefKind::Tag && r.name == name) {
                    existing.revision = sha.to_string();
                    continue;
                }
            }

            refs.push(RemoteRef {
                name,
                revision: sha.to_string(),
                kind: RefKind::Tag,
            });
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branches_and_tags() {
        let stdout = "\
abc123\trefs/heads/main\n\
def456\trefs/tags/v1.0.0\n\
111111\trefs/tags/v1.0.0^{}\n";
        let refs = parse_ls_remote(stdout);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "main");
        assert_eq!(refs[0].kind, RefKind::Branch);
        assert_eq!(refs[1].name, "v1.0.0");
        assert_eq!(refs[1].revision, "111111");
        assert_eq!(refs[1].kind, RefKind::Tag);
    }

    #[test]
    fn ignores_malformed_lines() {
        let refs = parse_ls_remote("not-a-valid-line\n");
        assert!(refs.is_empty());
    }
}
