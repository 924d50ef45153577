use regex::Regex;
use std::sync::LazyLock;

use corral_types::ProjectRoot;
use corral_vcs::VcsKind;

use crate::{Deduction, Error, MaybeSource};

/// GitHub-like: `<host>/<user>/<repo>[/...]`. Usernames and repo names are
/// alphanumeric plus hyphens/underscores/dots, no leading/trailing hyphen.
static GITHUB_USER_REPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<user>[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/(?P<repo>[A-Za-z0-9_.-]+)(?P<rest>/.*)?$").unwrap()
});

const GITHUB_LIKE_HOSTS: &[&str] = &["github.com", "gitcorral.com"];
const BITBUCKET_LIKE_HOSTS: &[&str] = &["bitbucket.org"];

/// Matches one of the common forges: GitHub-like (always git), Bitbucket-like
/// (git or hg — both are offered as candidates, in that order, and the
/// source manager accepts whichever one actually exists), Launchpad (bzr
/// or git), Apache, and the IBM-hosted Jazz/RTC hub.
pub(crate) fn well_known_host(import_path: &str) -> Result<Option<Deduction>, Error> {
    for host in GITHUB_LIKE_HOSTS {
        if let Some(rest) = import_path.strip_prefix(&format!("{host}/")) {
            return Ok(Some(github_like(host, rest)?));
        }
    }
    for host in BITBUCKET_LIKE_HOSTS {
        if let Some(rest) = import_path.strip_prefix(&format!("{host}/")) {
            return Ok(Some(bitbucket_like(host, rest)?));
        }
    }
    if let Some(rest) = import_path.strip_prefix("launchpad.net/") {
        return Ok(Some(launchpad(rest)?));
    }
    if let Some(rest) = import_path.strip_prefix("apache.org/") {
        return Ok(Some(apache(rest)?));
    }
    if let Some(rest) = import_path.strip_prefix("hub.jazz.net/") {
        return Ok(Some(ibm_hub(rest)?));
    }
    Ok(None)
}

fn github_like(host: &'static str, rest: &str) -> Result<Deduction, Error> {
    let caps = GITHUB_USER_REPO
        .captures(rest)
        .ok_or(Error::InvalidHostPath { host, path: rest.to_string() })?;
    let user = &caps["user"];
    let repo = &caps["repo"];
    let root = ProjectRoot::new(format!("{host}/{user}/{repo}"));
    Ok(Deduction {
        candidates: vec![MaybeSource {
            url: format!("https://{host}/{user}/{repo}.git"),
            vcs: VcsKind::Git,
        }],
        root,
    })
}

fn bitbucket_like(host: &'static str, rest: &str) -> Result<Deduction, Error> {
    let caps = GITHUB_USER_REPO
        .captures(rest)
        .ok_or(Error::InvalidHostPath { host, path: rest.to_string() })?;
    let user = &caps["user"];
    let repo = &caps["repo"];
    let root = ProjectRoot::new(format!("{host}/{user}/{repo}"));
    Ok(Deduction {
        candidates: vec![
            MaybeSource {
                url: format!("https://{host}/{user}/{repo}.git"),
                vcs: VcsKind::Git,
            },
            MaybeSource {
                url: format!("https://{host}/{user}/{repo}"),
                vcs: VcsKind::Hg,
            },
        ],
        root,
    })
}

fn launchpad(rest: &str) -> Result<Deduction, Error> {
    let project = rest
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(Error::InvalidHostPath {
            host: "launchpad.net",
            path: rest.to_string(),
        })?;
    let root = ProjectRoot::new(format!("launchpad.net/{project}"));
    Ok(Deduction {
        candidates: vec![
            MaybeSource {
                url: format!("https://launchpad.net/{project}"),
                vcs: VcsKind::Bzr,
            },
            MaybeSource {
                url: format!("https://git.launchpad.net/{project}"),
                vcs: VcsKind::Git,
            },
        ],
        root,
    })
}

fn apache(rest: &str) -> Result<Deduction, Error> {
    let project = rest
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(Error::InvalidHostPath {
            host: "apache.org",
            path: rest.to_string(),
        })?;
    let root = ProjectRoot::new(format!("apache.org/{project}"));
    Ok(Deduction {
        candidates: vec![MaybeSource {
            url: format!("https://git.apache.org/{project}.git"),
            vcs: VcsKind::Git,
        }],
        root,
    })
}

fn ibm_hub(rest: &str) -> Result<Deduction, Error> {
    let project = rest
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(Error::InvalidHostPath {
            host: "hub.jazz.net",
            path: rest.to_string(),
        })?;
    let root = ProjectRoot::new(format!("hub.jazz.net/{project}"));
    Ok(Deduction {
        candidates: vec![MaybeSource {
            url: format!("https://hub.jazz.net/git/{project}"),
            vcs: VcsKind::Git,
        }],
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_like_yields_single_git_candidate() {
        let d = well_known_host("github.com/rust-lang/cargo").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "github.com/rust-lang/cargo");
        assert_eq!(d.candidates.len(), 1);
        assert_eq!(d.candidates[0].vcs, VcsKind::Git);
    }

    #[test]
    fn github_like_keeps_subpackage_suffix_out_of_root() {
        let d = well_known_host("github.com/rust-lang/cargo/src/cargo").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "github.com/rust-lang/cargo");
    }

    #[test]
    fn bitbucket_like_offers_git_then_hg() {
        let d = well_known_host("bitbucket.org/foo/bar").unwrap().unwrap();
        assert_eq!(d.candidates.len(), 2);
        assert_eq!(d.candidates[0].vcs, VcsKind::Git);
        assert_eq!(d.candidates[1].vcs, VcsKind::Hg);
    }

    #[test]
    fn launchpad_offers_bzr_then_git() {
        let d = well_known_host("launchpad.net/myproject").unwrap().unwrap();
        assert_eq!(d.candidates[0].vcs, VcsKind::Bzr);
        assert_eq!(d.candidates[1].vcs, VcsKind::Git);
    }

    #[test]
    fn unknown_host_passes() {
        assert!(well_known_host("example.net/foo/bar").unwrap().is_none());
    }
}
