use regex::Regex;
use std::sync::LazyLock;

use corral_types::ProjectRoot;
use corral_vcs::VcsKind;

use crate::{Deduction, Error, MaybeSource};

static GOPKG_VANITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^gopkg\.in/(?:(?P<user>[A-Za-z0-9][A-Za-z0-9-]*)/)?(?P<pkg>[A-Za-z0-9][A-Za-z0-9-]*)\.v(?P<version>[^/]+)(?P<rest>/.*)?$").unwrap()
});

/// gopkg.in-style versioned vanity imports: `gopkg.in/pkg.vN` or
/// `gopkg.in/user/pkg.vN`, where `N` must be a bare non-negative integer —
/// anything else (`v1.2`, `v1beta`) is a malformed vanity suffix, not a
/// host this rule declines to recognize.
pub(crate) fn versioned_vanity(import_path: &str) -> Result<Option<Deduction>, Error> {
    let Some(caps) = GOPKG_VANITY.captures(import_path) else {
        return Ok(None);
    };
    let version = &caps["version"];
    if version.parse::<u32>().is_err() {
        return Err(Error::FractionalVanityVersion {
            path: import_path.to_string(),
            suffix: version.to_string(),
        });
    }
    let pkg = &caps["pkg"];
    let root = match caps.name("user") {
        Some(user) => ProjectRoot::new(format!("gopkg.in/{}/{pkg}.v{version}", user.as_str())),
        None => ProjectRoot::new(format!("gopkg.in/{pkg}.v{version}")),
    };
    let repo_path = match caps.name("user") {
        Some(user) => format!("{}/{pkg}", user.as_str()),
        None => format!("go-{pkg}/{pkg}"),
    };
    Ok(Some(Deduction {
        candidates: vec![MaybeSource {
            url: format!("https://github.com/{repo_path}.git"),
            vcs: VcsKind::Git,
        }],
        root,
    }))
}

const VCS_SUFFIXES: &[(&str, VcsKind)] = &[
    (".git", VcsKind::Git),
    (".hg", VcsKind::Hg),
    (".bzr", VcsKind::Bzr),
    (".svn", VcsKind::Svn),
];

/// An explicit VCS-extension path segment, e.g.
/// `example.com/repo.git/subpkg`. The root is everything up to and
/// including the suffixed segment; anything after is a subpackage import.
/// Multiple suffixed segments in one path is a malformed import, not an
/// ambiguity to silently resolve.
pub(crate) fn vcs_extension_suffix(import_path: &str) -> Result<Option<Deduction>, Error> {
    let mut matches = Vec::new();
    let mut consumed = String::new();
    for (i, segment) in import_path.split('/').enumerate() {
        if i > 0 {
            consumed.push('/');
        }
        consumed.push_str(segment);
        for (suffix, kind) in VCS_SUFFIXES {
            if segment.ends_with(suffix) && segment.len() > suffix.len() {
                matches.push((consumed.clone(), *kind));
            }
        }
    }
    match matches.len() {
        0 => Ok(None),
        1 => {
            let (root_path, kind) = matches.into_iter().next().unwrap();
            let root = ProjectRoot::new(root_path.clone());
            Ok(Some(Deduction {
                candidates: vec![MaybeSource {
                    url: format!("https://{root_path}"),
                    vcs: kind,
                }],
                root,
            }))
        }
        _ => Err(Error::MultipleVcsSuffixes(import_path.to_string())),
    }
}

/// An explicit scheme prefix (`https://host/path`, `ssh://git@host/path`,
/// or the scp-like `user@host:path`). The whole remainder after the scheme
/// becomes the root: there's no further structure to infer.
pub(crate) fn explicit_scheme(import_path: &str) -> Result<Option<Deduction>, Error> {
    if let Some(idx) = import_path.find("://") {
        let scheme = &import_path[..idx];
        let kind = scheme_to_vcs(scheme);
        let rest = &import_path[idx + 3..];
        let root = ProjectRoot::new(rest.to_string());
        return Ok(Some(Deduction {
            candidates: vec![MaybeSource {
                url: import_path.to_string(),
                vcs: kind.unwrap_or(VcsKind::Git),
            }],
            root,
        }));
    }
    if let Some(at_idx) = import_path.find('@') {
        if let Some(colon_idx) = import_path[at_idx..].find(':') {
            let colon_idx = at_idx + colon_idx;
            let host_and_path = &import_path[at_idx + 1..];
            let root = ProjectRoot::new(host_and_path.replacen(':', "/", 1));
            return Ok(Some(Deduction {
                candidates: vec![MaybeSource {
                    url: import_path[..colon_idx].to_string() + ":" + &import_path[colon_idx + 1..],
                    vcs: VcsKind::Git,
                }],
                root,
            }));
        }
    }
    Ok(None)
}

fn scheme_to_vcs(scheme: &str) -> Option<VcsKind> {
    match scheme {
        s if s.contains("git") => Some(VcsKind::Git),
        s if s.contains("hg") => Some(VcsKind::Hg),
        s if s.contains("bzr") => Some(VcsKind::Bzr),
        s if s.contains("svn") => Some(VcsKind::Svn),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gopkg_vanity_without_user() {
        let d = versioned_vanity("gopkg.in/yaml.v2").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "gopkg.in/yaml.v2");
    }

    #[test]
    fn gopkg_vanity_with_user() {
        let d = versioned_vanity("gopkg.in/go-check/check.v1").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "gopkg.in/go-check/check.v1");
    }

    #[test]
    fn gopkg_vanity_rejects_fractional_version() {
        let err = versioned_vanity("gopkg.in/yaml.v1.2").unwrap_err();
        assert!(matches!(err, Error::FractionalVanityVersion { .. }));
    }

    #[test]
    fn vcs_suffix_includes_suffixed_segment_in_root() {
        let d = vcs_extension_suffix("example.com/repo.git/subpkg").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "example.com/repo.git");
    }

    #[test]
    fn vcs_suffix_rejects_multiple_suffixes() {
        let err = vcs_extension_suffix("example.com/a.git/b.hg").unwrap_err();
        assert!(matches!(err, Error::MultipleVcsSuffixes(_)));
    }

    #[test]
    fn vcs_suffix_passes_plain_paths() {
        assert!(vcs_extension_suffix("example.com/plain/path").unwrap().is_none());
    }

    #[test]
    fn explicit_scheme_parses_url_style() {
        let d = explicit_scheme("https://example.com/foo/bar").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "example.com/foo/bar");
        assert_eq!(d.candidates[0].vcs, VcsKind::Git);
    }

    #[test]
    fn explicit_scheme_parses_scp_style() {
        let d = explicit_scheme("git@example.com:foo/bar.git").unwrap().unwrap();
        assert_eq!(d.root.as_str(), "example.com/foo/bar.git");
    }
}
