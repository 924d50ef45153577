use std::fmt;
use std::hash::{Hash, Hasher};

use url::Url;

/// The canonical import-path prefix that a tree of packages belongs to.
///
/// Bit-identical across all contexts: two `ProjectRoot`s are the same
/// project if and only if their strings match exactly. Normalization (case,
/// trailing slashes, `.git` suffixes) happens on the `Source` side, not
/// here — the root is the stable key the rest of the system indexes by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectRoot(String);

impl ProjectRoot {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `import_path` is the root itself or one of its sub-packages.
    pub fn owns(&self, import_path: &str) -> bool {
        import_path == self.0
            || import_path
                .strip_prefix(&self.0)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectRoot {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProjectRoot {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// An upstream location a `ProjectRoot` is fetched from, when it differs
/// from what plain path deduction would produce (a fork, a mirror, ...).
///
/// Equality and hashing use a canonicalized form derived from cargo's git
/// source normalization (lower-cased GitHub hosts, stripped trailing `.git`,
/// stripped trailing slash) so that `github.com/a/b` and
/// `github.com/a/b.git` are recognized as the same upstream without losing
/// the original string, which is what actually gets passed to the VCS tool.
#[derive(Debug, Clone)]
pub struct Source(Url);

impl Source {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Ok(Self(Url::parse(raw)?))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// A normalized key for equality and on-disk cache directory naming.
    /// Never used to actually fetch: always fetch from `self.url()`.
    pub fn canonical_key(&self) -> String {
        let mut url = self.0.clone();

        if url.path().ends_with('/') {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty();
            }
        }

        if url.host_str() == Some("github.com") {
            let _ = url.set_scheme(&url.scheme().to_lowercase());
            let path = url.path().to_lowercase();
            url.set_path(&path);
        }

        if let Some(stripped) = url.path().strip_suffix(".git") {
            let stripped = stripped.to_string();
            url.set_path(&stripped);
        }

        url.to_string()
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}

impl Eq for Source {}

impl Hash for Source {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
