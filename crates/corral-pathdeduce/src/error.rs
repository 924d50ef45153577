#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not deduce a source for import path `{0}`")]
    NoMatch(String),

    #[error("`{0}` has multiple VCS-extension suffixes")]
    MultipleVcsSuffixes(String),

    #[error("`{path}` has a fractional version suffix `.v{suffix}`, which must be an integer major version")]
    FractionalVanityVersion { path: String, suffix: String },

    #[error("invalid username/repository for {host}: `{path}`")]
    InvalidHostPath { host: &'static str, path: String },

    #[error("failed to fetch meta tags for `{host}`: {source}")]
    MetaFetch {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no source-import meta tag found for `{0}`")]
    NoMetaTag(String),
}
