use corral_types::ProjectRoot;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no source could be deduced for project root {0}")]
    NoDeduction(ProjectRoot),

    #[error(transparent)]
    PathDeduce(#[from] corral_pathdeduce::Error),

    #[error(transparent)]
    Vcs(#[from] corral_vcs::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache layout: {0}")]
    InvalidCacheRoot(String),

    #[error("revision {revision} not found for {root}")]
    RevisionNotFound { root: ProjectRoot, revision: String },

    #[error("the source manager is shutting down")]
    ShuttingDown,
}
