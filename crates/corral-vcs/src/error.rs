use crate::VcsKind;

/// We should truncate at a grapheme boundary and compute character widths,
/// but depending on unicode-segmentation/unicode-width for error-message
/// cosmetics is not worth it.
pub(crate) fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    let mut chars = s.chars();
    let mut prefix = (&mut chars)
        .take(max_width.saturating_sub(1))
        .collect::<String>();
    if chars.next().is_some() {
        prefix.push('…');
    }
    prefix
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is not installed (or not on PATH)")]
    ToolNotFound(VcsKind),

    #[error("`{program} {args}` failed in {dir}: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        dir: String,
        stderr: String,
        status: Option<i32>,
    },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("could not parse VCS output: {0}")]
    UnexpectedOutput(String),
}

impl Error {
    pub(crate) fn command_failed(
        program: &str,
        args: &[impl AsRef<str>],
        dir: &std::path::Path,
        stderr: &[u8],
        status: Option<i32>,
    ) -> Self {
        let stderr = String::from_utf8_lossy(stderr);
        Self::CommandFailed {
            program: program.to_string(),
            args: args
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(" "),
            dir: dir.display().to_string(),
            stderr: truncate_with_ellipsis(&stderr, 2048),
            status,
        }
    }
}
