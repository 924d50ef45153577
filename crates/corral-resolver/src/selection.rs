use corral_types::{Manifest, ProjectRoot, Version};

/// One entry on the solver's selection stack: a project bound to a version,
/// plus the data needed to compute constraints on (and discover) everything
/// it depends on, and to undo the selection on backjump.
#[derive(Debug, Clone)]
pub struct Selection {
    pub project: ProjectRoot,
    pub version: Version,
    pub manifest: Manifest,
    /// External imports reachable from this selection at this version,
    /// already filtered through its own manifest's `ignored`/`required`
    /// lists. Raw import paths, not yet resolved to `ProjectRoot`s — used
    /// both to decide which projects this selection actually depends on
    /// (for constraint propagation) and to seed the unselected queue.
    pub externals: Vec<String>,
    /// The versions-queue cursor position this selection was picked from,
    /// so a backjump can restore it (or advance one past it, for the
    /// selection that actually conflicted).
    pub cursor_at_selection: usize,
}

impl Selection {
    pub fn new(
        project: ProjectRoot,
        version: Version,
        manifest: Manifest,
        externals: Vec<String>,
        cursor_at_selection: usize,
    ) -> Self {
        Self {
            project,
            version,
            manifest,
            externals,
            cursor_at_selection,
        }
    }

    /// Whether this selection actually reaches `project` through one of its
    /// external imports, i.e. whether its manifest's constraint on
    /// `project` is live rather than vestigial.
    pub fn reaches(&self, project: &ProjectRoot) -> bool {
        self.externals.iter().any(|import| project.owns(import))
    }
}

/// One project's candidate-version list and the solver's cursor into it.
/// The list is computed once (version ordering is static); backjumping
/// advances the cursor rather than recomputing the list.
#[derive(Debug, Clone, Default)]
pub struct VersionsQueue {
    pub candidates: Vec<Version>,
    pub cursor: usize,
}

impl VersionsQueue {
    pub fn new(candidates: Vec<Version>) -> Self {
        Self { candidates, cursor: 0 }
    }
}
