use corral_types::{Constraint, ProjectRoot};

use crate::bridge::BridgeError;

/// One contributing constraint recorded in a solve failure: the selection
/// (or the root's overrides) that narrowed the candidate set, and what it
/// narrowed it to.
#[derive(Debug, Clone)]
pub struct ConflictingConstraint {
    pub parent: ProjectRoot,
    pub constraint: Constraint,
}

/// Why the solver gave up: the project whose candidate set emptied, the
/// constraints that emptied it, and how deep the search had gotten when it
/// ran out of stack to backjump to (spec §7's "structured list of
/// contributing constraints and the cursor position where the search
/// exhausted").
#[derive(Debug, Clone)]
pub struct SolveFailure {
    pub project: ProjectRoot,
    pub conflicts: Vec<ConflictingConstraint>,
    pub cursor: usize,
}

impl std::fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no version of {} satisfies", self.project)?;
        for c in &self.conflicts {
            write!(f, " {}:{}", c.parent, c.constraint)?;
        }
        write!(f, " (exhausted at selection {})", self.cursor)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("{0}")]
    Solve(SolveFailure),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
