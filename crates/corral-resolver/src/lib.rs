//! The backtracking version solver (spec §4.4): given a [`Bridge`] onto a
//! root project's tree and manifest, resolves every transitively reachable
//! project to a version and emits a [`corral_types::Lock`].
//!
//! The solver is single-threaded and iterative by design: the search tree
//! is sequential and non-speculative, with an explicit selection stack
//! standing in for what would otherwise be a recursive backtracker, so
//! conflict-directed backjumping stays auditable (spec §9).

mod bridge;
mod error;
mod memo;
mod selection;
mod solver;

pub use bridge::{Bridge, BridgeError, SourceManagerBridge};
pub use error::{ConflictingConstraint, SolveError, SolveFailure};
pub use solver::{root_memo, solve, ChangePolicy, SolveOptions};

