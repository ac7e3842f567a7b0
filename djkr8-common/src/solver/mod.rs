//! Combinatorial solving behind a swappable interface
//!
//! The optimizer encodes its problem as a [`Model`] and hands it to any
//! [`Solver`]. The bundled engine is [`PathBranchAndBound`].

pub mod branch_and_bound;
pub mod model;

pub use branch_and_bound::PathBranchAndBound;
pub use model::{LinearConstraint, LinearExpr, Model, PathArc, PathConstraint, Relation, Solution, VarId};

use crate::models::SolverStatus;
use crate::Result;
use std::time::Duration;

/// Per-call solve limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveParams {
    /// Wall-clock budget; the only way a running solve is cut short
    pub time_limit: Duration,
    /// Worker threads; 0 means available parallelism. 1 gives reproducible runs.
    pub num_workers: usize,
}

impl SolveParams {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            num_workers: 0,
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Resolve `num_workers = 0` to the machine's parallelism
    pub fn effective_workers(&self) -> usize {
        if self.num_workers > 0 {
            self.num_workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// What an engine reports back
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolverStatus,
    /// Present for OPTIMAL and FEASIBLE
    pub solution: Option<Solution>,
    pub elapsed: Duration,
    /// Search nodes visited, for logging
    pub branches: u64,
}

/// "Solve this model within time T"
///
/// Implementations block until the search completes or the time limit
/// elapses, and hold no state between calls.
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome>;
}
