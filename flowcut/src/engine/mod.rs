//! The contract with the constrained optimization engine, plus a bundled
//! branch and bound backend.

mod bnb;
mod program;

#[cfg(test)]
mod test;

use std::time::Duration;

pub use bnb::BranchAndBound;
pub use program::{Cmp, Constraint, LinExpr, Program, Sense, Var, VarId, VarKind};

use crate::index::IndexedVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Optimal,
    /// Stopped by the monitor with at least one solution.
    Feasible,
    Infeasible,
    /// Presolve could only tell that no bounded optimum exists.
    InfeasibleOrUnbounded,
    /// Stopped by the monitor before finding any solution.
    NotSolved,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineParams {
    /// Allow presolve reductions based on the dual problem. With them on, an
    /// infeasible program may be reported as `InfeasibleOrUnbounded`.
    pub dual_reductions: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self { dual_reductions: true }
    }
}

/// What the engine knows at one of its checkpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Objective of the best solution found so far, in the program's own sense.
    pub best_objective: Option<f64>,
    pub solution_count: usize,
    pub explored_nodes: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Terminate,
}

/// Invoked synchronously by the engine during search. Termination requests are
/// honored at the engine's next checkpoint.
pub trait Monitor {
    fn on_node(&mut self, progress: &Progress) -> Control;
}

impl<F: FnMut(&Progress) -> Control> Monitor for F {
    fn on_node(&mut self, progress: &Progress) -> Control {
        self(progress)
    }
}

#[derive(Clone, Debug)]
pub struct EngineOutput {
    pub status: EngineStatus,
    /// One value per variable, present for `Optimal` and `Feasible`.
    pub values: Option<IndexedVec<VarId, f64>>,
    pub objective: Option<f64>,
    pub runtime: Duration,
}

pub trait Engine {
    fn solve(
        &mut self,
        program: &Program,
        params: &EngineParams,
        monitor: &mut dyn Monitor,
    ) -> EngineOutput;
}
