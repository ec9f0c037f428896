mod context;
mod report;


use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

pub use context::{SolveContext, Termination};
pub use report::Report;

use crate::engine::{Engine, EngineOutput, EngineParams, EngineStatus};
use crate::game::{EdgeId, ProductState};
use crate::index::IndexedVec;
use crate::model::OptimizationModel;

/// Cut variables above this value count as cut.
pub const CUT_THRESHOLD: f64 = 0.9;

#[derive(Clone, Debug)]
pub struct SolveConfig {
    /// How long the objective may stay still once a solution exists.
    pub stall: Duration,
    /// How long to search for a first solution.
    pub timeout: Duration,
    /// Smallest objective change that counts as an improvement.
    pub epsilon: f64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self { stall: Duration::from_secs(60), timeout: Duration::from_secs(600), epsilon: 1e-8 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Optimal,
    /// Stopped early with a solution that may not be optimal.
    Feasible,
    Infeasible,
    /// Stopped early without any solution.
    NotSolved,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cut {
    pub edge: EdgeId,
    pub from: ProductState,
    pub to: ProductState,
    pub value: f64,
}

/// Values of the flow and cut variables, by edge of the model's graph.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub flow: IndexedVec<EdgeId, f64>,
    pub cut: IndexedVec<EdgeId, Option<f64>>,
}

#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: Status,
    pub cuts: Vec<Cut>,
    pub flow: Option<f64>,
    pub assignment: Option<Assignment>,
    pub report: Report,
}

/// Solves `model`, stopping the engine according to the limits in `config`.
/// Infeasibility and early stops are reported in the outcome, not as errors.
pub fn optimize(
    model: &OptimizationModel,
    engine: &mut dyn Engine,
    config: &SolveConfig,
) -> SolveOutcome {
    let mut ctx = SolveContext::new(config, Instant::now());
    let mut out = engine.solve(&model.program, &EngineParams::default(), &mut ctx);
    let mut runtime = out.runtime;

    let status = match out.status {
        EngineStatus::InfeasibleOrUnbounded => {
            warn!("model is infeasible or unbounded, solving again without dual reductions");
            let params = EngineParams { dual_reductions: false };
            ctx = SolveContext::new(config, Instant::now());
            out = engine.solve(&model.program, &params, &mut ctx);
            runtime += out.runtime;

            // The follow-up only settles the ambiguity, its answer is not used.
            debug!(status = ?out.status, "follow-up solve finished");
            Status::Infeasible
        }
        EngineStatus::Optimal => Status::Optimal,
        EngineStatus::Feasible => Status::Feasible,
        EngineStatus::Infeasible => Status::Infeasible,
        EngineStatus::NotSolved => Status::NotSolved,
    };

    let term_condition = match status {
        Status::Optimal | Status::Infeasible => Some(ctx.termination.unwrap_or(Termination::Completed)),
        Status::Feasible | Status::NotSolved => ctx.termination,
    };

    let assignment = match status {
        Status::Optimal | Status::Feasible => extract(model, &out),
        Status::Infeasible | Status::NotSolved => None,
    };

    let cuts = assignment.as_ref().map(|a| cut_edges(model, a)).unwrap_or_default();
    let flow = assignment.as_ref().map(|a| model.source_edges().map(|e| a.flow[e]).sum::<f64>());

    let program = &model.program;
    let report = Report {
        status,
        term_condition,
        runtime: runtime.as_secs_f64(),
        n_bin_vars: program.binary_count(),
        n_cont_vars: program.continuous_count(),
        n_constrs: program.constraint_count(),
        flow,
        ncuts: assignment.as_ref().map(|_| cuts.len()),
    };
    report.log();

    SolveOutcome { status, cuts, flow, assignment, report }
}

fn extract(model: &OptimizationModel, out: &EngineOutput) -> Option<Assignment> {
    let values = out.values.as_ref()?;
    Some(Assignment {
        flow: model.flow.iter().map(|&f| values[f]).collect(),
        cut: model.cut.iter().map(|d| d.map(|d| values[d])).collect(),
    })
}

fn cut_edges(model: &OptimizationModel, assignment: &Assignment) -> Vec<Cut> {
    assignment
        .cut
        .enumerate()
        .filter_map(|(edge, &value)| Some((edge, value?)))
        .filter(|&(_, value)| value > CUT_THRESHOLD)
        .map(|(edge, value)| {
            let (u, v) = model.graph.edges[edge];
            Cut { edge, from: model.graph.state_of(u), to: model.graph.state_of(v), value }
        })
        .collect()
}
