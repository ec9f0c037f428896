use serde::Serialize;
use tracing::info;

use super::{Status, Termination};

/// Diagnostic record of one solve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub status: Status,
    pub term_condition: Option<Termination>,
    /// Seconds spent in the engine, re-solves included.
    pub runtime: f64,
    pub n_bin_vars: usize,
    pub n_cont_vars: usize,
    pub n_constrs: usize,
    pub flow: Option<f64>,
    pub ncuts: Option<usize>,
}

impl Report {
    pub fn log(&self) {
        info!(
            status = ?self.status,
            term_condition = ?self.term_condition,
            runtime = self.runtime,
            n_bin_vars = self.n_bin_vars,
            n_cont_vars = self.n_cont_vars,
            n_constrs = self.n_constrs,
            flow = ?self.flow,
            ncuts = ?self.ncuts,
            "solve finished"
        );
    }
}
