use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

use crate::engine::{Control, Monitor, Progress};

use super::SolveConfig;

/// Why the search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The engine proved its answer.
    Completed,
    /// A solution exists but the objective stopped improving.
    Stalled,
    /// No solution was found in time.
    Timeout,
}

/// Bookkeeping shared between the orchestrator and the engine's monitoring hook.
#[derive(Clone, Debug)]
pub struct SolveContext {
    pub start: Instant,
    pub last_improvement: Instant,
    pub best_objective: Option<f64>,
    pub solution_count: usize,
    pub termination: Option<Termination>,

    stall: Duration,
    timeout: Duration,
    epsilon: f64,
}

impl SolveContext {
    pub fn new(config: &SolveConfig, now: Instant) -> Self {
        Self {
            start: now,
            last_improvement: now,
            best_objective: None,
            solution_count: 0,
            termination: None,
            stall: config.stall,
            timeout: config.timeout,
            epsilon: config.epsilon,
        }
    }

    /// Records what the engine reports at time `now` and decides whether it should stop.
    pub fn observe(&mut self, progress: &Progress, now: Instant) -> Control {
        if let Some(obj) = progress.best_objective {
            let improved = match self.best_objective {
                Some(best) => (obj - best).abs() > self.epsilon,
                None => true,
            };
            if improved {
                self.best_objective = Some(obj);
                self.last_improvement = now;
            }
        }
        self.solution_count = progress.solution_count;

        let termination = match self.solution_count {
            0 if now.duration_since(self.start) > self.timeout => Termination::Timeout,
            0 => return Control::Continue,
            _ if now.duration_since(self.last_improvement) > self.stall => Termination::Stalled,
            _ => return Control::Continue,
        };

        warn!(?termination, elapsed = ?now.duration_since(self.start), "stopping the search");
        self.termination = Some(termination);
        Control::Terminate
    }
}

impl Monitor for SolveContext {
    fn on_node(&mut self, progress: &Progress) -> Control {
        self.observe(progress, Instant::now())
    }
}
