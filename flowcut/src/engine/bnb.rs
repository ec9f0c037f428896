use std::time::Instant;

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};
use tracing::trace;

use crate::index::{AsIndex, IndexedVec};

use super::{
    Cmp, Control, Engine, EngineOutput, EngineParams, EngineStatus, Monitor, Program, Progress,
    Sense, VarId, VarKind,
};

/// Depth first branch and bound over LP relaxations solved with `minilp`.
///
/// Branches on the most fractional binary variable, exploring first the side
/// its relaxed value is closest to. The monitor is consulted before each node.
#[derive(Clone, Debug)]
pub struct BranchAndBound {
    /// Distance from an integer under which a binary value counts as integral.
    pub int_tol: f64,
    /// Minimum objective improvement for a node to be worth exploring.
    pub bound_tol: f64,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self { int_tol: 1e-6, bound_tol: 1e-9 }
    }
}

struct Relaxation {
    objective: f64,
    values: Vec<f64>,
}

enum RelaxError {
    Infeasible,
    Unbounded,
}

impl Engine for BranchAndBound {
    fn solve(
        &mut self,
        program: &Program,
        params: &EngineParams,
        monitor: &mut dyn Monitor,
    ) -> EngineOutput {
        let start = Instant::now();
        let output = |status, incumbent: Option<(f64, Vec<f64>)>| {
            let (objective, values) = match incumbent {
                Some((objective, values)) => (Some(objective), Some(IndexedVec::from(values))),
                None => (None, None),
            };
            EngineOutput { status, values, objective, runtime: start.elapsed() }
        };

        // Internally the objective is always maximized.
        let sign = match program.sense {
            Sense::Maximize => 1.0,
            Sense::Minimize => -1.0,
        };
        let objective = coefficients(program);

        let root = program.vars.iter().map(|v| (v.lower, v.upper)).collect::<Vec<_>>();
        let mut stack = vec![root];
        let mut incumbent: Option<(f64, Vec<f64>)> = None;
        let mut solution_count = 0;
        let mut explored_nodes = 0;

        while let Some(bounds) = stack.pop() {
            let progress = Progress {
                best_objective: incumbent.as_ref().map(|&(obj, _)| sign * obj),
                solution_count,
                explored_nodes,
            };
            if monitor.on_node(&progress) == Control::Terminate {
                let status = match solution_count {
                    0 => EngineStatus::NotSolved,
                    _ => EngineStatus::Feasible,
                };
                return output(status, incumbent.map(|(obj, values)| (sign * obj, values)));
            }

            let is_root = explored_nodes == 0;
            explored_nodes += 1;

            let relaxed = match relax(program, &objective, &bounds) {
                Ok(relaxed) => relaxed,
                Err(RelaxError::Infeasible) if !is_root => continue,
                Err(RelaxError::Infeasible) if !params.dual_reductions => {
                    return output(EngineStatus::Infeasible, None)
                }
                Err(_) => return output(EngineStatus::InfeasibleOrUnbounded, None),
            };

            let bound = sign * relaxed.objective;
            if let Some((best, _)) = &incumbent {
                if bound <= best + self.bound_tol {
                    continue;
                }
            }

            match self.branching_var(program, &relaxed.values) {
                Some((var, value)) => {
                    let mut down = bounds.clone();
                    down[var.to_usize()] = (0.0, 0.0);
                    let mut up = bounds;
                    up[var.to_usize()] = (1.0, 1.0);

                    // The last pushed child is explored first.
                    if value >= 0.5 {
                        stack.extend([down, up]);
                    } else {
                        stack.extend([up, down]);
                    }
                }
                None => {
                    solution_count += 1;
                    trace!(objective = bound, explored_nodes, "new incumbent");
                    incumbent = Some((bound, self.round_binaries(program, relaxed.values)));
                }
            }
        }

        match incumbent {
            Some((obj, values)) => output(EngineStatus::Optimal, Some((sign * obj, values))),
            None => output(EngineStatus::Infeasible, None),
        }
    }
}

impl BranchAndBound {
    fn branching_var(&self, program: &Program, values: &[f64]) -> Option<(VarId, f64)> {
        program
            .vars
            .enumerate()
            .filter(|(_, v)| v.kind == VarKind::Binary)
            .map(|(var, _)| (var, values[var.to_usize()]))
            .map(|(var, x)| (var, x, (x - x.round()).abs()))
            .filter(|&(_, _, frac)| frac > self.int_tol)
            .max_by(|(_, _, a), (_, _, b)| a.total_cmp(b))
            .map(|(var, x, _)| (var, x))
    }

    fn round_binaries(&self, program: &Program, mut values: Vec<f64>) -> Vec<f64> {
        for (var, v) in program.vars.enumerate() {
            if v.kind == VarKind::Binary {
                values[var.to_usize()] = values[var.to_usize()].round();
            }
        }
        values
    }
}

fn coefficients(program: &Program) -> Vec<f64> {
    let mut coeffs = vec![0.0; program.vars.len()];
    for (var, coeff) in program.objective.compact() {
        coeffs[var.to_usize()] = coeff;
    }
    coeffs
}

fn relax(
    program: &Program,
    objective: &[f64],
    bounds: &[(f64, f64)],
) -> Result<Relaxation, RelaxError> {
    let direction = match program.sense {
        Sense::Maximize => OptimizationDirection::Maximize,
        Sense::Minimize => OptimizationDirection::Minimize,
    };

    let mut problem = Problem::new(direction);
    let vars = bounds
        .iter()
        .zip(objective)
        .map(|(&bounds, &coeff)| problem.add_var(coeff, bounds))
        .collect::<Vec<_>>();

    for c in &program.constraints {
        let terms = c.expr.compact();

        // minilp wants at least one variable per row.
        if terms.is_empty() {
            if !c.cmp.holds(0.0, c.rhs, 0.0) {
                return Err(RelaxError::Infeasible);
            }
            continue;
        }

        let mut expr = LinearExpr::empty();
        for (var, coeff) in terms {
            expr.add(vars[var.to_usize()], coeff);
        }
        let op = match c.cmp {
            Cmp::Le => ComparisonOp::Le,
            Cmp::Eq => ComparisonOp::Eq,
            Cmp::Ge => ComparisonOp::Ge,
        };
        problem.add_constraint(expr, op, c.rhs);
    }

    match problem.solve() {
        Ok(solution) => Ok(Relaxation {
            objective: solution.objective(),
            values: vars.iter().map(|&var| solution[var]).collect(),
        }),
        Err(minilp::Error::Infeasible) => Err(RelaxError::Infeasible),
        Err(_) => Err(RelaxError::Unbounded),
    }
}
