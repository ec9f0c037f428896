use super::{
    BranchAndBound, Cmp, Control, Engine, EngineParams, EngineStatus, LinExpr, Monitor, Program,
    Progress, Sense, VarId,
};

fn solve(program: &Program, params: EngineParams) -> super::EngineOutput {
    let mut monitor = |_: &Progress| Control::Continue;
    BranchAndBound::default().solve(program, &params, &mut monitor)
}

/// max 5a + 4b + 3c subject to 2a + 3b + c <= 5, 4a + b + 2c <= 11, 3a + 4b + 2c <= 8.
fn knapsack() -> (Program, [VarId; 3]) {
    let mut p = Program::new(Sense::Maximize);
    let vars = [p.add_binary(), p.add_binary(), p.add_binary()];
    let [a, b, c] = vars;
    p.set_objective(LinExpr::new().term(a, 5.0).term(b, 4.0).term(c, 3.0));
    p.add_constraint(LinExpr::new().term(a, 2.0).term(b, 3.0).term(c, 1.0), Cmp::Le, 5.0);
    p.add_constraint(LinExpr::new().term(a, 4.0).term(b, 1.0).term(c, 2.0), Cmp::Le, 11.0);
    p.add_constraint(LinExpr::new().term(a, 3.0).term(b, 4.0).term(c, 2.0), Cmp::Le, 8.0);
    (p, vars)
}

#[test]
fn compact_merges_terms() {
    let x = VarId(0);
    let y = VarId(1);
    let e = LinExpr::new().term(y, 1.0).term(x, 2.0).term(y, -1.0).term(x, 0.5);
    assert_eq!(e.compact(), vec![(x, 2.5)]);
    assert_eq!(e.eval(&[1.0, 7.0]), 2.5);
}

#[test]
fn binary_optimum() {
    let (p, [a, b, c]) = knapsack();
    let out = solve(&p, EngineParams::default());

    assert_eq!(out.status, EngineStatus::Optimal);
    let values = out.values.unwrap();
    assert_eq!((values[a], values[b], values[c]), (1.0, 1.0, 0.0));
    assert!((out.objective.unwrap() - 9.0).abs() < 1e-6);
    assert!(p.is_feasible(&values, 1e-6));
}

#[test]
fn minimize_with_continuous() {
    let mut p = Program::new(Sense::Minimize);
    let x = p.add_continuous(0.0, 10.0);
    let d = p.add_binary();
    p.set_objective(LinExpr::new().term(x, 1.0).term(d, 3.0));
    // Either pay 3 for d or bring x up to 2.5.
    p.add_constraint(LinExpr::new().term(x, 1.0).term(d, 2.5), Cmp::Ge, 2.5);

    let out = solve(&p, EngineParams::default());
    assert_eq!(out.status, EngineStatus::Optimal);
    assert!((out.objective.unwrap() - 2.5).abs() < 1e-6);
    assert_eq!(out.values.unwrap()[d], 0.0);
}

#[test]
fn infeasible_depends_on_dual_reductions() {
    let mut p = Program::new(Sense::Maximize);
    let x = p.add_continuous(0.0, 1.0);
    p.add_constraint(LinExpr::sum([x]), Cmp::Ge, 2.0);

    let out = solve(&p, EngineParams::default());
    assert_eq!(out.status, EngineStatus::InfeasibleOrUnbounded);
    assert!(out.values.is_none());

    let out = solve(&p, EngineParams { dual_reductions: false });
    assert_eq!(out.status, EngineStatus::Infeasible);
}

#[test]
fn empty_rows() {
    let mut p = Program::new(Sense::Maximize);
    p.add_binary();
    p.add_constraint(LinExpr::new(), Cmp::Le, 0.0);
    assert_eq!(solve(&p, EngineParams::default()).status, EngineStatus::Optimal);

    p.add_constraint(LinExpr::new(), Cmp::Ge, 1.0);
    assert_eq!(solve(&p, EngineParams { dual_reductions: false }).status, EngineStatus::Infeasible);
}

#[test]
fn integer_infeasible() {
    // The relaxation has x = 0.5, no binary value fits.
    let mut p = Program::new(Sense::Maximize);
    let x = p.add_binary();
    p.add_constraint(LinExpr::new().term(x, 2.0), Cmp::Eq, 1.0);

    let out = solve(&p, EngineParams::default());
    assert_eq!(out.status, EngineStatus::Infeasible);
}

#[test]
fn monitor_termination() {
    let (p, _) = knapsack();

    let mut stop_at_once = |_: &Progress| Control::Terminate;
    let out = BranchAndBound::default().solve(&p, &EngineParams::default(), &mut stop_at_once);
    assert_eq!(out.status, EngineStatus::NotSolved);
    assert!(out.values.is_none());

    struct FirstSolution(Vec<Progress>);
    impl Monitor for FirstSolution {
        fn on_node(&mut self, progress: &Progress) -> Control {
            self.0.push(*progress);
            match progress.solution_count {
                0 => Control::Continue,
                _ => Control::Terminate,
            }
        }
    }

    let mut monitor = FirstSolution(Vec::new());
    let out = BranchAndBound::default().solve(&p, &EngineParams::default(), &mut monitor);
    assert_eq!(out.status, EngineStatus::Feasible);
    assert!(p.is_feasible(&out.values.unwrap(), 1e-6));

    let last = monitor.0.last().unwrap();
    assert_eq!(last.solution_count, 1);
    assert_eq!(last.best_objective, out.objective);
    assert!(monitor.0.windows(2).all(|w| w[0].explored_nodes < w[1].explored_nodes));
}
