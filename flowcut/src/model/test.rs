use crate::automaton::AutStateId;
use crate::engine::VarKind;
use crate::env::EnvStateId;
use crate::fixtures::{scenario_a_graphs, two_way_graphs};
use crate::game::{EdgeId, IndexedGraph, NodeId, ProductState};
use crate::index::AsIndex;

use super::{build_model, Mode, OptimizationModel};

fn node(g: &IndexedGraph, env: usize, aut: usize) -> NodeId {
    g.node_of(ProductState { env: EnvStateId(env), aut: AutStateId(aut) }).unwrap()
}

/// Cuts 0 -> 1 and 0 -> 2 in every history and routes the flow through the
/// intermediate state 3. Automaton states: 0 = nothing seen, 1 = both seen,
/// 2 = only goal seen, 3 = only int seen.
fn scenario_a_solution(model: &OptimizationModel) -> Vec<f64> {
    let g = &model.graph;
    let mut values = vec![0.0; model.program.vars.len()];

    for (e, &(u, v)) in g.edges.enumerate() {
        let (su, sv) = (g.state_of(u), g.state_of(v));
        if su.env == EnvStateId(0) && (sv.env == EnvStateId(1) || sv.env == EnvStateId(2)) {
            values[model.cut[e].unwrap().to_usize()] = 1.0;
        }
    }

    let path = [node(g, 0, 0), node(g, 3, 3), node(g, 4, 3), node(g, 5, 1)];
    for w in path.windows(2) {
        let e = g.edges.enumerate().find(|&(_, &edge)| edge == (w[0], w[1])).unwrap().0;
        values[model.flow[e].to_usize()] = 1.0;
    }

    values[model.potential[node(g, 0, 0)].unwrap().to_usize()] = 1.0;
    values
}

#[test]
fn static_variables() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Static, &primary, &secondary);

    assert_eq!(model.graph.edges.len(), 23);
    assert_eq!(model.intermediates.len(), 5);
    assert_eq!(model.program.binary_count(), 23);
    assert_eq!(model.program.continuous_count(), 23 + 6);
    assert!(model.cut.iter().all(Option::is_some));
    assert!(model.histories.is_empty());

    for n in model.graph.nodes() {
        assert_eq!(model.potential[n].is_some(), !model.intermediates.contains(&n));
    }
    for &d in model.cut.iter().flatten() {
        assert_eq!(model.program.vars[d].kind, VarKind::Binary);
    }
}

#[test]
fn static_known_solution() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Static, &primary, &secondary);

    let values = scenario_a_solution(&model);
    assert!(model.program.is_feasible(&values, 1e-9));

    // 23 edges, 4 of them cut.
    let objective = model.program.objective.eval(&values);
    assert!((objective - (1.0 - 4.0 / 23.0)).abs() < 1e-9);
}

#[test]
fn static_cuts_follow_environment_pairs() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Static, &primary, &secondary);
    let g = &model.graph;

    // Leaving 0 -> 1 open after 3 was seen breaks the shared decision.
    let mut values = scenario_a_solution(&model);
    let e = g.edges.enumerate().find(|&(_, &edge)| edge == (node(g, 0, 3), node(g, 1, 3))).unwrap().0;
    values[model.cut[e].unwrap().to_usize()] = 0.0;
    assert!(!model.program.is_feasible(&values, 1e-9));
}

#[test]
fn static_cuts_follow_reversed_pairs() {
    let (primary, secondary) = two_way_graphs();
    let model = build_model(Mode::Static, &primary, &secondary);
    let g = &model.graph;
    let edge = |from: (usize, usize), to: (usize, usize)| {
        let target = (node(g, from.0, from.1), node(g, to.0, to.1));
        g.edges.enumerate().find(|&(_, &e)| e == target).unwrap().0
    };

    // a = 0, b = 1, t = 2, g1 = 3. Cut a <-> b and reach the goal through t.
    let (ab, ba) = (edge((0, 0), (1, 0)), edge((1, 0), (0, 0)));
    let mut values = vec![0.0; model.program.vars.len()];
    values[model.cut[ab].unwrap().to_usize()] = 1.0;
    values[model.cut[ba].unwrap().to_usize()] = 1.0;
    values[model.flow[edge((0, 0), (2, 3))].to_usize()] = 1.0;
    values[model.flow[edge((2, 3), (3, 1))].to_usize()] = 1.0;
    values[model.potential[node(g, 0, 0)].unwrap().to_usize()] = 1.0;
    assert!(model.program.is_feasible(&values, 1e-9));

    values[model.cut[ba].unwrap().to_usize()] = 0.0;
    assert!(!model.program.is_feasible(&values, 1e-9));
}

#[test]
fn partition_requires_a_cut() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Static, &primary, &secondary);

    let mut values = scenario_a_solution(&model);
    for d in model.cut.iter().flatten() {
        values[d.to_usize()] = 0.0;
    }
    assert!(!model.program.is_feasible(&values, 1e-9));
}

#[test]
fn reactive_variables() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Reactive, &primary, &secondary);

    for (e, &(u, v)) in model.graph.edges.enumerate() {
        let touches = model.intermediates.contains(&u) || model.intermediates.contains(&v);
        assert_eq!(model.cut[e].is_none(), touches);
    }

    // The initial history restarts from the initial secondary node, the history
    // that has seen `int` from the copy of state 3; the others start in a sink.
    let histories = model.histories.iter().map(|h| (h.history, h.source)).collect::<Vec<_>>();
    let s = &model.secondary;
    assert_eq!(histories, vec![(AutStateId(0), node(s, 0, 1)), (AutStateId(3), node(s, 3, 1))]);

    for h in &model.histories {
        assert_eq!(h.flow.len(), model.secondary.edges.len());
    }
}

/// Cuts 0 -> 1 and 0 -> 2 wherever they can be cut. The initial history routes
/// its secondary flow along `initial`, given as (env, aut) pairs of the secondary graph.
fn reactive_scenario_a_solution(model: &OptimizationModel, initial: &[(usize, usize)]) -> Vec<f64> {
    let g = &model.graph;
    let s = &model.secondary;

    let mut values = vec![0.0; model.program.vars.len()];
    for (e, &(u, v)) in g.edges.enumerate() {
        let (su, sv) = (g.state_of(u), g.state_of(v));
        if su.env == EnvStateId(0) && (sv.env == EnvStateId(1) || sv.env == EnvStateId(2)) {
            if let Some(d) = model.cut[e] {
                values[d.to_usize()] = 1.0;
            }
        }
    }

    let mut route = |graph: &IndexedGraph, flow: &dyn Fn(EdgeId) -> usize, path: &[NodeId]| {
        for w in path.windows(2) {
            let e = graph.edges.enumerate().find(|&(_, &edge)| edge == (w[0], w[1])).unwrap().0;
            values[flow(e)] = 1.0;
        }
    };

    route(g, &|e| model.flow[e].to_usize(), &[node(g, 0, 0), node(g, 3, 3), node(g, 4, 3), node(g, 5, 1)]);
    for h in &model.histories {
        let path = match h.history {
            q if q == AutStateId(0) => initial.iter().map(|&(env, aut)| node(s, env, aut)).collect(),
            _ => vec![node(s, 3, 1), node(s, 4, 1), node(s, 5, 0)],
        };
        route(s, &|e| h.flow[e].to_usize(), &path);
    }
    values[model.potential[node(g, 0, 0)].unwrap().to_usize()] = 1.0;

    values
}

#[test]
fn reactive_known_solution() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Reactive, &primary, &secondary);

    // 0 -> 1 is cut in this history, 0 -> 3 -> 4 -> 5 is not.
    let values = reactive_scenario_a_solution(&model, &[(0, 1), (3, 1), (4, 1), (5, 0)]);
    assert!(model.program.is_feasible(&values, 1e-9));
}

#[test]
fn reactive_history_avoids_its_cuts() {
    let (primary, secondary) = scenario_a_graphs();
    let model = build_model(Mode::Reactive, &primary, &secondary);

    // 0 -> 2 is cut while nothing has been seen, so the initial history cannot use it.
    let values = reactive_scenario_a_solution(&model, &[(0, 1), (2, 1), (5, 0)]);
    assert!(!model.program.is_feasible(&values, 1e-9));
}

#[test]
fn edgeless_graph() {
    let (primary, secondary) = scenario_a_graphs();
    let mut primary = primary;
    primary.edges.clear();

    let model = build_model(Mode::Static, &primary, &secondary);
    assert_eq!(model.program.binary_count(), 0);
    assert!(model.program.objective.compact().is_empty());

    // Nothing can carry the unit of flow.
    let values = vec![0.0; model.program.vars.len()];
    assert!(!model.program.is_feasible(&values, 1e-9));
}
