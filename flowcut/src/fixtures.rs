//! Small environments and automata shared by the unit tests.

use crate::automaton::{AcceptanceStructure, AutStateId, Automaton, Guard, Role};
use crate::env::{EnvironmentInput, EnvironmentModel};
use crate::game::{build_game_graph, index, IndexedGraph};
use crate::index::IndexedVec;
use crate::Set;

pub fn environment(
    transitions: &[(&str, &[&str])],
    labels: &[(&str, &[&str])],
    init: &[&str],
) -> EnvironmentModel {
    let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let input = EnvironmentInput {
        states: transitions.iter().map(|(s, _)| s.to_string()).collect(),
        transitions: transitions.iter().map(|(s, succ)| (s.to_string(), strings(succ))).collect(),
        labels: labels.iter().map(|(s, props)| (s.to_string(), strings(props))).collect(),
        init: strings(init),
    };
    EnvironmentModel::new(&input).unwrap()
}

/// What `F(prop)` compiles to: wait in 1 until `prop` holds, then stay in 0 forever.
pub fn eventually(prop: &str) -> Automaton {
    let holds = Guard::Ap(0);
    let fails = Guard::Not(Box::new(Guard::Ap(0)));
    Automaton {
        aps: vec![prop.to_string()],
        init: AutStateId(1),
        transitions: IndexedVec::from(vec![
            vec![(Guard::TRUE, AutStateId(0))],
            vec![(holds, AutStateId(0)), (fails, AutStateId(1))],
        ]),
        accepting: Set::from_iter([AutStateId(0)]),
    }
}

/// Six states where reaching `goal` in 5 is only possible without passing
/// through `int` in 3 if some transitions stay open.
pub fn scenario_a() -> (EnvironmentModel, AcceptanceStructure) {
    let env = environment(
        &[
            ("0", &["1", "2", "3"]),
            ("1", &["2", "3", "4"]),
            ("2", &["3", "4", "5"]),
            ("3", &["4"]),
            ("4", &["5", "0"]),
            ("5", &["5"]),
        ],
        &[("0", &["a"]), ("3", &["int"]), ("5", &["goal"])],
        &["0"],
    );
    let aut = AcceptanceStructure::product(&eventually("goal"), &eventually("int")).unwrap();
    (env, aut)
}

/// The primary and secondary indexed graphs of scenario A.
pub fn scenario_a_graphs() -> (IndexedGraph, IndexedGraph) {
    let (env, aut) = scenario_a();
    let sys = AcceptanceStructure::single(eventually("goal"), Role::Sys);

    let primary = index(&build_game_graph(&env, &aut).unwrap());
    let secondary = index(&build_game_graph(&env, &sys).unwrap());
    (primary, secondary)
}

/// `a` and `b` lead to each other. Going from `b` to any of the three goals skips
/// `int` in `t`, so blocking both directions between `a` and `b` is cheaper than
/// blocking `b`'s exits.
pub fn two_way_graphs() -> (IndexedGraph, IndexedGraph) {
    let env = environment(
        &[
            ("a", &["b", "t"]),
            ("b", &["a", "g1", "g2", "g3"]),
            ("t", &["g1"]),
            ("g1", &["g1"]),
            ("g2", &["g2"]),
            ("g3", &["g3"]),
        ],
        &[("t", &["int"]), ("g1", &["goal"]), ("g2", &["goal"]), ("g3", &["goal"])],
        &["a"],
    );
    let aut = AcceptanceStructure::product(&eventually("goal"), &eventually("int")).unwrap();
    let sys = AcceptanceStructure::single(eventually("goal"), Role::Sys);

    let primary = index(&build_game_graph(&env, &aut).unwrap());
    let secondary = index(&build_game_graph(&env, &sys).unwrap());
    (primary, secondary)
}
