use tracing::debug;

use crate::automaton::{AcceptanceStructure, AutStateId, Role};
use crate::env::{EnvStateId, EnvironmentModel};
use crate::index::IndexedVec;
use crate::{Error, Result, Set};

use super::{GameEdge, GameGraph, ProductState};

/// Explores the product of `env` and `aut` breadth first from every initial
/// environment state paired with the initial automaton state.
pub fn build_game_graph(env: &EnvironmentModel, aut: &AcceptanceStructure) -> Result<GameGraph> {
    if aut.sys.is_empty() {
        return Err(Error::MissingAcceptingStates(Role::Sys));
    }

    let ctx = ProductContext {
        env,
        aut,
        valuations: env.labels.iter().map(|label| aut.valuation(label)).collect(),
    };

    let init = env.init.iter().map(|&env| ProductState { env, aut: aut.init }).collect::<Vec<_>>();
    let mut states = init.iter().copied().collect::<Set<_>>();
    let mut edges = Vec::new();

    // The set is insertion ordered, so walking it by position is a breadth first visit.
    let mut next = 0;
    while let Some(&from) = states.get_index(next) {
        next += 1;

        for &(action, target) in &env.transitions[from.env] {
            let to = ProductState { env: target, aut: ctx.step(from, target)? };
            edges.push(GameEdge { from, action, to });
            states.insert(to);
        }
    }

    let with_aut_in = |accepting: &Set<AutStateId>| {
        states.iter().filter(|s| accepting.contains(&s.aut)).copied().collect::<Set<_>>()
    };
    let sources = init.iter().copied().collect::<Set<_>>();
    let intermediates = with_aut_in(&aut.test);
    let sinks = with_aut_in(&aut.sys);

    debug!(
        states = states.len(),
        edges = edges.len(),
        sources = sources.len(),
        intermediates = intermediates.len(),
        sinks = sinks.len(),
        "built game graph"
    );

    Ok(GameGraph { states, edges, init, aut_init: aut.init, sources, intermediates, sinks })
}

struct ProductContext<'a> {
    env: &'a EnvironmentModel,
    aut: &'a AcceptanceStructure,
    // Truth values of the automaton propositions in each environment state.
    valuations: IndexedVec<EnvStateId, Vec<bool>>,
}

impl ProductContext<'_> {
    /// The automaton state reached from `from` when the environment moves to `target`.
    fn step(&self, from: ProductState, target: EnvStateId) -> Result<AutStateId> {
        let targets = self.aut.successors(from.aut, &self.valuations[target]).collect::<Set<_>>();

        match targets.len() {
            1 => Ok(targets[0]),
            0 => Err(Error::ProductDeadEnd {
                state: self.env.name(from.env).to_string(),
                q: from.aut,
                target: self.env.name(target).to_string(),
            }),
            _ => Err(Error::ProductAmbiguity {
                state: self.env.name(from.env).to_string(),
                q: from.aut,
                target: self.env.name(target).to_string(),
                targets: targets.into_iter().collect(),
            }),
        }
    }
}
