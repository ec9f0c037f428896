mod build;
mod indexed;


pub use build::build_game_graph;
pub use indexed::{index, Adjacency, Correspondence, EdgeId, IndexedGraph, NodeId};

use crate::automaton::AutStateId;
use crate::env::{ActionId, EnvStateId};
use crate::Set;

/// A state of the synchronous product: where the environment is and what the
/// automaton has read so far.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProductState {
    pub env: EnvStateId,
    pub aut: AutStateId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameEdge {
    pub from: ProductState,
    pub action: ActionId,
    pub to: ProductState,
}

/// The product of an environment and an acceptance structure, restricted to the
/// states reachable from the initial ones.
#[derive(Clone, Debug)]
pub struct GameGraph {
    /// In discovery order.
    pub states: Set<ProductState>,
    pub edges: Vec<GameEdge>,
    pub init: Vec<ProductState>,
    pub aut_init: AutStateId,

    pub sources: Set<ProductState>,
    pub intermediates: Set<ProductState>,
    pub sinks: Set<ProductState>,
}

impl GameGraph {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
