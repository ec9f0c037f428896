use tracing::debug;

use crate::automaton::AutStateId;
use crate::env::EnvStateId;
use crate::index::IndexedVec;
use crate::{new_index, Map, Set};

use super::{GameGraph, ProductState};

new_index!(pub index NodeId);
new_index!(pub index EdgeId);

/// A game graph with dense node and edge ids, ready to be turned into variables.
#[derive(Clone, Debug)]
pub struct IndexedGraph {
    pub forward: IndexedVec<NodeId, ProductState>,
    pub inverse: Map<ProductState, NodeId>,
    pub edges: IndexedVec<EdgeId, (NodeId, NodeId)>,
    pub aut_init: AutStateId,

    pub init: Set<NodeId>,
    pub intermediates: Set<NodeId>,
    pub sinks: Set<NodeId>,
}

/// Incoming and outgoing edges of every node.
pub struct Adjacency {
    pub outgoing: IndexedVec<NodeId, Vec<EdgeId>>,
    pub incoming: IndexedVec<NodeId, Vec<EdgeId>>,
}

pub fn index(g: &GameGraph) -> IndexedGraph {
    let forward = g.states.iter().copied().collect::<IndexedVec<NodeId, _>>();
    let inverse = forward.enumerate().map(|(id, &s)| (s, id)).collect::<Map<_, _>>();

    // Different actions leading to the same pair of states are the same edge here.
    let edges = g
        .edges
        .iter()
        .map(|e| (inverse[&e.from], inverse[&e.to]))
        .collect::<Set<_>>()
        .into_iter()
        .collect::<IndexedVec<EdgeId, _>>();

    let ids = |states: &Set<ProductState>| states.iter().map(|s| inverse[s]).collect::<Set<_>>();
    let init = g.init.iter().map(|s| inverse[s]).collect();
    let intermediates = ids(&g.intermediates);
    let sinks = ids(&g.sinks);

    debug!(nodes = forward.len(), edges = edges.len(), "indexed game graph");

    IndexedGraph { forward, inverse, edges, aut_init: g.aut_init, init, intermediates, sinks }
}

impl IndexedGraph {
    pub fn node_count(&self) -> usize {
        self.forward.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        self.forward.indexes()
    }

    pub fn node_of(&self, state: ProductState) -> Option<NodeId> {
        self.inverse.get(&state).copied()
    }

    pub fn state_of(&self, n: NodeId) -> ProductState {
        self.forward[n]
    }

    /// The same graph with every edge from a node to itself removed.
    /// Node ids are preserved, edge ids are not.
    pub fn without_self_loops(&self) -> IndexedGraph {
        let edges = self.edges.iter().copied().filter(|(u, v)| u != v).collect();
        IndexedGraph { edges, ..self.clone() }
    }

    pub fn adjacency(&self) -> Adjacency {
        let mut outgoing = self.nodes().map(|_| Vec::new()).collect::<IndexedVec<NodeId, _>>();
        let mut incoming = outgoing.clone();
        for (e, &(u, v)) in self.edges.enumerate() {
            outgoing[u].push(e);
            incoming[v].push(e);
        }
        Adjacency { outgoing, incoming }
    }

    /// Nodes from which some node in `targets` can be reached, targets included.
    pub fn can_reach(&self, targets: &Set<NodeId>) -> Set<NodeId> {
        let adjacency = self.adjacency();

        let mut queue = targets.iter().copied().collect::<Vec<_>>();
        let mut reaching = targets.clone();
        while let Some(n) = queue.pop() {
            queue.extend(
                adjacency.incoming[n]
                    .iter()
                    .map(|&e| self.edges[e].0)
                    .filter(|&pred| reaching.insert(pred)),
            );
        }

        reaching
    }
}

/// Pairs each node of a primary graph with the nodes of a secondary graph that
/// share its environment state, whatever their automaton states are.
#[derive(Clone, Debug)]
pub struct Correspondence {
    pub pairs: Vec<(NodeId, NodeId)>,
    images: IndexedVec<NodeId, Vec<NodeId>>,
}

impl Correspondence {
    pub fn between(primary: &IndexedGraph, secondary: &IndexedGraph) -> Self {
        let mut by_env = Map::<EnvStateId, Vec<NodeId>>::default();
        for (n, s) in secondary.forward.enumerate() {
            by_env.entry(s.env).or_default().push(n);
        }

        let images = primary
            .forward
            .iter()
            .map(|s| by_env.get(&s.env).cloned().unwrap_or_default())
            .collect::<IndexedVec<NodeId, _>>();
        let pairs = images
            .enumerate()
            .flat_map(|(n, imgs)| imgs.iter().map(move |&m| (n, m)))
            .collect();

        Self { pairs, images }
    }

    pub fn images(&self, n: NodeId) -> &[NodeId] {
        &self.images[n]
    }
}
