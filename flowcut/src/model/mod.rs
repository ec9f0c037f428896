//! The flow/cut integer program built on top of the indexed game graphs.

mod build;

#[cfg(test)]
mod test;

use serde::{Deserialize, Serialize};

pub use build::build_model;

use crate::automaton::AutStateId;
use crate::engine::{Program, VarId};
use crate::game::{EdgeId, IndexedGraph, NodeId};
use crate::index::IndexedVec;
use crate::Set;

/// Whether the obstacles are fixed in advance or may depend on the automaton history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Static,
    Reactive,
}

/// Flow that must stay routable in the secondary graph from `source` once the
/// primary graph has reached automaton state `history`.
#[derive(Clone, Debug)]
pub struct HistoryFlow {
    pub history: AutStateId,
    pub source: NodeId,
    /// One variable per edge of the secondary graph.
    pub flow: IndexedVec<EdgeId, VarId>,
}

#[derive(Clone, Debug)]
pub struct OptimizationModel {
    pub mode: Mode,
    pub program: Program,

    /// The primary graph without self loops; edge ids below refer to it.
    pub graph: IndexedGraph,
    /// The secondary graph without self loops.
    pub secondary: IndexedGraph,
    /// Nodes accepting for the tester but not for the system.
    pub intermediates: Set<NodeId>,

    pub flow: IndexedVec<EdgeId, VarId>,
    /// Absent for edges outside of the cut domain.
    pub cut: IndexedVec<EdgeId, Option<VarId>>,
    /// Absent for intermediate nodes.
    pub potential: IndexedVec<NodeId, Option<VarId>>,
    pub histories: Vec<HistoryFlow>,
}

impl OptimizationModel {
    pub fn sources(&self) -> &Set<NodeId> {
        &self.graph.init
    }

    pub fn sinks(&self) -> &Set<NodeId> {
        &self.graph.sinks
    }

    /// Edges leaving a source, whose flow is the objective.
    pub fn source_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edges.enumerate().filter(|(_, (u, _))| self.sources().contains(u)).map(|(e, _)| e)
    }

    /// Edges with both endpoints outside of the intermediate nodes.
    pub fn edges_without_intermediates(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph
            .edges
            .enumerate()
            .filter(|(_, (u, v))| {
                !self.intermediates.contains(u) && !self.intermediates.contains(v)
            })
            .map(|(e, _)| e)
    }

    pub fn cut_domain(&self) -> impl Iterator<Item = (EdgeId, VarId)> + '_ {
        self.cut.enumerate().filter_map(|(e, d)| Some((e, (*d)?)))
    }
}
