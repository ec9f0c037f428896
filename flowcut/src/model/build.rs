use std::collections::BTreeSet;

use either::Either;
use tracing::debug;

use crate::automaton::AutStateId;
use crate::engine::{Cmp, LinExpr, Program, Sense, VarId};
use crate::env::EnvStateId;
use crate::game::{Adjacency, Correspondence, EdgeId, IndexedGraph, NodeId};
use crate::index::IndexedVec;
use crate::{Map, OrderedMap, Set};

use super::{HistoryFlow, Mode, OptimizationModel};

/// Builds the flow/cut program over the primary graph (environment times the
/// product automaton) and, in reactive mode, the secondary graph (environment
/// times the system automaton alone).
pub fn build_model(mode: Mode, primary: &IndexedGraph, secondary: &IndexedGraph) -> OptimizationModel {
    let graph = primary.without_self_loops();
    let secondary = secondary.without_self_loops();
    let intermediates = graph
        .intermediates
        .iter()
        .filter(|n| !graph.sinks.contains(*n))
        .copied()
        .collect::<Set<_>>();

    let mut program = Program::new(Sense::Maximize);
    let flow = graph.edges.iter().map(|_| program.add_continuous(0.0, 1.0)).collect();
    let potential = graph
        .nodes()
        .map(|n| (!intermediates.contains(&n)).then(|| program.add_continuous(0.0, 1.0)))
        .collect();

    let touches_intermediate = |&(u, v): &(NodeId, NodeId)| {
        intermediates.contains(&u) || intermediates.contains(&v)
    };
    let cut = graph
        .edges
        .iter()
        .map(|edge| match mode {
            Mode::Reactive if touches_intermediate(edge) => None,
            _ => Some(program.add_binary()),
        })
        .collect();

    let mut builder = ModelBuilder {
        adjacency: graph.adjacency(),
        model: OptimizationModel {
            mode,
            program,
            graph,
            secondary,
            intermediates,
            flow,
            cut,
            potential,
            histories: Vec::new(),
        },
    };

    builder.objective();
    builder.conservation();
    builder.cut_constraints();
    builder.partition();
    match mode {
        Mode::Static => builder.symmetry(),
        Mode::Reactive => builder.histories(),
    }

    let model = builder.model;
    debug!(
        ?mode,
        binaries = model.program.binary_count(),
        continuous = model.program.continuous_count(),
        constraints = model.program.constraint_count(),
        histories = model.histories.len(),
        "built optimization model"
    );
    model
}

struct ModelBuilder {
    model: OptimizationModel,
    adjacency: Adjacency,
}

impl ModelBuilder {
    fn objective(&mut self) {
        let m = &mut self.model;

        // An edgeless graph gets no penalty; its flow constraint cannot hold anyway.
        let weight = match m.graph.edges.len() {
            0 => 0.0,
            n => 1.0 / n as f64,
        };

        let flows = m.source_edges().map(|e| (m.flow[e], 1.0)).collect::<Vec<_>>();
        let cuts = m.cut_domain().map(|(_, d)| (d, -weight)).collect::<Vec<_>>();
        m.program.set_objective(flows.into_iter().chain(cuts).collect());
    }

    fn conservation(&mut self) {
        let m = &mut self.model;

        for n in m.graph.nodes() {
            if m.graph.init.contains(&n) || m.graph.sinks.contains(&n) {
                continue;
            }

            let (incoming, outgoing) = (&self.adjacency.incoming[n], &self.adjacency.outgoing[n]);
            if incoming.is_empty() && outgoing.is_empty() {
                continue;
            }

            let inflow = incoming.iter().map(|&e| (m.flow[e], 1.0));
            let outflow = outgoing.iter().map(|&e| (m.flow[e], -1.0));
            m.program.add_constraint(inflow.chain(outflow).collect(), Cmp::Eq, 0.0);
        }

        let total = LinExpr::sum(m.source_edges().map(|e| m.flow[e]).collect::<Vec<_>>());
        m.program.add_constraint(total, Cmp::Ge, 1.0);

        for (e, &(u, v)) in m.graph.edges.enumerate() {
            if m.graph.init.contains(&v) || m.graph.sinks.contains(&u) {
                m.program.add_constraint(LinExpr::sum([m.flow[e]]), Cmp::Eq, 0.0);
            }
        }
    }

    /// A cut edge carries no flow.
    fn cut_constraints(&mut self) {
        let m = &mut self.model;

        let domain = m.cut_domain().collect::<Vec<_>>();
        for (e, d) in domain {
            m.program.add_constraint(LinExpr::new().term(m.flow[e], 1.0).term(d, 1.0), Cmp::Le, 1.0);
        }
    }

    /// Potentials separate sources from sinks, and every edge crossing from the
    /// source side to the sink side must be cut.
    fn partition(&mut self) {
        let m = &mut self.model;

        let side = |n: NodeId| m.potential[n];
        let sources = m.graph.init.iter().filter_map(|&n| side(n)).collect::<Vec<_>>();
        let sinks = m.graph.sinks.iter().filter_map(|&n| side(n)).collect::<Vec<_>>();

        let mut rows = Vec::new();
        for &i in &sources {
            for &j in &sinks {
                rows.push((LinExpr::new().term(i, 1.0).term(j, -1.0), 1.0));
            }
        }

        for e in m.edges_without_intermediates() {
            let (u, v) = m.graph.edges[e];
            let (Some(d), Some(mu), Some(mv)) = (m.cut[e], side(u), side(v)) else {
                continue;
            };
            rows.push((LinExpr::new().term(d, 1.0).term(mu, -1.0).term(mv, 1.0), 0.0));
        }

        for (expr, rhs) in rows {
            m.program.add_constraint(expr, Cmp::Ge, rhs);
        }
    }

    /// Edges between the same pair of environment states share one cut decision,
    /// whatever the automaton states are, and so do edges between the reversed pair.
    fn symmetry(&mut self) {
        let m = &mut self.model;

        let mut groups = OrderedMap::<(EnvStateId, EnvStateId), Vec<VarId>>::default();
        for (e, &(u, v)) in m.graph.edges.enumerate() {
            if let Some(d) = m.cut[e] {
                let key = (m.graph.state_of(u).env, m.graph.state_of(v).env);
                groups.entry(key).or_default().push(d);
            }
        }

        let mut equalities = Vec::new();
        for (idx, (&(s, t), ds)) in groups.iter().enumerate() {
            equalities.extend(ds.windows(2).map(|w| (w[0], w[1])));

            // Tie each unordered pair once, from the group that comes first.
            if let Some((reverse_idx, _, reverse)) = groups.get_full(&(t, s)) {
                if idx < reverse_idx {
                    equalities.push((ds[0], reverse[0]));
                }
            }
        }

        for (a, b) in equalities {
            m.program.add_constraint(LinExpr::new().term(a, 1.0).term(b, -1.0), Cmp::Eq, 0.0);
        }
    }

    /// For every automaton history, the system must still be able to reach its
    /// goal in the secondary graph from wherever that history can start, around
    /// the cuts placed on edges leaving states with that history.
    fn histories(&mut self) {
        let corr = Correspondence::between(&self.model.graph, &self.model.secondary);
        let m = &mut self.model;

        let histories = m.graph.forward.iter().map(|s| s.aut).collect::<BTreeSet<_>>();
        let reaching = m.secondary.can_reach(&m.secondary.sinks);

        let secondary_edges = m
            .secondary
            .edges
            .enumerate()
            .map(|(e, &edge)| (edge, e))
            .collect::<Map<_, _>>();
        let secondary_adjacency = m.secondary.adjacency();

        for q in histories {
            let candidates = candidate_sources(m, &corr, &reaching, q).collect::<Set<_>>();
            for source in candidates {
                if m.secondary.sinks.contains(&source) {
                    continue;
                }

                let flow = m
                    .secondary
                    .edges
                    .iter()
                    .map(|_| m.program.add_continuous(0.0, 1.0))
                    .collect::<IndexedVec<EdgeId, _>>();

                secondary_flow(m, &secondary_adjacency, &flow, source);

                let aut_of = |n: NodeId| m.graph.state_of(n).aut;
                let mut couplings = Vec::new();
                for (e, d) in m.cut_domain() {
                    let (i, j) = m.graph.edges[e];
                    if aut_of(i) != q {
                        continue;
                    }
                    for &si in corr.images(i) {
                        for &sj in corr.images(j) {
                            if let Some(&se) = secondary_edges.get(&(si, sj)) {
                                couplings.push((flow[se], d));
                            }
                        }
                    }
                }
                for (g, d) in couplings {
                    m.program.add_constraint(LinExpr::new().term(g, 1.0).term(d, 1.0), Cmp::Le, 1.0);
                }

                m.histories.push(HistoryFlow { history: q, source, flow });
            }
        }
    }
}

/// Secondary nodes from which the system may have to restart once the primary
/// graph enters history `q`. The initial history starts from the secondary
/// graph's own initial nodes.
fn candidate_sources<'a>(
    m: &'a OptimizationModel,
    corr: &'a Correspondence,
    reaching: &'a Set<NodeId>,
    q: AutStateId,
) -> impl Iterator<Item = NodeId> + 'a {
    if q == m.graph.aut_init {
        return Either::Left(m.secondary.init.iter().copied());
    }

    let aut_of = move |n: NodeId| m.graph.state_of(n).aut;
    let entries = m.graph.edges.iter().filter(move |&&(u, v)| aut_of(v) == q && aut_of(u) != q);

    Either::Right(
        entries
            .flat_map(move |&(_, v)| corr.images(v))
            .filter(move |s| reaching.contains(*s))
            .copied(),
    )
}

fn secondary_flow(
    m: &mut OptimizationModel,
    adjacency: &Adjacency,
    flow: &IndexedVec<EdgeId, VarId>,
    source: NodeId,
) {
    let secondary = &m.secondary;
    let program = &mut m.program;

    let into_sinks = secondary
        .edges
        .enumerate()
        .filter(|(_, (_, v))| secondary.sinks.contains(v))
        .map(|(e, _)| flow[e]);
    program.add_constraint(LinExpr::sum(into_sinks), Cmp::Ge, 1.0);

    for n in secondary.nodes() {
        if n == source || secondary.sinks.contains(&n) {
            continue;
        }

        let (incoming, outgoing) = (&adjacency.incoming[n], &adjacency.outgoing[n]);
        if incoming.is_empty() && outgoing.is_empty() {
            continue;
        }

        let inflow = incoming.iter().map(|&e| (flow[e], 1.0));
        let outflow = outgoing.iter().map(|&e| (flow[e], -1.0));
        program.add_constraint(inflow.chain(outflow).collect(), Cmp::Eq, 0.0);
    }

    for (e, &(u, v)) in secondary.edges.enumerate() {
        if v == source || secondary.sinks.contains(&u) {
            program.add_constraint(LinExpr::sum([flow[e]]), Cmp::Eq, 0.0);
        }
    }
}
