use std::fmt;

use crate::index::{AsIndex, IndexedSet, IndexedVec};
use crate::{new_index, Error, Map, Result, Set};

new_index!(pub index AutStateId);

/// Boolean formula over the atomic propositions of an automaton, referenced by position.
///
/// `And(vec![])` is true and `Or(vec![])` is false.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Guard {
    Ap(usize),
    Not(Box<Guard>),
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

impl Guard {
    pub const TRUE: Guard = Guard::And(Vec::new());
    pub const FALSE: Guard = Guard::Or(Vec::new());

    pub fn eval(&self, val: &dyn Fn(usize) -> bool) -> bool {
        match self {
            Guard::Ap(ap) => val(*ap),
            Guard::Not(g) => !g.eval(val),
            Guard::And(gs) => gs.iter().all(|g| g.eval(val)),
            Guard::Or(gs) => gs.iter().any(|g| g.eval(val)),
        }
    }

    /// Evaluates the guard when exactly the propositions set in `valuation` hold.
    pub fn holds(&self, valuation: &[bool]) -> bool {
        self.eval(&|ap| valuation.get(ap).copied().unwrap_or(false))
    }

    pub fn max_ap(&self) -> Option<usize> {
        match self {
            Guard::Ap(ap) => Some(*ap),
            Guard::Not(g) => g.max_ap(),
            Guard::And(gs) | Guard::Or(gs) => gs.iter().filter_map(Guard::max_ap).max(),
        }
    }

    fn collect_aps(&self, aps: &mut Set<usize>) {
        match self {
            Guard::Ap(ap) => _ = aps.insert(*ap),
            Guard::Not(g) => g.collect_aps(aps),
            Guard::And(gs) | Guard::Or(gs) => gs.iter().for_each(|g| g.collect_aps(aps)),
        }
    }

    /// Value under a partial assignment, `None` while it still depends on
    /// propositions that are not assigned.
    fn eval_partial(&self, assigned: &Map<usize, bool>) -> Option<bool> {
        let fold = |gs: &[Guard], absorbing: bool| {
            let mut decided = Some(!absorbing);
            for g in gs {
                match g.eval_partial(assigned) {
                    Some(b) if b == absorbing => return Some(absorbing),
                    Some(_) => {}
                    None => decided = None,
                }
            }
            decided
        };

        match self {
            Guard::Ap(ap) => assigned.get(ap).copied(),
            Guard::Not(g) => g.eval_partial(assigned).map(|b| !b),
            Guard::And(gs) => fold(gs.as_slice(), false),
            Guard::Or(gs) => fold(gs.as_slice(), true),
        }
    }

    /// Splits on one proposition at a time and stops as soon as the assigned
    /// ones decide the guard.
    pub fn is_satisfiable(&self) -> bool {
        let mut aps = Set::default();
        self.collect_aps(&mut aps);
        let aps = aps.into_iter().collect::<Vec<_>>();

        self.search(&aps, &mut Map::default())
    }

    fn search(&self, aps: &[usize], assigned: &mut Map<usize, bool>) -> bool {
        if let Some(value) = self.eval_partial(assigned) {
            return value;
        }
        let Some((&ap, rest)) = aps.split_first() else {
            return false;
        };

        let found = [true, false].into_iter().any(|value| {
            assigned.insert(ap, value);
            self.search(rest, assigned)
        });
        assigned.remove(&ap);
        found
    }

    fn remap(&self, map: &[usize]) -> Guard {
        match self {
            Guard::Ap(ap) => Guard::Ap(map[*ap]),
            Guard::Not(g) => Guard::Not(Box::new(g.remap(map))),
            Guard::And(gs) => Guard::And(gs.iter().map(|g| g.remap(map)).collect()),
            Guard::Or(gs) => Guard::Or(gs.iter().map(|g| g.remap(map)).collect()),
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, gs: &[Guard], sep: &str| {
            write!(f, "(")?;
            for (i, g) in gs.iter().enumerate() {
                if i != 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{g}")?;
            }
            write!(f, ")")
        };

        match self {
            Guard::Ap(ap) => write!(f, "{ap}"),
            Guard::Not(g) => write!(f, "!{g}"),
            Guard::And(gs) if gs.is_empty() => write!(f, "t"),
            Guard::Or(gs) if gs.is_empty() => write!(f, "f"),
            Guard::And(gs) => join(f, gs, "&"),
            Guard::Or(gs) => join(f, gs, "|"),
        }
    }
}

/// An automaton as produced by an LTL translator, before it is assigned an objective.
#[derive(Clone, Debug)]
pub struct Automaton {
    pub aps: Vec<String>,
    pub init: AutStateId,
    pub transitions: IndexedVec<AutStateId, Vec<(Guard, AutStateId)>>,
    pub accepting: Set<AutStateId>,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Sys,
    Test,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sys => write!(f, "sys"),
            Role::Test => write!(f, "test"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AcceptanceStructure {
    pub aps: Vec<String>,
    pub init: AutStateId,
    pub transitions: IndexedVec<AutStateId, Vec<(Guard, AutStateId)>>,
    pub sys: Set<AutStateId>,
    pub test: Set<AutStateId>,
}

impl AcceptanceStructure {
    /// Tags the accepting states of `aut` with a single objective.
    pub fn single(aut: Automaton, role: Role) -> Self {
        let (mut sys, mut test) = (Set::default(), Set::default());
        match role {
            Role::Sys => sys = aut.accepting,
            Role::Test => test = aut.accepting,
        }

        Self { aps: aut.aps, init: aut.init, transitions: aut.transitions, sys, test }
    }

    /// Synchronous product of the system and tester automata, restricted to the pairs
    /// reachable from the initial pair. The `sys` objective accepts in the pairs whose
    /// first component accepts, the `test` objective in those whose second one does.
    pub fn product(sys: &Automaton, test: &Automaton) -> Result<Self> {
        if sys.accepting.is_empty() {
            return Err(Error::MissingAcceptingStates(Role::Sys));
        }
        if test.accepting.is_empty() {
            return Err(Error::MissingAcceptingStates(Role::Test));
        }

        // Propositions shared by both automata are merged by name.
        let mut aps = Set::default();
        let sys_map = sys.aps.iter().map(|ap| aps.insert_full(ap.clone()).0).collect::<Vec<_>>();
        let test_map = test.aps.iter().map(|ap| aps.insert_full(ap.clone()).0).collect::<Vec<_>>();

        let mut pairs = IndexedSet::<AutStateId, (AutStateId, AutStateId)>::default();
        let (init, _) = pairs.insert_full((sys.init, test.init));
        let mut transitions = IndexedVec::new();

        // `pairs` doubles as the queue: states are expanded in discovery order.
        while transitions.len() < pairs.len() {
            let (q1, q2) = pairs[AutStateId(transitions.len())];

            let mut edges = Vec::new();
            for (g1, p1) in &sys.transitions[q1] {
                for (g2, p2) in &test.transitions[q2] {
                    let guard = Guard::And(vec![g1.remap(&sys_map), g2.remap(&test_map)]);
                    if !guard.is_satisfiable() {
                        continue;
                    }

                    let (p, _) = pairs.insert_full((*p1, *p2));
                    edges.push((guard, p));
                }
            }
            transitions.push(edges);
        }

        let accepting_where = |accepting: &dyn Fn(&(AutStateId, AutStateId)) -> bool| {
            pairs.enumerate().filter(|&(_, pair)| accepting(pair)).map(|(q, _)| q).collect()
        };
        let sys_acc: Set<_> = accepting_where(&|&(q1, _)| sys.accepting.contains(&q1));
        let test_acc: Set<_> = accepting_where(&|&(_, q2)| test.accepting.contains(&q2));

        Ok(Self { aps: aps.into_iter().collect(), init, transitions, sys: sys_acc, test: test_acc })
    }

    pub fn accepting(&self, role: Role) -> &Set<AutStateId> {
        match role {
            Role::Sys => &self.sys,
            Role::Test => &self.test,
        }
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Truth value of each proposition of the automaton under the given label.
    pub fn valuation<S: AsRef<str>>(&self, label: impl IntoIterator<Item = S>) -> Vec<bool> {
        let mut valuation = vec![false; self.aps.len()];
        for prop in label {
            if let Some(pos) = self.aps.iter().position(|ap| ap == prop.as_ref()) {
                valuation[pos] = true;
            }
        }
        valuation
    }

    /// The states `q` moves to when reading a label with the given valuation.
    pub fn successors<'a>(
        &'a self,
        q: AutStateId,
        valuation: &'a [bool],
    ) -> impl Iterator<Item = AutStateId> + 'a {
        self.transitions[q].iter().filter(|(g, _)| g.holds(valuation)).map(|&(_, p)| p)
    }

    pub fn states(&self) -> impl Iterator<Item = AutStateId> {
        self.transitions.indexes()
    }

    pub fn name_of(q: AutStateId) -> String {
        format!("q{}", q.to_usize())
    }
}

#[cfg(test)]
mod test;
