use crate::index::{IndexedSet, IndexedVec};
use crate::{new_index, Error, Result, Set};

new_index!(pub index EnvStateId);
new_index!(
    /// Position of a successor in the successor list of its state.
    pub index ActionId
);

/// Environment states, successors and labels, all by name.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentInput {
    pub states: Vec<String>,
    pub transitions: Vec<(String, Vec<String>)>,
    pub labels: Vec<(String, Vec<String>)>,
    pub init: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct EnvironmentModel {
    pub states: IndexedSet<EnvStateId, String>,
    pub transitions: IndexedVec<EnvStateId, Vec<(ActionId, EnvStateId)>>,
    pub labels: IndexedVec<EnvStateId, Set<String>>,
    pub init: Vec<EnvStateId>,
}

impl EnvironmentModel {
    pub fn new(input: &EnvironmentInput) -> Result<Self> {
        let mut states = IndexedSet::default();
        for name in &input.states {
            let (_, is_new) = states.insert_full(name.clone());
            if !is_new {
                return Err(Error::DuplicateState(name.clone()));
            }
        }

        let lookup = |name: &String| -> Result<EnvStateId> {
            states.get_index_of(name).ok_or_else(|| Error::UnknownState(name.clone()))
        };

        let mut transitions = states.indexes().map(|_| Vec::new()).collect::<IndexedVec<_, _>>();
        for (from, succs) in &input.transitions {
            let from = lookup(from)?;
            for to in succs {
                let action = ActionId(transitions[from].len());
                transitions[from].push((action, lookup(to)?));
            }
        }

        let mut labels = states.indexes().map(|_| Set::default()).collect::<IndexedVec<_, _>>();
        for (state, props) in &input.labels {
            labels[lookup(state)?].extend(props.iter().cloned());
        }

        let init = input.init.iter().map(lookup).collect::<Result<Vec<_>>>()?;

        Ok(Self { states, transitions, labels, init })
    }

    pub fn name(&self, s: EnvStateId) -> &str {
        &self.states[s]
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }
}
