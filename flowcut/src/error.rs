use crate::automaton::{AutStateId, Role};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),
    #[error("unknown state `{0}`")]
    UnknownState(String),
    #[error("the automaton has no accepting states for the {0} objective")]
    MissingAcceptingStates(Role),
    #[error(
        "automaton state q{q} moves to several states {targets:?} on the label of `{target}` (from `{state}`)"
    )]
    ProductAmbiguity { state: String, q: AutStateId, target: String, targets: Vec<AutStateId> },
    #[error("automaton state q{q} has no transition on the label of `{target}` (from `{state}`)")]
    ProductDeadEnd { state: String, q: AutStateId, target: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
