pub mod automaton;
pub mod engine;
pub mod env;
mod error;
#[cfg(test)]
mod fixtures;
pub mod game;
pub mod index;
pub mod model;
pub mod solve;

pub use error::{Error, Result};

pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;
