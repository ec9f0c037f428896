//! Reads a test-environment synthesis problem, compiles its formulas and asks
//! `flowcut` which transitions to block.

pub mod pipeline;
pub mod problem;


pub use pipeline::{synthesize, Synthesis};
pub use problem::Problem;
