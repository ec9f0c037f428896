use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use flowcut::automaton::Automaton;
use tracing::debug;

use crate::parse_hoa;

/// Translates a temporal logic formula into an automaton.
pub trait Compiler {
    fn compile(&self, formula: &str) -> Result<Automaton>;
}

/// Runs Spot's `ltl2tgba`, asking for a complete state-based Büchi automaton,
/// deterministic whenever Spot can produce one.
#[derive(Clone, Debug)]
pub struct Ltl2tgba {
    pub program: PathBuf,
}

impl Default for Ltl2tgba {
    fn default() -> Self {
        Self { program: PathBuf::from("ltl2tgba") }
    }
}

impl Compiler for Ltl2tgba {
    fn compile(&self, formula: &str) -> Result<Automaton> {
        let output = Command::new(&self.program)
            .args(["-B", "-D", "-S", "-C", "-H", "-f", formula])
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed on '{formula}': {}", self.program.display(), stderr.trim());
        }

        let hoa = String::from_utf8(output.stdout).context("Output is not UTF-8")?;
        let aut = parse_hoa(&hoa).with_context(|| format!("Invalid automaton for '{formula}'"))?;
        debug!(formula, states = aut.transitions.len(), "compiled formula");
        Ok(aut)
    }
}
