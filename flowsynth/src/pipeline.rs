use anyhow::{Context, Result};
use flowcut::automaton::{AcceptanceStructure, Role};
use flowcut::engine::Engine;
use flowcut::env::EnvironmentModel;
use flowcut::game::{build_game_graph, index, ProductState};
use flowcut::model::build_model;
use flowcut::solve::{optimize, SolveConfig, SolveOutcome};
use hoa::Compiler;
use tracing::info;

use crate::problem::Problem;

/// The solver's answer together with the environment it refers to, so cut edges
/// can be shown with the state names of the problem.
pub struct Synthesis {
    pub env: EnvironmentModel,
    pub outcome: SolveOutcome,
}

impl Synthesis {
    pub fn describe(&self, state: ProductState) -> String {
        format!("({}, {})", self.env.name(state.env), AcceptanceStructure::name_of(state.aut))
    }
}

pub fn synthesize(
    problem: &Problem,
    compiler: &dyn Compiler,
    engine: &mut dyn Engine,
    config: &SolveConfig,
) -> Result<Synthesis> {
    let sys = compiler
        .compile(&problem.sysformula)
        .with_context(|| format!("Failed to compile system formula '{}'", problem.sysformula))?;
    let test = compiler
        .compile(&problem.testformula)
        .with_context(|| format!("Failed to compile tester formula '{}'", problem.testformula))?;

    let product = AcceptanceStructure::product(&sys, &test)?;
    let sys_only = AcceptanceStructure::single(sys, Role::Sys);

    let env = EnvironmentModel::new(&problem.environment()?)?;
    info!(
        states = env.states.len(),
        transitions = env.transition_count(),
        product_states = product.state_count(),
        "loaded problem"
    );

    let primary = index(&build_game_graph(&env, &product)?);
    let secondary = index(&build_game_graph(&env, &sys_only)?);

    let model = build_model(problem.mode, &primary, &secondary);
    let outcome = optimize(&model, engine, config);

    Ok(Synthesis { env, outcome })
}
