use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flowcut::engine::BranchAndBound;
use flowcut::solve::SolveConfig;
use flowsynth::{synthesize, Problem};
use hoa::Ltl2tgba;
use tracing_subscriber::EnvFilter;

/// Finds the transitions to block so that every run meeting the system objective
/// also meets the tester objective, while the system objective stays reachable.
#[derive(Parser)]
#[command(name = "flowsynth", version)]
struct Cli {
    /// JSON problem description.
    problem: PathBuf,

    /// The `ltl2tgba` executable from Spot.
    #[arg(long, default_value = "ltl2tgba")]
    ltl2tgba: PathBuf,

    /// Seconds without improvement before stopping with the best solution.
    #[arg(long, default_value_t = 60)]
    stall_secs: u64,

    /// Seconds to wait for a first solution.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// Where to write the solver report.
    #[arg(long, default_value = "log/opt_data.json")]
    report: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let problem = Problem::load(&cli.problem)?;
    let compiler = Ltl2tgba { program: cli.ltl2tgba };
    let config = SolveConfig {
        stall: Duration::from_secs(cli.stall_secs),
        timeout: Duration::from_secs(cli.timeout_secs),
        ..SolveConfig::default()
    };

    let synthesis = synthesize(&problem, &compiler, &mut BranchAndBound::default(), &config)?;
    let outcome = &synthesis.outcome;

    for cut in &outcome.cuts {
        println!("{} -> {} at {}", synthesis.describe(cut.from), synthesis.describe(cut.to), cut.value);
    }
    match outcome.flow {
        Some(flow) => println!("flow: {flow}"),
        None => println!("flow: none"),
    }
    println!("status: {:?}", outcome.status);

    if let Some(dir) = cli.report.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&outcome.report)?;
    std::fs::write(&cli.report, json).with_context(|| format!("Failed to write {}", cli.report.display()))?;

    Ok(())
}
