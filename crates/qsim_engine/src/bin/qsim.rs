//! qsim
//!
//! Compiles a pulse program dictionary against a configuration table and
//! prints the requested stage as JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use qsim_core::QuaConfig;
use qsim_engine::{Pipeline, SimulationConfig};
use std::path::PathBuf;

/// Stage to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Statement AST
    Ast,
    /// Per-element timelines
    Timelines,
    /// Per-shot pulse schedules
    Schedules,
}

/// Command line arguments for qsim
#[derive(Parser, Debug)]
#[command(name = "qsim", version)]
#[command(about = "Compile a pulse program into instruction timelines and pulse schedules")]
struct Args {
    /// Program dictionary (JSON)
    program: PathBuf,

    /// Configuration table (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Simulation settings (JSON); channels are derived from the table when omitted
    #[arg(long)]
    channels: Option<PathBuf>,

    /// Stage to print
    #[arg(long, value_enum, default_value_t = Emit::Schedules)]
    emit: Emit,

    /// Keep the empty shot left behind by a final measurement
    #[arg(long)]
    keep_trailing_shot: bool,

    /// Log pipeline stages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let program_text = std::fs::read_to_string(&args.program)
        .with_context(|| format!("reading program {}", args.program.display()))?;
    let program: serde_json::Value = serde_json::from_str(&program_text)
        .with_context(|| format!("parsing program {}", args.program.display()))?;

    let config = QuaConfig::from_file(&args.config)
        .with_context(|| format!("loading configuration {}", args.config.display()))?;

    let simulation = match &args.channels {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading simulation settings {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let simulation = simulation.with_verbose(args.verbose);
    let simulation = if args.keep_trailing_shot {
        simulation.with_drop_empty_trailing_shot(false)
    } else {
        simulation
    };
    log::info!("{}", simulation);

    let mut pipeline = Pipeline::new(config, simulation).context("invalid simulation settings")?;

    let output = match args.emit {
        Emit::Ast => serde_json::to_string_pretty(
            pipeline.parse(&program).context("compiling program")?,
        )?,
        Emit::Timelines => {
            pipeline.parse(&program).context("compiling program")?;
            serde_json::to_string_pretty(pipeline.lower().context("lowering to timelines")?)?
        }
        Emit::Schedules => {
            serde_json::to_string_pretty(pipeline.run(&program).context("building schedules")?)?
        }
    };

    println!("{}", output);
    Ok(())
}
