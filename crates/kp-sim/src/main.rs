//! Kanpai Session Simulator
//!
//! Usage:
//!   kp-sim --rate 0.81 --sessions 100000 --seed 7
//!   kp-sim --config game.yaml --pretty
//!   kp-sim --trace session.json --seed 3

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kp_round::{ContinueRate, GameConfig};
use kp_sim::{SimConfig, simulate_batch, trace_session};

#[derive(Parser)]
#[command(name = "kp-sim", about = "Headless Kanpai session simulator")]
struct Cli {
    /// Base continue rate (0.29, 0.50, 0.70, 0.81, 0.90 or 0.99), overrides the config file
    #[arg(short, long)]
    rate: Option<f64>,

    /// Number of sessions to simulate
    #[arg(short = 'n', long, default_value_t = 10_000)]
    sessions: u32,

    /// Base seed, session i uses seed + i
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Round cap per session
    #[arg(long, default_value_t = 10_000)]
    max_rounds: u64,

    /// Game config file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Also write the stage trace of the first session to this file
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut game = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(rate) = cli.rate {
        game.continue_rate = ContinueRate::new(rate).context("Invalid --rate")?;
    }

    log::info!(
        "Simulating {} sessions at {} (seed {})",
        cli.sessions,
        game.continue_rate.percent_label(),
        cli.seed
    );

    if let Some(path) = &cli.trace {
        let trace = trace_session(&game, cli.seed, cli.max_rounds)?;
        let json = trace.to_json().context("Failed to serialize trace")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trace to {}", path.display()))?;
        log::info!("Wrote {} stage events to {}", trace.len(), path.display());
    }

    let sim = SimConfig {
        game,
        sessions: cli.sessions,
        base_seed: cli.seed,
        max_rounds: cli.max_rounds,
    };
    let report = simulate_batch(&sim).context("Simulation failed")?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
