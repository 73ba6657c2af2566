use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_core::{AgentKind, Arena, ArenaConfig, Level};
use clap::Parser;
use tools::{generate_level, init_tracing, run_match};

#[derive(Parser)]
#[command(author, version, about = "Runs a headless bot match and prints a summary", long_about = None)]
struct Args {
    /// ASCII level layout; a classic arena is generated when omitted
    #[arg(short, long)]
    level: Option<PathBuf>,
    /// TOML arena configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the configured seed
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(short, long, default_value_t = 2400)]
    ticks: u64,
    #[arg(long, default_value_t = 13)]
    width: usize,
    #[arg(long, default_value_t = 11)]
    height: usize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let level = match &args.level {
        Some(path) => {
            let layout = fs::read_to_string(path)
                .with_context(|| format!("Failed to read level file: {}", path.display()))?;
            Level::parse(&layout).with_context(|| format!("Invalid level: {}", path.display()))?
        }
        None => generate_level(config.seed, args.width, args.height)?,
    };

    let spawns = level.spawns.clone();
    let mut arena = Arena::from_level(config, level).context("Invalid arena configuration")?;
    for cell in spawns {
        arena.spawn_agent(AgentKind::Bot, cell).with_context(|| format!("Cannot spawn at {cell:?}"))?;
    }

    let report = run_match(&mut arena, args.ticks);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Match complete.");
    println!("Seed: {}", report.seed);
    println!("Ticks: {} ({} ms simulated)", report.ticks, report.simulated_ms);
    println!("Devices placed: {} (declined {})", report.devices_placed, report.placements_declined);
    println!("Soft obstacles destroyed: {}", report.soft_obstacles_destroyed);
    println!("Power-ups collected: {}", report.power_ups_collected);
    println!("Emergency flees: {}", report.emergency_flees);
    for agent in &report.survivors {
        println!("Survivor {:?} at {:?} ({:?})", agent.id, agent.cell, agent.state);
    }
    println!("Eliminated: {}", report.eliminated.len());
    println!("Snapshot Hash: {}", report.snapshot_hash);

    Ok(())
}
