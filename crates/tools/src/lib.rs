//! Headless match driver shared by the `arena-sim` and `fuzz` binaries.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::iter;
use std::time::Instant;

use anyhow::{Result, ensure};
use arena_core::{
    AgentId, AgentKind, Arena, BehaviorState, Cell, Grid, Level, LogEvent, PowerUp, TileKind,
};
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Percent of open interior cells that start as soft obstacles.
const SOFT_DENSITY: u64 = 60;
/// Percent of the remaining open cells that hold a power-up.
const POWER_UP_CHANCE: u64 = 6;
const ADVANCE_CHUNK: u32 = 50;

#[derive(Debug, Serialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub kind: AgentKind,
    pub cell: Cell,
    pub state: BehaviorState,
    pub device_capacity: u32,
    pub blast_radius: u32,
}

#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub seed: u64,
    pub ticks: u64,
    pub simulated_ms: u128,
    pub wall_clock_ms: u128,
    pub survivors: Vec<AgentSummary>,
    pub eliminated: Vec<AgentSummary>,
    pub devices_placed: usize,
    pub placements_declined: usize,
    pub emergency_flees: usize,
    pub missed_flee_deadlines: usize,
    pub soft_obstacles_destroyed: usize,
    pub power_ups_collected: usize,
    pub snapshot_hash: u64,
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .with_writer(io::stderr)
        .init();
}

/// Classic layout: hard border, hard pillars on even coordinates, a cleared corner for
/// each of the four spawns and seeded soft obstacles everywhere else.
pub fn generate_level(seed: u64, width: usize, height: usize) -> Result<Level> {
    ensure!(width >= 7 && height >= 7, "arena must be at least 7x7, got {width}x{height}");
    ensure!(width % 2 == 1 && height % 2 == 1, "arena sides must be odd, got {width}x{height}");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = Grid::with_border(width, height);
    let (w, h) = (width as i32, height as i32);
    let spawns =
        vec![Cell::new(1, 1), Cell::new(w - 2, 1), Cell::new(1, h - 2), Cell::new(w - 2, h - 2)];
    let interior = |cell: Cell| cell.x > 0 && cell.y > 0 && cell.x < w - 1 && cell.y < h - 1;
    let cleared: BTreeSet<Cell> = spawns
        .iter()
        .flat_map(|spawn| {
            iter::once(*spawn).chain(spawn.neighbors().into_iter().filter(|cell| interior(*cell)))
        })
        .collect();

    let mut power_ups = BTreeMap::new();
    let cells: Vec<Cell> = grid.cells().filter(|cell| interior(*cell)).collect();
    for cell in cells {
        if cell.x % 2 == 0 && cell.y % 2 == 0 {
            grid.set_tile(cell, TileKind::HardObstacle);
            continue;
        }
        if cleared.contains(&cell) {
            continue;
        }
        let roll = rng.next_u64() % 100;
        if roll < SOFT_DENSITY {
            grid.set_tile(cell, TileKind::SoftObstacle);
        } else if roll < SOFT_DENSITY + POWER_UP_CHANCE {
            let power_up =
                if rng.next_u64() % 2 == 0 { PowerUp::ExtraDevice } else { PowerUp::BlastRadius };
            power_ups.insert(cell, power_up);
        }
    }
    Ok(Level { grid, spawns, power_ups })
}

/// Advances until one agent or none is left standing, or the tick budget runs out.
pub fn run_match(arena: &mut Arena, max_ticks: u64) -> MatchReport {
    let started = Instant::now();
    while arena.tick() < max_ticks && arena.agents().alive_count() > 1 {
        let budget = (max_ticks - arena.tick()).min(u64::from(ADVANCE_CHUNK)) as u32;
        let result = arena.advance(budget);
        tracing::debug!(tick = arena.tick(), stop = ?result.stop_reason, "advanced");
    }
    let report = summarize(arena, started);
    tracing::info!(
        ticks = report.ticks,
        survivors = report.survivors.len(),
        devices = report.devices_placed,
        "match finished"
    );
    report
}

fn summarize(arena: &Arena, started: Instant) -> MatchReport {
    let (survivors, eliminated): (Vec<_>, Vec<_>) = arena
        .agents()
        .iter()
        .map(|agent| AgentSummary {
            id: agent.id(),
            kind: agent.kind(),
            cell: agent.cell(),
            state: agent.state(),
            device_capacity: agent.device_capacity(),
            blast_radius: agent.blast_radius(),
        })
        .partition(|summary| summary.state != BehaviorState::Eliminated);
    let count = |pred: fn(&LogEvent) -> bool| arena.log().iter().filter(|event| pred(event)).count();

    MatchReport {
        seed: arena.config().seed,
        ticks: arena.tick(),
        simulated_ms: arena.now().as_millis(),
        wall_clock_ms: started.elapsed().as_millis(),
        survivors,
        eliminated,
        devices_placed: count(|event| matches!(event, LogEvent::DevicePlaced { .. })),
        placements_declined: count(|event| matches!(event, LogEvent::PlacementDeclined { .. })),
        emergency_flees: count(|event| matches!(event, LogEvent::FleeStarted { emergency: true, .. })),
        missed_flee_deadlines: count(|event| matches!(event, LogEvent::FleeDeadlineMissed { .. })),
        soft_obstacles_destroyed: count(|event| matches!(event, LogEvent::SoftObstacleDestroyed { .. })),
        power_ups_collected: count(|event| matches!(event, LogEvent::PowerUpCollected { .. })),
        snapshot_hash: arena.snapshot_hash(),
    }
}
