//! Shared test fixtures for the unit test suites.
//! This module exists to avoid repeating grid, hazard and arena setup across many tests.
//! It does not own production logic.

use std::time::Duration;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::grid::Grid;
use crate::hazard::HazardSource;
use crate::level::Level;
use crate::types::{Cell, HazardId};

pub(crate) fn open_grid(width: usize, height: usize) -> Grid {
    Grid::new(width, height)
}

/// Grid from an ASCII layout; see [`Level::parse`] for the legend.
pub(crate) fn grid_from(layout: &str) -> Grid {
    Level::parse(layout).expect("fixture layout must parse").grid
}

pub(crate) fn hazard_at(cell: Cell, blast_radius: u32, fuse_ms: u64) -> HazardSource {
    HazardSource::armed(HazardId(0), None, cell, Duration::from_millis(fuse_ms), blast_radius)
}

/// Default tuning with a fixed seed.
pub(crate) fn bot_config() -> ArenaConfig {
    ArenaConfig { seed: 7, ..ArenaConfig::default() }
}

pub(crate) fn arena_from(layout: &str, config: ArenaConfig) -> Arena {
    let level = Level::parse(layout).expect("fixture layout must parse");
    Arena::from_level(config, level).expect("fixture config must validate")
}
