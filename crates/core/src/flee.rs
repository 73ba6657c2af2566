//! Flee planner. This module exists to pick the nearest reachable safe cell for an
//! endangered agent and route it there without crossing back into danger.
//! It does not own flee deadlines or state transitions; the behavior controller does.

use crate::grid::Grid;
use crate::hazard::{HazardSource, is_cell_hazardous, is_cell_hazardous_with_margin};
use crate::pathfinding::{OpenGroundCost, find_path, reachable_cells};
use crate::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FleeSettings {
    /// Largest Manhattan ring scanned for a safe cell.
    pub search_radius: u32,
    pub blast_margin: u32,
}

impl Default for FleeSettings {
    fn default() -> Self {
        Self { search_radius: 8, blast_margin: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FleeKind {
    Planned,
    /// No safe cell was reachable; the path is at most one step.
    Emergency,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FleePlan {
    pub path: Vec<Cell>,
    pub kind: FleeKind,
    pub target: Option<Cell>,
}

pub fn plan_flee(
    grid: &Grid,
    agent_cell: Cell,
    hazards: &[HazardSource],
    settings: &FleeSettings,
) -> FleePlan {
    if let Some((target, path)) = planned_route(grid, agent_cell, hazards, settings) {
        return FleePlan { path, kind: FleeKind::Planned, target: Some(target) };
    }
    let step = emergency_step(grid, agent_cell, hazards);
    FleePlan { path: step.into_iter().collect(), kind: FleeKind::Emergency, target: step }
}

/// Whether an agent at `cell` could reach safety through a planned route.
pub fn escape_exists(
    grid: &Grid,
    cell: Cell,
    hazards: &[HazardSource],
    settings: &FleeSettings,
) -> bool {
    escape_route(grid, cell, hazards, settings).is_some()
}

/// The planned route [`plan_flee`] would take, without the emergency fallback.
pub fn escape_route(
    grid: &Grid,
    cell: Cell,
    hazards: &[HazardSource],
    settings: &FleeSettings,
) -> Option<Vec<Cell>> {
    planned_route(grid, cell, hazards, settings).map(|(_, path)| path)
}

fn planned_route(
    grid: &Grid,
    agent_cell: Cell,
    hazards: &[HazardSource],
    settings: &FleeSettings,
) -> Option<(Cell, Vec<Cell>)> {
    let is_safe =
        |cell: Cell| !is_cell_hazardous_with_margin(grid, cell, hazards, settings.blast_margin);
    if is_safe(agent_cell) {
        return Some((agent_cell, Vec::new()));
    }

    let reachable = reachable_cells(grid, agent_cell, hazards, true, u32::MAX);
    for radius in 1..=settings.search_radius {
        let mut ring: Vec<(u32, Cell)> = reachable
            .iter()
            .filter(|(cell, _)| agent_cell.manhattan(**cell) == radius)
            .filter(|(cell, _)| grid.is_free(**cell) && is_safe(**cell))
            .map(|(cell, dist)| (*dist, *cell))
            .collect();
        ring.sort();
        for (_, target) in ring {
            if let Some(path) =
                find_path(grid, agent_cell, target, true, hazards, &OpenGroundCost)
            {
                return Some((target, path));
            }
        }
    }
    None
}

/// One step onto a free, device-free neighbour, preferring one outside every blast.
fn emergency_step(grid: &Grid, agent_cell: Cell, hazards: &[HazardSource]) -> Option<Cell> {
    let open: Vec<Cell> = agent_cell
        .neighbors()
        .into_iter()
        .filter(|cell| grid.is_free(*cell))
        .filter(|cell| !hazards.iter().any(|hazard| hazard.is_live() && hazard.cell == *cell))
        .collect();
    open.iter()
        .copied()
        .find(|cell| !is_cell_hazardous(grid, *cell, hazards))
        .or_else(|| open.first().copied())
}
