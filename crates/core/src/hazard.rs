//! Hazard model. This module exists to answer which cells a live or detonated device
//! endangers, with line-of-sight blocking along each blast arm.
//! It does not own fuse countdown or detonation; the arena tick loop drives those.

use std::time::Duration;

use crate::grid::Grid;
use crate::types::{AgentId, Cell, Direction, HazardId, TileKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HazardSource {
    pub id: HazardId,
    /// `None` for devices injected by a host without an owning agent.
    pub owner: Option<AgentId>,
    pub cell: Cell,
    pub remaining_fuse: Duration,
    pub blast_radius: u32,
    pub detonated: bool,
    pub blast_remaining: Duration,
    /// Frozen at detonation; empty while the fuse is burning.
    pub blast_cells: Vec<Cell>,
}

impl HazardSource {
    pub fn armed(
        id: HazardId,
        owner: Option<AgentId>,
        cell: Cell,
        fuse: Duration,
        blast_radius: u32,
    ) -> Self {
        Self {
            id,
            owner,
            cell,
            remaining_fuse: fuse,
            blast_radius,
            detonated: false,
            blast_remaining: Duration::ZERO,
            blast_cells: Vec::new(),
        }
    }

    /// Undetonated devices are solid and still ticking.
    pub fn is_live(&self) -> bool {
        !self.detonated
    }
}

pub fn is_cell_in_blast_path(grid: &Grid, cell: Cell, hazard: &HazardSource) -> bool {
    in_blast_path_with_margin(grid, cell, hazard, 0)
}

pub fn is_cell_hazardous(grid: &Grid, cell: Cell, hazards: &[HazardSource]) -> bool {
    hazards.iter().any(|hazard| is_cell_in_blast_path(grid, cell, hazard))
}

/// Whether `to` lies in a blast that does not already cover `from`. Walking further
/// along a cross the agent stands in is allowed; stepping into another one is not.
pub fn enters_new_blast(grid: &Grid, from: Cell, to: Cell, hazards: &[HazardSource]) -> bool {
    hazards.iter().any(|hazard| {
        is_cell_in_blast_path(grid, to, hazard) && !is_cell_in_blast_path(grid, from, hazard)
    })
}

/// Like [`is_cell_hazardous`], with every live arm stretched by `margin` cells.
/// Active blasts keep their frozen footprint.
pub fn is_cell_hazardous_with_margin(
    grid: &Grid,
    cell: Cell,
    hazards: &[HazardSource],
    margin: u32,
) -> bool {
    hazards.iter().any(|hazard| in_blast_path_with_margin(grid, cell, hazard, margin))
}

/// Cells a blast from `origin` reaches: the origin, then each arm up to and including
/// its first obstacle.
pub fn blast_path(grid: &Grid, origin: Cell, radius: u32) -> Vec<Cell> {
    let mut cells = vec![origin];
    for dir in Direction::ALL {
        for distance in 1..=i32::try_from(radius).unwrap_or(i32::MAX) {
            let cell = origin.offset(dir, distance);
            cells.push(cell);
            if grid.classify(cell).is_obstacle() {
                break;
            }
        }
    }
    cells
}

/// The footprint frozen at detonation. Hard obstacles stop the arm but are never part
/// of what the blast consumes.
pub fn blast_cells(grid: &Grid, hazard: &HazardSource) -> Vec<Cell> {
    blast_path(grid, hazard.cell, hazard.blast_radius)
        .into_iter()
        .filter(|cell| grid.classify(*cell) != TileKind::HardObstacle)
        .collect()
}

fn in_blast_path_with_margin(grid: &Grid, cell: Cell, hazard: &HazardSource, margin: u32) -> bool {
    if hazard.detonated {
        return hazard.blast_cells.contains(&cell);
    }
    if cell == hazard.cell {
        return true;
    }
    let Some(dir) = hazard.cell.axis_direction_to(cell) else {
        return false;
    };
    let distance = hazard.cell.manhattan(cell);
    if distance > hazard.blast_radius.saturating_add(margin) {
        return false;
    }
    let distance = i32::try_from(distance).unwrap_or(i32::MAX);
    (1..distance).all(|step| !grid.classify(hazard.cell.offset(dir, step)).is_obstacle())
}
