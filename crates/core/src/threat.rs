//! Threat monitor.

use crate::grid::Grid;
use crate::hazard::{HazardSource, is_cell_in_blast_path};
use crate::types::Cell;

/// The live device whose blast reaches `cell` soonest. Ties go to the earlier placement.
pub fn find_most_urgent_threat<'a>(
    grid: &Grid,
    cell: Cell,
    hazards: &'a [HazardSource],
) -> Option<&'a HazardSource> {
    hazards
        .iter()
        .filter(|hazard| hazard.is_live() && is_cell_in_blast_path(grid, cell, hazard))
        .min_by_key(|hazard| (hazard.remaining_fuse, hazard.id))
}
