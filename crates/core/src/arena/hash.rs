//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Arena {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.config.seed);
        hasher.write_u64(self.tick);
        hasher.write_u128(self.now.as_nanos());
        hasher.write_u64(self.next_hazard_id);

        for cell in self.grid.cells() {
            hasher.write_u8(self.grid.classify(cell) as u8);
        }
        for agent in self.agents.iter() {
            hasher.write_u64(agent.id.data().as_ffi());
            write_cell(&mut hasher, agent.cell);
            hasher.write_u8(agent.state as u8);
            hasher.write_u32(agent.remaining_devices);
            hasher.write_u32(agent.device_capacity);
            hasher.write_u32(agent.blast_radius);
            hasher.write_u64(agent.pursuit_target.map_or(0, |target| target.data().as_ffi()));
            hasher.write_usize(agent.path.len());
            for cell in &agent.path {
                write_cell(&mut hasher, *cell);
            }
        }
        for hazard in &self.hazards {
            hasher.write_u64(hazard.id.0);
            write_cell(&mut hasher, hazard.cell);
            hasher.write_u128(hazard.remaining_fuse.as_nanos());
            hasher.write_u128(hazard.blast_remaining.as_nanos());
            hasher.write_u8(u8::from(hazard.detonated));
        }
        for (cell, power_up) in &self.power_ups {
            write_cell(&mut hasher, *cell);
            hasher.write_u8(*power_up as u8);
        }
        hasher.write_usize(self.log.len());
        hasher.finish()
    }
}

fn write_cell(hasher: &mut Xxh3, cell: Cell) {
    hasher.write_i32(cell.x);
    hasher.write_i32(cell.y);
}
