pub mod agent;
pub mod arena;
pub mod config;
pub mod error;
pub mod flee;
pub mod grid;
pub mod hazard;
pub mod level;
pub mod pathfinding;
pub mod registry;
pub mod scheduler;
pub mod threat;
pub mod types;

#[cfg(test)]
mod test_support;

pub use agent::Agent;
pub use arena::Arena;
pub use config::{ArenaConfig, BotConfig, DeviceConfig, MotionMode, TargetPolicy};
pub use error::{ArenaError, ConfigError, LevelError};
pub use flee::{FleeKind, FleePlan, FleeSettings, escape_exists, escape_route, plan_flee};
pub use grid::{Grid, WorldPos};
pub use hazard::{
    HazardSource, blast_cells, enters_new_blast, is_cell_hazardous, is_cell_in_blast_path,
};
pub use level::Level;
pub use pathfinding::{OpenGroundCost, StepCost, WeightedCost, find_path, reachable_cells};
pub use registry::AgentRegistry;
pub use scheduler::Timer;
pub use threat::find_most_urgent_threat;
pub use types::*;
