//! Simulation context. This module exists to own the grid, the agent roster and the live
//! hazard set as explicit objects, and to advance them on a fixed tick.
//! It does not own rendering, input or round bookkeeping; hosts drive those through the
//! public operations here.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::agent::{Agent, BotBrain};
use crate::config::{ArenaConfig, MotionMode, TargetPolicy};
use crate::error::{ArenaError, ConfigError};
use crate::flee::{FleeKind, escape_route, plan_flee};
use crate::grid::{Grid, WorldPos};
use crate::hazard::{HazardSource, blast_cells, enters_new_blast, is_cell_hazardous};
use crate::level::Level;
use crate::pathfinding::{OpenGroundCost, WeightedCost, find_path, path_cost, reachable_cells};
use crate::registry::AgentRegistry;
use crate::threat::find_most_urgent_threat;
use crate::types::*;

mod advance;
mod behavior;
mod devices;
mod hash;
mod motion;
mod objectives;
mod targeting;

#[cfg(test)]
mod tests;

pub struct Arena {
    config: ArenaConfig,
    grid: Grid,
    agents: AgentRegistry,
    /// Ordered by placement; ids only grow.
    hazards: Vec<HazardSource>,
    power_ups: BTreeMap<Cell, PowerUp>,
    now: Duration,
    tick: u64,
    next_hazard_id: u64,
    rng: ChaCha8Rng,
    log: Vec<LogEvent>,
}

impl Arena {
    pub fn new(config: ArenaConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = grid.with_transform(config.origin, config.cell_size);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            grid,
            agents: AgentRegistry::new(),
            hazards: Vec::new(),
            power_ups: BTreeMap::new(),
            now: Duration::ZERO,
            tick: 0,
            next_hazard_id: 0,
            rng,
            log: Vec::new(),
        })
    }

    /// Builds an arena from a parsed layout. Spawn points are left for the caller to fill.
    pub fn from_level(config: ArenaConfig, level: Level) -> Result<Self, ConfigError> {
        let mut arena = Self::new(config, level.grid)?;
        for (cell, power_up) in level.power_ups {
            arena.place_power_up(cell, power_up);
        }
        Ok(arena)
    }

    pub fn spawn_agent(&mut self, kind: AgentKind, cell: Cell) -> Result<AgentId, ArenaError> {
        if !self.grid.is_free(cell) || self.live_device_at(cell).is_some() {
            return Err(ArenaError::InvalidSpawn(cell));
        }
        let mut agent = Agent::new(
            kind,
            cell,
            self.grid.cell_center(cell),
            self.config.device.capacity,
            self.config.device.blast_radius,
        );
        if kind == AgentKind::Bot {
            agent.brain = Some(BotBrain::new(&self.config, cell, self.now));
        }
        let id = self.agents.add(agent);
        tracing::debug!(?id, ?kind, ?cell, "agent spawned");
        Ok(id)
    }

    pub fn remove_agent(&mut self, id: AgentId) -> Result<Agent, ArenaError> {
        self.agents.remove(id).ok_or(ArenaError::UnknownAgent(id))
    }

    /// Drops a power-up on free ground. Returns `false` for any other tile.
    pub fn place_power_up(&mut self, cell: Cell, power_up: PowerUp) -> bool {
        if !self.grid.is_free(cell) {
            return false;
        }
        self.power_ups.insert(cell, power_up);
        true
    }

    /// Replaces a human agent's queued route. The route is cut at its first entry that is
    /// not edge-adjacent to its predecessor; the motion layer validates the rest as each
    /// step is taken.
    pub fn queue_path(&mut self, id: AgentId, path: Vec<Cell>) -> Result<(), ArenaError> {
        let agent = self.living_agent_mut(id)?;
        let mut prev = agent.cell;
        let mut route = Vec::with_capacity(path.len());
        let mut rejected = None;
        for cell in path {
            if !prev.is_adjacent(cell) {
                rejected = Some(cell);
                break;
            }
            route.push(cell);
            prev = cell;
        }
        agent.set_path(route);
        if let Some(at) = rejected {
            self.log.push(LogEvent::PathDiscarded { agent: id, at });
            tracing::debug!(agent = ?id, ?at, "queued route cut at non-adjacent entry");
        }
        Ok(())
    }

    /// Position report from an external motion system. A queue whose front no longer
    /// borders the reported cell is dropped.
    pub fn sync_agent_position(&mut self, id: AgentId, world: WorldPos) -> Result<Cell, ArenaError> {
        let cell = self.grid.to_cell(world);
        let agent = self.living_agent_mut(id)?;
        agent.world_pos = world;
        if cell == agent.cell {
            return Ok(cell);
        }
        if agent.path.front() == Some(&cell) {
            agent.path.pop_front();
        }
        self.enter_cell(id, cell);

        let stale = self
            .agents
            .get(id)
            .and_then(|agent| agent.path.front().copied())
            .filter(|front| !front.is_adjacent(cell));
        if let Some(front) = stale {
            self.discard_path(id, front);
        }
        Ok(cell)
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn hazards(&self) -> &[HazardSource] {
        &self.hazards
    }

    pub fn power_ups(&self) -> &BTreeMap<Cell, PowerUp> {
        &self.power_ups
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn is_cell_hazardous(&self, cell: Cell) -> bool {
        is_cell_hazardous(&self.grid, cell, &self.hazards)
    }

    fn living_agent_mut(&mut self, id: AgentId) -> Result<&mut Agent, ArenaError> {
        let agent = self.agents.get_mut(id).ok_or(ArenaError::UnknownAgent(id))?;
        if !agent.is_alive() {
            return Err(ArenaError::AgentEliminated(id));
        }
        Ok(agent)
    }

    fn live_device_at(&self, cell: Cell) -> Option<&HazardSource> {
        self.hazards.iter().find(|hazard| hazard.is_live() && hazard.cell == cell)
    }

    fn set_state(&mut self, id: AgentId, to: BehaviorState) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        let from = agent.state;
        if from == to {
            return;
        }
        agent.state = to;
        tracing::debug!(agent = ?id, ?from, ?to, "behavior changed");
        self.log.push(LogEvent::BehaviorChanged { agent: id, from, to });
    }

    fn force_bot_timers(&mut self, threat: bool, repath: bool) {
        for id in self.agents.alive_ids() {
            if let Some(brain) = self.agents.get_mut(id).and_then(|agent| agent.brain.as_mut()) {
                if threat {
                    brain.threat_timer.force();
                }
                if repath {
                    brain.repath_timer.force();
                }
            }
        }
    }
}
