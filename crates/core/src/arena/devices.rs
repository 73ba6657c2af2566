//! Device placement, fuse countdown, detonation and blast resolution.

use super::*;

impl Arena {
    /// Arms a device at the agent's cell. Only capacity and occupancy are checked; a
    /// human may well trap themselves.
    pub fn place_device(&mut self, id: AgentId) -> Result<HazardId, ArenaError> {
        let fuse = self.config.device.fuse();
        let agent = self.living_agent_mut(id)?;
        if agent.remaining_devices == 0 {
            return Err(ArenaError::NoDevicesRemaining(id));
        }
        let (cell, blast_radius) = (agent.cell, agent.blast_radius);
        if self.live_device_at(cell).is_some() {
            return Err(ArenaError::CellOccupiedByDevice(cell));
        }
        if let Some(agent) = self.agents.get_mut(id) {
            agent.remaining_devices -= 1;
        }

        let hazard_id = HazardId(self.next_hazard_id);
        self.next_hazard_id += 1;
        self.hazards.push(HazardSource::armed(hazard_id, Some(id), cell, fuse, blast_radius));
        self.log.push(LogEvent::DevicePlaced { agent: id, hazard: hazard_id, cell });
        tracing::debug!(agent = ?id, hazard = hazard_id.0, ?cell, blast_radius, "device placed");
        self.force_bot_timers(true, true);
        Ok(hazard_id)
    }

    /// Counts fuses down and detonates every expired device, then every device caught in
    /// one of those blasts, all within this tick.
    pub(super) fn burn_fuses(&mut self, dt: Duration) {
        let mut queue = VecDeque::new();
        for (idx, hazard) in self.hazards.iter_mut().enumerate() {
            if !hazard.is_live() {
                continue;
            }
            hazard.remaining_fuse = hazard.remaining_fuse.saturating_sub(dt);
            if hazard.remaining_fuse.is_zero() {
                queue.push_back((idx, false));
            }
        }

        while let Some((idx, chained)) = queue.pop_front() {
            if !self.hazards[idx].is_live() {
                continue;
            }
            let struck = self.detonate(idx, chained);
            for (other, hazard) in self.hazards.iter().enumerate() {
                if hazard.is_live() && struck.contains(&hazard.cell) {
                    queue.push_back((other, true));
                }
            }
        }
    }

    pub(super) fn expire_blasts(&mut self, dt: Duration) {
        for hazard in self.hazards.iter_mut().filter(|hazard| hazard.detonated) {
            hazard.blast_remaining = hazard.blast_remaining.saturating_sub(dt);
        }
        self.hazards.retain(|hazard| !hazard.detonated || !hazard.blast_remaining.is_zero());
    }

    /// Eliminates every living agent standing in an active blast.
    pub(super) fn resolve_blast_hits(&mut self) -> Vec<AgentId> {
        let struck: Vec<(AgentId, Cell, HazardId)> = self
            .agents
            .iter()
            .filter(|agent| agent.is_alive())
            .filter_map(|agent| {
                self.hazards
                    .iter()
                    .find(|hazard| hazard.detonated && hazard.blast_cells.contains(&agent.cell))
                    .map(|hazard| (agent.id, agent.cell, hazard.id))
            })
            .collect();

        let mut eliminated = Vec::new();
        for (id, cell, hazard) in struck {
            let Some(from) = self.agents.eliminate(id) else {
                continue;
            };
            self.log.push(LogEvent::BehaviorChanged { agent: id, from, to: BehaviorState::Eliminated });
            self.log.push(LogEvent::AgentEliminated { agent: id, cell, hazard });
            tracing::info!(agent = ?id, ?cell, hazard = hazard.0, "agent eliminated");
            eliminated.push(id);
        }
        eliminated
    }

    fn detonate(&mut self, idx: usize, chained: bool) -> Vec<Cell> {
        let cells = blast_cells(&self.grid, &self.hazards[idx]);
        let window = self.config.device.blast_window();
        let hazard = &mut self.hazards[idx];
        hazard.detonated = true;
        hazard.remaining_fuse = Duration::ZERO;
        hazard.blast_remaining = window;
        hazard.blast_cells = cells.clone();
        let (hazard_id, origin, owner) = (hazard.id, hazard.cell, hazard.owner);

        self.log.push(LogEvent::DeviceDetonated { hazard: hazard_id, cell: origin, chained });
        tracing::debug!(hazard = hazard_id.0, cell = ?origin, chained, "device detonated");

        for cell in &cells {
            if self.grid.destroy_soft_obstacle(*cell) {
                self.log.push(LogEvent::SoftObstacleDestroyed { cell: *cell });
            }
        }
        if let Some(agent) = owner.and_then(|owner| self.agents.get_mut(owner)) {
            agent.remaining_devices = (agent.remaining_devices + 1).min(agent.device_capacity);
        }
        self.force_bot_timers(true, true);
        cells
    }
}
