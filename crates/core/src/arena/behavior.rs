//! Bot state machine: threat polling, flee lifecycle, placement decisions and pursuit.
//!
//! Each bot runs once per tick but only acts when one of its timers is due. A threat poll
//! always precedes movement decisions, so a bot never plans pursuit on a stale view of
//! the hazard set.

use super::*;

impl Arena {
    pub(super) fn run_bots(&mut self) {
        for id in self.agents.alive_ids() {
            self.run_bot(id);
        }
    }

    fn run_bot(&mut self, id: AgentId) {
        let now = self.now;
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        let cell = agent.cell;
        let Some(brain) = agent.brain.as_mut() else {
            return;
        };
        if brain.last_cell != cell {
            brain.last_cell = cell;
            brain.last_move = now;
        }
        let threat_due = brain.threat_timer.poll(now);

        if threat_due {
            self.poll_threat(id);
        }
        match self.agents.get(id).map(Agent::state) {
            Some(BehaviorState::Fleeing) => self.check_flee_deadline(id),
            Some(BehaviorState::Pursuing) => {
                let repath_due = self
                    .agents
                    .get_mut(id)
                    .and_then(|agent| agent.brain.as_mut())
                    .is_some_and(|brain| brain.repath_timer.poll(now));
                if repath_due {
                    self.pursue(id);
                }
            }
            _ => {}
        }
    }

    fn poll_threat(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get(id) else {
            return;
        };
        let (cell, state, path_empty) = (agent.cell, agent.state, agent.path.is_empty());
        let known = agent.brain.as_ref().and_then(|brain| brain.threat);
        let threat = find_most_urgent_threat(&self.grid, cell, &self.hazards)
            .map(|hazard| (hazard.id, hazard.remaining_fuse));

        match state {
            BehaviorState::Pursuing => {
                if let Some(threat) = threat {
                    self.start_flee(id, threat);
                }
            }
            BehaviorState::Fleeing => {
                if !self.is_cell_hazardous(cell) {
                    self.finish_flee(id);
                } else if let Some(threat) = threat
                    && (path_empty || known != Some(threat.0))
                {
                    self.start_flee(id, threat);
                }
            }
            BehaviorState::PlacingDevice | BehaviorState::Eliminated => {}
        }
    }

    /// Plans a route off every hazardous cell and arms the flee deadline against the most
    /// urgent fuse.
    fn start_flee(&mut self, id: AgentId, (hazard, fuse): (HazardId, Duration)) {
        let Some(cell) = self.agents.get(id).map(Agent::cell) else {
            return;
        };
        let settings = self.config.bot.flee_settings();
        let plan = plan_flee(&self.grid, cell, &self.hazards, &settings);
        let deadline = self.now + fuse + self.config.bot.flee_safety_margin();
        let emergency = plan.kind == FleeKind::Emergency;
        if emergency {
            tracing::warn!(agent = ?id, ?cell, step = ?plan.target, "no safe cell reachable, taking emergency step");
        } else {
            tracing::debug!(agent = ?id, ?cell, target = ?plan.target, "fleeing");
        }

        self.set_state(id, BehaviorState::Fleeing);
        if let Some(agent) = self.agents.get_mut(id) {
            agent.set_path(plan.path);
            agent.flee_deadline = Some(deadline);
            agent.activity = ActivityHint::Fleeing;
            if let Some(brain) = agent.brain.as_mut() {
                brain.threat = Some(hazard);
                brain.deadline_reported = false;
            }
        }
        self.log.push(LogEvent::FleeStarted { agent: id, target: plan.target, emergency, deadline });
    }

    fn finish_flee(&mut self, id: AgentId) {
        self.set_state(id, BehaviorState::Pursuing);
        if let Some(agent) = self.agents.get_mut(id) {
            agent.flee_deadline = None;
            agent.activity = ActivityHint::Idle;
            agent.clear_path();
            if let Some(brain) = agent.brain.as_mut() {
                brain.threat = None;
                brain.repath_timer.force();
                brain.threat_timer.force();
            }
        }
        tracing::debug!(agent = ?id, "flee complete");
    }

    fn check_flee_deadline(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get(id) else {
            return;
        };
        let Some(deadline) = agent.flee_deadline else {
            return;
        };
        let cell = agent.cell;
        let reported = agent.brain.as_ref().is_none_or(|brain| brain.deadline_reported);
        if reported || self.now <= deadline || !self.is_cell_hazardous(cell) {
            return;
        }
        if let Some(brain) = self.agents.get_mut(id).and_then(|agent| agent.brain.as_mut()) {
            brain.deadline_reported = true;
        }
        self.log.push(LogEvent::FleeDeadlineMissed { agent: id });
        tracing::warn!(agent = ?id, ?cell, "flee deadline passed while still endangered");
    }

    fn pursue(&mut self, id: AgentId) {
        if self.clear_if_stuck(id) {
            self.explore(id);
            return;
        }
        self.refresh_target(id);
        if self.should_place(id) && self.try_place_device(id) {
            return;
        }
        match self.choose_objective(id) {
            Some(path) if !path.is_empty() => {
                if let Some(agent) = self.agents.get_mut(id) {
                    agent.set_path(path);
                }
            }
            _ => self.explore(id),
        }
    }

    /// A bot that held a route without changing cell for too long drops it.
    fn clear_if_stuck(&mut self, id: AgentId) -> bool {
        let now = self.now;
        let timeout = self.config.bot.stuck_timeout();
        let Some(agent) = self.agents.get_mut(id) else {
            return false;
        };
        let has_path = !agent.path.is_empty();
        let Some(brain) = agent.brain.as_mut() else {
            return false;
        };
        if !has_path || now.saturating_sub(brain.last_move) < timeout {
            return false;
        }
        brain.last_move = now;
        agent.clear_path();
        tracing::debug!(agent = ?id, cell = ?agent.cell, "stuck, dropping route");
        true
    }

    fn should_place(&self, id: AgentId) -> bool {
        let Some(agent) = self.agents.get(id) else {
            return false;
        };
        if agent.remaining_devices == 0 || self.live_device_at(agent.cell).is_some() {
            return false;
        }
        let reach = self.config.bot.strike_distance;
        let target_in_reach = agent
            .pursuit_target
            .and_then(|target| self.agents.get(target))
            .is_some_and(|target| target.is_alive() && agent.cell.manhattan(target.cell) <= reach);
        target_in_reach || self.soft_obstacle_within(agent.cell, reach)
    }

    fn soft_obstacle_within(&self, cell: Cell, reach: u32) -> bool {
        let reach = reach as i32;
        (-reach..=reach).any(|dy| {
            let span = reach - dy.abs();
            (-span..=span).any(|dx| {
                self.grid.classify(Cell::new(cell.x + dx, cell.y + dy)) == TileKind::SoftObstacle
            })
        })
    }

    /// Places only from a cell outside every blast, and only when a flee route off the new
    /// device exists and can be walked before the fuse runs out. Routes never enter another
    /// device's cross, so the own fuse is the only deadline that matters.
    fn try_place_device(&mut self, id: AgentId) -> bool {
        let Some(agent) = self.agents.get(id) else {
            return false;
        };
        let cell = agent.cell;
        let endangered = is_cell_hazardous(&self.grid, cell, &self.hazards);
        let fuse = self.config.device.fuse();
        let mut hypothetical = self.hazards.clone();
        hypothetical.push(HazardSource::armed(
            HazardId(self.next_hazard_id),
            Some(id),
            cell,
            fuse,
            agent.blast_radius,
        ));
        let settings = self.config.bot.flee_settings();
        let walk_time = |steps: usize| self.config.step_interval() * steps as u32;
        let escapable = !endangered
            && escape_route(&self.grid, cell, &hypothetical, &settings)
                .is_some_and(|route| walk_time(route.len()) < fuse);
        if !escapable {
            self.log.push(LogEvent::PlacementDeclined { agent: id, cell });
            tracing::debug!(agent = ?id, ?cell, "placement declined, no escape");
            return false;
        }

        self.set_state(id, BehaviorState::PlacingDevice);
        let hazard = match self.place_device(id) {
            Ok(hazard) => hazard,
            Err(err) => {
                tracing::warn!(agent = ?id, %err, "placement failed");
                self.set_state(id, BehaviorState::Pursuing);
                return false;
            }
        };
        self.start_flee(id, (hazard, fuse));
        if let Some(agent) = self.agents.get_mut(id) {
            agent.activity = ActivityHint::PlacingDevice;
        }
        true
    }

    /// One random step onto a free, safe neighbour, or stand still.
    pub(super) fn explore(&mut self, id: AgentId) {
        let Some(cell) = self.agents.get(id).map(Agent::cell) else {
            return;
        };
        let safe_here = !self.is_cell_hazardous(cell);
        let options: Vec<Cell> = cell
            .neighbors()
            .into_iter()
            .filter(|next| self.grid.is_free(*next) && self.live_device_at(*next).is_none())
            .filter(|next| !(safe_here && self.is_cell_hazardous(*next)))
            .collect();
        let step = if options.is_empty() {
            None
        } else {
            Some(options[self.rng.next_u64() as usize % options.len()])
        };
        if let Some(agent) = self.agents.get_mut(id) {
            agent.set_path(step);
        }
    }
}
