//! Discrete stand-in for the external motion system: one cell per `step_interval`.

use super::*;

impl Arena {
    pub(super) fn step_motion(&mut self, dt: Duration) {
        let interval = self.config.step_interval();
        for id in self.agents.alive_ids() {
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            let Some(next) = agent.path.front().copied() else {
                agent.step_progress = Duration::ZERO;
                if matches!(agent.activity, ActivityHint::Moving(_)) {
                    agent.activity = ActivityHint::Idle;
                }
                continue;
            };
            agent.step_progress += dt;
            if agent.step_progress < interval {
                continue;
            }
            agent.step_progress -= interval;

            let from = agent.cell;
            if !self.can_step(id, from, next) {
                self.discard_path(id, next);
                continue;
            }

            let center = self.grid.cell_center(next);
            if let Some(agent) = self.agents.get_mut(id) {
                agent.path.pop_front();
                agent.world_pos = center;
                agent.activity = match agent.state {
                    BehaviorState::Fleeing => ActivityHint::Fleeing,
                    _ => from.axis_direction_to(next).map_or(ActivityHint::Idle, ActivityHint::Moving),
                };
            }
            self.enter_cell(id, next);
        }
    }

    /// Moves the agent's logical cell, collects any power-up there, and schedules a threat
    /// poll once a flee route runs out.
    pub(super) fn enter_cell(&mut self, id: AgentId, cell: Cell) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        agent.cell = cell;
        if agent.state == BehaviorState::Fleeing
            && agent.path.is_empty()
            && let Some(brain) = agent.brain.as_mut()
        {
            brain.threat_timer.force();
        }

        let Some(power_up) = self.power_ups.remove(&cell) else {
            return;
        };
        if let Some(agent) = self.agents.get_mut(id) {
            match power_up {
                PowerUp::ExtraDevice => {
                    agent.device_capacity += 1;
                    agent.remaining_devices += 1;
                }
                PowerUp::BlastRadius => agent.blast_radius += 1,
            }
        }
        self.log.push(LogEvent::PowerUpCollected { agent: id, cell, power_up });
        tracing::debug!(agent = ?id, ?cell, ?power_up, "power-up collected");
    }

    /// A queued step must be edge-adjacent, on free ground and clear of live devices. A bot
    /// additionally never steps into a blast cross that appeared after it planned.
    fn can_step(&self, id: AgentId, from: Cell, next: Cell) -> bool {
        if !from.is_adjacent(next) || !self.grid.is_free(next) || self.live_device_at(next).is_some()
        {
            return false;
        }
        let is_bot = self.agents.get(id).is_some_and(Agent::is_bot);
        !(is_bot && enters_new_blast(&self.grid, from, next, &self.hazards))
    }

    pub(super) fn discard_path(&mut self, id: AgentId, at: Cell) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        agent.clear_path();
        agent.step_progress = Duration::ZERO;
        if let Some(brain) = agent.brain.as_mut() {
            brain.repath_timer.force();
            brain.threat_timer.force();
        }
        self.log.push(LogEvent::PathDiscarded { agent: id, at });
        tracing::debug!(agent = ?id, ?at, "queued step discarded");
    }
}
