//! Pursuit target selection.

use super::*;

/// Added to the Manhattan distance of opponents with no route at all, so any reachable
/// opponent ranks first.
const UNREACHABLE_PENALTY: u32 = 10_000;

impl Arena {
    pub(super) fn refresh_target(&mut self, id: AgentId) {
        let now = self.now;
        let Some(from) = self.agents.get(id).map(Agent::cell) else {
            return;
        };
        let radius = self.config.bot.target_search_radius;
        let candidates: Vec<AgentId> = self
            .agents
            .opponents_of(id)
            .into_iter()
            .filter(|other| {
                radius.is_none_or(|radius| {
                    self.agents.get(*other).is_some_and(|other| from.manhattan(other.cell) <= radius)
                })
            })
            .collect();
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        let current = agent.pursuit_target.filter(|target| candidates.contains(target));
        let switch_due = agent
            .brain
            .as_mut()
            .and_then(|brain| brain.target_timer.as_mut())
            .is_some_and(|timer| timer.poll(now));

        let next = match self.config.bot.target_policy {
            TargetPolicy::Nearest => self.nearest_opponent(id, &candidates),
            TargetPolicy::RandomSwitch { .. } if switch_due || current.is_none() => {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates[self.rng.next_u64() as usize % candidates.len()])
                }
            }
            TargetPolicy::RandomSwitch { .. } => current,
        };

        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        if agent.pursuit_target != next {
            agent.pursuit_target = next;
            self.log.push(LogEvent::TargetChanged { agent: id, target: next });
            tracing::debug!(agent = ?id, target = ?next, "pursuit target changed");
        }
    }

    /// Cheapest weighted route wins; ties go to the lower id.
    fn nearest_opponent(&self, id: AgentId, candidates: &[AgentId]) -> Option<AgentId> {
        let from = self.agents.get(id)?.cell;
        let cost = WeightedCost { soft_obstacle_cost: self.config.bot.soft_obstacle_cost };
        candidates
            .iter()
            .filter_map(|candidate| self.agents.get(*candidate).map(|agent| (*candidate, agent.cell)))
            .map(|(candidate, cell)| {
                let score = find_path(&self.grid, from, cell, false, &self.hazards, &cost)
                    .map(|path| path_cost(&self.grid, &path, &cost))
                    .unwrap_or_else(|| UNREACHABLE_PENALTY + from.manhattan(cell));
                (score, candidate)
            })
            .min()
            .map(|(_, candidate)| candidate)
    }
}
