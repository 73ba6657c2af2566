//! Agent roster keyed by slotmap ids.

use slotmap::SlotMap;

use crate::agent::Agent;
use crate::types::{ActivityHint, AgentId, BehaviorState};

#[derive(Clone, Debug, Default)]
pub struct AgentRegistry {
    agents: SlotMap<AgentId, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, agent: Agent) -> AgentId {
        self.agents.insert_with_key(|id| Agent { id, ..agent })
    }

    /// Drops the agent and forgets it as anyone's pursuit target.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let removed = self.agents.remove(id)?;
        self.forget_target(id);
        Some(removed)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Every agent, eliminated ones included, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        let mut agents: Vec<&Agent> = self.agents.values().collect();
        agents.sort_by_key(|agent| agent.id);
        agents.into_iter()
    }

    pub fn alive_ids(&self) -> Vec<AgentId> {
        self.iter().filter(|agent| agent.is_alive()).map(Agent::id).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.values().filter(|agent| agent.is_alive()).count()
    }

    /// Living agents other than `id`, in ascending id order.
    pub fn opponents_of(&self, id: AgentId) -> Vec<AgentId> {
        self.iter().filter(|agent| agent.id != id && agent.is_alive()).map(Agent::id).collect()
    }

    /// Terminal transition. Returns the prior state, or `None` if the agent was unknown or
    /// already eliminated.
    pub(crate) fn eliminate(&mut self, id: AgentId) -> Option<BehaviorState> {
        let agent = self.agents.get_mut(id).filter(|agent| agent.is_alive())?;
        let previous = agent.state;
        agent.state = BehaviorState::Eliminated;
        agent.activity = ActivityHint::Dead;
        agent.flee_deadline = None;
        agent.pursuit_target = None;
        agent.clear_path();
        self.forget_target(id);
        Some(previous)
    }

    fn forget_target(&mut self, id: AgentId) {
        for agent in self.agents.values_mut() {
            if agent.pursuit_target == Some(id) {
                agent.pursuit_target = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WorldPos;
    use crate::types::{AgentKind, Cell};

    fn spawn(registry: &mut AgentRegistry, x: i32) -> AgentId {
        registry.add(Agent::new(AgentKind::Bot, Cell::new(x, 0), WorldPos::default(), 1, 2))
    }

    #[test]
    fn opponents_exclude_self_and_eliminated() {
        let mut registry = AgentRegistry::new();
        let a = spawn(&mut registry, 0);
        let b = spawn(&mut registry, 1);
        let c = spawn(&mut registry, 2);

        assert_eq!(registry.opponents_of(a), vec![b, c]);
        assert_eq!(registry.eliminate(b), Some(BehaviorState::Pursuing));
        assert_eq!(registry.opponents_of(a), vec![c]);
        assert_eq!(registry.eliminate(b), None);
        assert_eq!(registry.alive_count(), 2);
    }

    #[test]
    fn removing_or_eliminating_clears_pursuit_targets() {
        let mut registry = AgentRegistry::new();
        let a = spawn(&mut registry, 0);
        let b = spawn(&mut registry, 1);
        let c = spawn(&mut registry, 2);
        registry.get_mut(a).expect("a").pursuit_target = Some(b);
        registry.get_mut(c).expect("c").pursuit_target = Some(a);

        registry.eliminate(b);
        assert_eq!(registry.get(a).expect("a").pursuit_target(), None);

        registry.remove(a);
        assert_eq!(registry.get(c).expect("c").pursuit_target(), None);
        assert!(!registry.contains(a));
    }

    #[test]
    fn added_agents_know_their_id() {
        let mut registry = AgentRegistry::new();
        let a = spawn(&mut registry, 3);
        assert_eq!(registry.get(a).map(Agent::id), Some(a));
    }
}
