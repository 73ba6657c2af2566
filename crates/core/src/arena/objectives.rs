//! Objective search for pursuing bots, in priority order: a nearby power-up, the pursuit
//! target, then the nearest soft obstacle. Every route avoids hazards.

use super::*;

impl Arena {
    pub(super) fn choose_objective(&self, id: AgentId) -> Option<Vec<Cell>> {
        let agent = self.agents.get(id)?;
        let start = agent.cell;
        self.route_to_power_up(start)
            .or_else(|| self.route_to_target(start, agent.pursuit_target))
            .or_else(|| self.route_to_soft_obstacle(start))
    }

    fn route_to_power_up(&self, start: Cell) -> Option<Vec<Cell>> {
        let reach =
            reachable_cells(&self.grid, start, &self.hazards, true, self.config.bot.item_search_radius);
        let (_, goal) = self
            .power_ups
            .keys()
            .filter(|cell| **cell != start)
            .filter_map(|cell| reach.get(cell).map(|dist| (*dist, *cell)))
            .min()?;
        find_path(&self.grid, start, goal, true, &self.hazards, &OpenGroundCost)
    }

    /// Route toward the target, cut short before the first soft obstacle on the way.
    fn route_to_target(&self, start: Cell, target: Option<AgentId>) -> Option<Vec<Cell>> {
        let goal = self.agents.get(target?).filter(|agent| agent.is_alive())?.cell;
        let cost = WeightedCost { soft_obstacle_cost: self.config.bot.soft_obstacle_cost };
        let path = find_path(&self.grid, start, goal, true, &self.hazards, &cost)?;
        let open: Vec<Cell> =
            path.into_iter().take_while(|cell| self.grid.is_free(*cell)).collect();
        (!open.is_empty()).then_some(open)
    }

    /// Route to the closest free cell beside a soft obstacle, other than the current one.
    fn route_to_soft_obstacle(&self, start: Cell) -> Option<Vec<Cell>> {
        let reach = reachable_cells(&self.grid, start, &self.hazards, true, u32::MAX);
        let (_, goal) = reach
            .iter()
            .filter(|(cell, _)| **cell != start)
            .filter(|(cell, _)| {
                cell.neighbors().iter().any(|next| self.grid.classify(*next) == TileKind::SoftObstacle)
            })
            .map(|(cell, dist)| (*dist, *cell))
            .min()?;
        find_path(&self.grid, start, goal, true, &self.hazards, &OpenGroundCost)
    }
}
