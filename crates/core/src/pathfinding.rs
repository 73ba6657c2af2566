//! Deterministic movement primitives and shortest-path helpers.
//! This module exists so navigation rules are shared by pursuit, flee and objective search.
//! It does not own which objective an agent chases or when it replans.
//!
//! Hazard avoidance follows one rule everywhere: a step never enters a blast that does not
//! already cover the cell it leaves. An agent inside a cross may walk along it on its way
//! out, but never into a second cross. A route that starts safe therefore stays safe, and
//! no route re-enters danger.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::grid::Grid;
use crate::hazard::{HazardSource, enters_new_blast};
use crate::types::{Cell, TileKind};

/// Per-cell price of stepping onto a cell. `None` marks the cell impassable.
pub trait StepCost {
    fn step_cost(&self, grid: &Grid, cell: Cell) -> Option<u32>;
}

/// Pursuit pricing: soft obstacles are passable at a penalty, since a device clears them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightedCost {
    pub soft_obstacle_cost: u32,
}

impl StepCost for WeightedCost {
    fn step_cost(&self, grid: &Grid, cell: Cell) -> Option<u32> {
        match grid.classify(cell) {
            TileKind::Free => Some(1),
            TileKind::SoftObstacle => Some(self.soft_obstacle_cost),
            TileKind::HardObstacle => None,
        }
    }
}

/// Only free ground is walkable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenGroundCost;

impl StepCost for OpenGroundCost {
    fn step_cost(&self, grid: &Grid, cell: Cell) -> Option<u32> {
        (grid.classify(cell) == TileKind::Free).then_some(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

/// A* from `start` to `goal`. The path excludes `start` and ends at `goal`; an empty path
/// means the agent is already there.
pub fn find_path(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    avoid_hazards: bool,
    hazards: &[HazardSource],
    cost: &impl StepCost,
) -> Option<Vec<Cell>> {
    if start == goal {
        return Some(vec![]);
    }
    let rules = StepRules::new(grid, start, hazards, avoid_hazards);
    if cost.step_cost(grid, goal).is_none() || rules.devices.contains(&goal) {
        return None;
    }

    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let mut closed = BTreeSet::new();
    let h = start.manhattan(goal);
    open_set.insert(OpenNode { f: h, h, y: start.y, x: start.x });
    g_score.insert(start, 0u32);

    while let Some(curr) = open_set.pop_first() {
        let cell = Cell { y: curr.y, x: curr.x };
        if cell == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }
        if !closed.insert(cell) {
            continue;
        }
        let cur_g = g_score.get(&cell).copied().unwrap_or(u32::MAX);
        for next in cell.neighbors() {
            if closed.contains(&next) {
                continue;
            }
            let Some(step) = rules.enter_cost(cell, next, cost) else {
                continue;
            };
            let tentative = cur_g.saturating_add(step);
            if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                came_from.insert(next, cell);
                g_score.insert(next, tentative);
                let h = next.manhattan(goal);
                open_set.insert(OpenNode { f: tentative + h, h, y: next.y, x: next.x });
            }
        }
    }
    None
}

/// Sum of step costs along an already planned path.
pub fn path_cost(grid: &Grid, path: &[Cell], cost: &impl StepCost) -> u32 {
    path.iter()
        .map(|cell| cost.step_cost(grid, *cell).map_or(u32::MAX, |step| step.max(1)))
        .fold(0u32, u32::saturating_add)
}

/// Breadth-first reachability over free ground, with step counts. `start` is always
/// present at distance zero.
pub fn reachable_cells(
    grid: &Grid,
    start: Cell,
    hazards: &[HazardSource],
    avoid_hazards: bool,
    max_steps: u32,
) -> BTreeMap<Cell, u32> {
    let rules = StepRules::new(grid, start, hazards, avoid_hazards);
    let mut distances = BTreeMap::new();
    let mut queue = VecDeque::new();
    distances.insert(start, 0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let dist = distances[&current];
        if dist >= max_steps {
            continue;
        }
        for next in current.neighbors() {
            if distances.contains_key(&next) || rules.enter_cost(current, next, &OpenGroundCost).is_none() {
                continue;
            }
            distances.insert(next, dist + 1);
            queue.push_back(next);
        }
    }
    distances
}

struct StepRules<'a> {
    grid: &'a Grid,
    hazards: &'a [HazardSource],
    avoid_hazards: bool,
    devices: BTreeSet<Cell>,
}

impl<'a> StepRules<'a> {
    fn new(grid: &'a Grid, start: Cell, hazards: &'a [HazardSource], avoid_hazards: bool) -> Self {
        let devices = hazards
            .iter()
            .filter(|hazard| hazard.is_live() && hazard.cell != start)
            .map(|hazard| hazard.cell)
            .collect();
        Self { grid, hazards, avoid_hazards, devices }
    }

    fn enter_cost(&self, from: Cell, to: Cell, cost: &impl StepCost) -> Option<u32> {
        if self.devices.contains(&to) {
            return None;
        }
        let step = cost.step_cost(self.grid, to)?.max(1);
        if self.avoid_hazards && enters_new_blast(self.grid, from, to, self.hazards) {
            return None;
        }
        Some(step)
    }
}

fn reconstruct_path(came_from: &BTreeMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut cell = goal;
    let mut result = vec![cell];
    while let Some(prev) = came_from.get(&cell).copied() {
        if prev == start {
            break;
        }
        result.push(prev);
        cell = prev;
    }
    result.reverse();
    result
}
