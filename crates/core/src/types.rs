use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct AgentId;
}

/// Identifier of a placed device. Assigned from a monotonically increasing counter, so
/// ordering by id is ordering by placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HazardId(pub u64);

/// Discrete grid coordinate. Row `y` grows downward; ordering is row-major `(y, x)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub y: i32,
    pub x: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    /// Saturates at the `i32` range, which lies far outside any grid.
    pub fn offset(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            y: self.y.saturating_add(dy.saturating_mul(distance)),
            x: self.x.saturating_add(dx.saturating_mul(distance)),
        }
    }

    /// Up, right, down, left.
    pub fn neighbors(self) -> [Cell; 4] {
        Direction::ALL.map(|dir| self.step(dir))
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// Direction of the axis-aligned ray from `self` that passes through `other`.
    pub fn axis_direction_to(self, other: Cell) -> Option<Direction> {
        match (other.x.cmp(&self.x), other.y.cmp(&self.y)) {
            (Ordering::Equal, Ordering::Less) => Some(Direction::Up),
            (Ordering::Equal, Ordering::Greater) => Some(Direction::Down),
            (Ordering::Greater, Ordering::Equal) => Some(Direction::Right),
            (Ordering::Less, Ordering::Equal) => Some(Direction::Left),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Free,
    SoftObstacle,
    HardObstacle,
}

impl TileKind {
    pub fn is_obstacle(self) -> bool {
        self != TileKind::Free
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    ExtraDevice,
    BlastRadius,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Human,
    Bot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    Pursuing,
    PlacingDevice,
    Fleeing,
    Eliminated,
}

/// Facing/activity hint for the animation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityHint {
    Idle,
    Moving(Direction),
    PlacingDevice,
    Fleeing,
    Dead,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    DevicePlaced { agent: AgentId, hazard: HazardId, cell: Cell },
    PlacementDeclined { agent: AgentId, cell: Cell },
    DeviceDetonated { hazard: HazardId, cell: Cell, chained: bool },
    SoftObstacleDestroyed { cell: Cell },
    PowerUpCollected { agent: AgentId, cell: Cell, power_up: PowerUp },
    AgentEliminated { agent: AgentId, cell: Cell, hazard: HazardId },
    BehaviorChanged { agent: AgentId, from: BehaviorState, to: BehaviorState },
    FleeStarted { agent: AgentId, target: Option<Cell>, emergency: bool, deadline: Duration },
    FleeDeadlineMissed { agent: AgentId },
    TargetChanged { agent: AgentId, target: Option<AgentId> },
    PathDiscarded { agent: AgentId, at: Cell },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    /// One or more agents were struck during the last simulated tick.
    AgentsEliminated(Vec<AgentId>),
    BudgetExhausted,
}

#[derive(Clone, Debug)]
pub struct AdvanceResult {
    pub simulated_ticks: u32,
    pub stop_reason: AdvanceStopReason,
}
