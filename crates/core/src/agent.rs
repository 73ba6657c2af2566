//! Agents and their per-bot decision state.
//!
//! Field access is read-only outside the crate; the arena is the only writer so that
//! device accounting and state transitions stay in one place.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::{ArenaConfig, TargetPolicy};
use crate::grid::WorldPos;
use crate::scheduler::Timer;
use crate::types::{ActivityHint, AgentId, AgentKind, BehaviorState, Cell, HazardId};

#[derive(Clone, Debug)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) kind: AgentKind,
    pub(crate) cell: Cell,
    pub(crate) world_pos: WorldPos,
    pub(crate) path: VecDeque<Cell>,
    pub(crate) pursuit_target: Option<AgentId>,
    pub(crate) device_capacity: u32,
    pub(crate) remaining_devices: u32,
    pub(crate) blast_radius: u32,
    pub(crate) state: BehaviorState,
    pub(crate) flee_deadline: Option<Duration>,
    pub(crate) activity: ActivityHint,
    /// Time banked toward the next discrete step.
    pub(crate) step_progress: Duration,
    pub(crate) brain: Option<BotBrain>,
}

/// Schedulers and bookkeeping that only autonomous agents carry.
#[derive(Clone, Debug)]
pub(crate) struct BotBrain {
    pub(crate) threat_timer: Timer,
    pub(crate) repath_timer: Timer,
    pub(crate) target_timer: Option<Timer>,
    pub(crate) threat: Option<HazardId>,
    pub(crate) last_move: Duration,
    pub(crate) last_cell: Cell,
    pub(crate) deadline_reported: bool,
}

impl BotBrain {
    pub(crate) fn new(config: &ArenaConfig, cell: Cell, now: Duration) -> Self {
        let target_timer = match config.bot.target_policy {
            TargetPolicy::Nearest => None,
            // The first pick happens on demand; the first switch one interval later.
            TargetPolicy::RandomSwitch { interval_ms } => {
                Some(Timer::starting_at(Duration::from_millis(u64::from(interval_ms)), now))
            }
        };
        Self {
            threat_timer: Timer::new(config.bot.threat_poll_interval()),
            repath_timer: Timer::new(config.bot.repath_interval()),
            target_timer,
            threat: None,
            last_move: now,
            last_cell: cell,
            deadline_reported: false,
        }
    }
}

impl Agent {
    pub(crate) fn new(
        kind: AgentKind,
        cell: Cell,
        world_pos: WorldPos,
        capacity: u32,
        blast_radius: u32,
    ) -> Self {
        Self {
            id: AgentId::default(),
            kind,
            cell,
            world_pos,
            path: VecDeque::new(),
            pursuit_target: None,
            device_capacity: capacity,
            remaining_devices: capacity,
            blast_radius,
            state: BehaviorState::Pursuing,
            flee_deadline: None,
            activity: ActivityHint::Idle,
            step_progress: Duration::ZERO,
            brain: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn is_bot(&self) -> bool {
        self.kind == AgentKind::Bot
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn world_pos(&self) -> WorldPos {
        self.world_pos
    }

    pub fn path_queue(&self) -> &VecDeque<Cell> {
        &self.path
    }

    pub fn pursuit_target(&self) -> Option<AgentId> {
        self.pursuit_target
    }

    pub fn device_capacity(&self) -> u32 {
        self.device_capacity
    }

    pub fn remaining_devices(&self) -> u32 {
        self.remaining_devices
    }

    pub fn blast_radius(&self) -> u32 {
        self.blast_radius
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn flee_deadline(&self) -> Option<Duration> {
        self.flee_deadline
    }

    pub fn activity(&self) -> ActivityHint {
        self.activity
    }

    pub fn is_alive(&self) -> bool {
        self.state != BehaviorState::Eliminated
    }

    /// Replaces the queued route in one go.
    pub(crate) fn set_path(&mut self, path: impl IntoIterator<Item = Cell>) {
        self.path = path.into_iter().collect();
    }

    pub(crate) fn clear_path(&mut self) {
        self.set_path([]);
    }
}
