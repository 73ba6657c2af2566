use super::*;
use crate::config::{BotConfig, DeviceConfig};
use crate::test_support::{arena_from, bot_config};

const OPEN_ROOM: &str = "
    #########
    #.......#
    #.......#
    #.......#
    #.......#
    #.......#
    #.......#
    #.......#
    #########
";

fn human_config() -> ArenaConfig {
    ArenaConfig { device: DeviceConfig { capacity: 2, ..Default::default() }, ..bot_config() }
}

fn detonations(arena: &Arena) -> Vec<(HazardId, bool)> {
    arena
        .log()
        .iter()
        .filter_map(|event| match event {
            LogEvent::DeviceDetonated { hazard, chained, .. } => Some((*hazard, *chained)),
            _ => None,
        })
        .collect()
}

#[test]
fn spawning_on_obstacle_is_rejected() {
    let mut arena = arena_from("###\n#%#\n###", bot_config());
    assert_eq!(
        arena.spawn_agent(AgentKind::Bot, Cell::new(1, 1)),
        Err(ArenaError::InvalidSpawn(Cell::new(1, 1)))
    );
}

#[test]
fn placement_checks_capacity_and_occupancy() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");

    let hazard = arena.place_device(human).expect("first device");
    assert_eq!(hazard, HazardId(0));
    assert_eq!(arena.agent(human).map(Agent::remaining_devices), Some(0));
    assert_eq!(arena.place_device(human), Err(ArenaError::NoDevicesRemaining(human)));

    let mut roomy = arena_from(OPEN_ROOM, human_config());
    let other = roomy.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    roomy.place_device(other).expect("first device");
    assert_eq!(roomy.place_device(other), Err(ArenaError::CellOccupiedByDevice(Cell::new(1, 1))));
}

#[test]
fn removed_agent_is_unknown() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.remove_agent(human).expect("remove");
    assert_eq!(arena.place_device(human), Err(ArenaError::UnknownAgent(human)));
}

#[test]
fn capacity_returns_exactly_at_detonation() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.place_device(human).expect("place");
    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(2, 2)]).expect("queue");

    let result = arena.advance(39);
    assert_eq!(result.stop_reason, AdvanceStopReason::BudgetExhausted);
    assert_eq!(arena.agent(human).map(Agent::remaining_devices), Some(0));
    assert!(detonations(&arena).is_empty());

    arena.advance(1);
    assert_eq!(arena.agent(human).map(Agent::remaining_devices), Some(1));
    assert_eq!(detonations(&arena), vec![(HazardId(0), false)]);
    assert_eq!(arena.agent(human).map(Agent::cell), Some(Cell::new(2, 2)));
}

#[test]
fn blast_window_expires_after_configured_duration() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.place_device(human).expect("place");
    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(2, 2)]).expect("queue");

    arena.advance(40);
    assert!(arena.is_cell_hazardous(Cell::new(1, 2)));
    arena.advance(19);
    assert_eq!(arena.hazards().len(), 1);
    arena.advance(1);
    assert!(arena.hazards().is_empty());
    assert!(!arena.is_cell_hazardous(Cell::new(1, 2)));
}

#[test]
fn chain_reaction_detonates_in_the_same_tick() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let first = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    let second = arena.spawn_agent(AgentKind::Human, Cell::new(3, 1)).expect("spawn");

    arena.place_device(first).expect("place");
    arena.queue_path(first, vec![Cell::new(2, 1), Cell::new(2, 2)]).expect("queue");
    arena.advance(10);
    arena.place_device(second).expect("place");
    arena.queue_path(second, vec![Cell::new(4, 1), Cell::new(4, 2)]).expect("queue");

    let result = arena.advance(30);
    assert_eq!(result.stop_reason, AdvanceStopReason::BudgetExhausted);
    assert_eq!(detonations(&arena), vec![(HazardId(0), false), (HazardId(1), true)]);
    assert!(arena.hazards().iter().all(|hazard| hazard.detonated));
    assert_eq!(arena.agent(second).map(Agent::remaining_devices), Some(1));
}

#[test]
fn blast_destroys_first_soft_obstacle_only() {
    let mut arena = arena_from(
        "
        ########
        #1.%%..#
        #......#
        ########
        ",
        bot_config(),
    );
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.place_device(human).expect("place");
    arena.queue_path(human, vec![Cell::new(1, 2), Cell::new(2, 2)]).expect("queue");

    arena.advance(40);
    assert_eq!(arena.grid().classify(Cell::new(3, 1)), TileKind::Free);
    assert_eq!(arena.grid().classify(Cell::new(4, 1)), TileKind::SoftObstacle);
    assert!(arena.log().contains(&LogEvent::SoftObstacleDestroyed { cell: Cell::new(3, 1) }));
}

#[test]
fn agent_in_blast_is_eliminated_and_pruned_from_targets() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(4, 4)).expect("spawn");
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(4, 3)).expect("spawn");
    arena.place_device(human).expect("place");

    let first = arena.advance(1);
    assert_eq!(first.stop_reason, AdvanceStopReason::BudgetExhausted);
    let fleeing = arena.agent(bot).expect("bot");
    assert_eq!(fleeing.state(), BehaviorState::Fleeing);
    assert_eq!(fleeing.flee_deadline(), Some(Duration::from_millis(50 + 1950 + 250)));

    let result = arena.advance(100);
    assert_eq!(result.stop_reason, AdvanceStopReason::AgentsEliminated(vec![human]));
    assert_eq!(result.simulated_ticks, 39);

    let bot_state = arena.agent(bot).expect("bot");
    assert!(bot_state.is_alive());
    assert!(!arena.is_cell_hazardous(bot_state.cell()));
    assert_eq!(bot_state.pursuit_target(), None);
    assert_eq!(arena.agent(human).map(Agent::activity), Some(ActivityHint::Dead));
    assert_eq!(arena.place_device(human), Err(ArenaError::AgentEliminated(human)));
}

#[test]
fn bot_bombs_soft_obstacle_and_escapes_its_own_blast() {
    let mut arena = arena_from(
        "
        #######
        #%....#
        #.....#
        #######
        ",
        bot_config(),
    );
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(2, 1)).expect("spawn");

    arena.advance(1);
    let agent = arena.agent(bot).expect("bot");
    assert_eq!(agent.state(), BehaviorState::Fleeing);
    assert_eq!(agent.activity(), ActivityHint::PlacingDevice);
    assert_eq!(agent.path_queue().iter().copied().collect::<Vec<_>>(), vec![Cell::new(2, 2), Cell::new(1, 2)]);
    assert!(arena.log().contains(&LogEvent::BehaviorChanged {
        agent: bot,
        from: BehaviorState::Pursuing,
        to: BehaviorState::PlacingDevice,
    }));

    let result = arena.advance(60);
    assert_eq!(result.stop_reason, AdvanceStopReason::BudgetExhausted);
    assert!(arena.agent(bot).is_some_and(Agent::is_alive));
    assert_eq!(arena.grid().classify(Cell::new(1, 1)), TileKind::Free);
    assert!(arena.log().iter().any(|event| matches!(
        event,
        LogEvent::FleeStarted { agent, emergency: false, target: Some(target), .. }
            if *agent == bot && *target == Cell::new(1, 2)
    )));
    assert!(arena.log().contains(&LogEvent::BehaviorChanged {
        agent: bot,
        from: BehaviorState::Fleeing,
        to: BehaviorState::Pursuing,
    }));
}

#[test]
fn bot_without_escape_never_places() {
    let mut arena = arena_from(
        "
        #####
        #.%.#
        #####
        ",
        bot_config(),
    );
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(1, 1)).expect("spawn");

    arena.advance(20);
    assert!(arena.hazards().is_empty());
    assert_eq!(arena.agent(bot).map(Agent::remaining_devices), Some(1));
    assert!(arena.log().contains(&LogEvent::PlacementDeclined { agent: bot, cell: Cell::new(1, 1) }));
    assert!(!arena.log().iter().any(|event| matches!(event, LogEvent::DevicePlaced { .. })));
}

#[test]
fn non_adjacent_route_is_cut_when_queued() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.queue_path(human, vec![Cell::new(3, 3), Cell::new(3, 4)]).expect("queue");

    assert!(arena.agent(human).is_some_and(|agent| agent.path_queue().is_empty()));
    assert!(arena.log().contains(&LogEvent::PathDiscarded { agent: human, at: Cell::new(3, 3) }));

    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(4, 1)]).expect("queue");
    let queued: Vec<Cell> = arena.agent(human).expect("human").path_queue().iter().copied().collect();
    assert_eq!(queued, vec![Cell::new(2, 1)]);
    assert!(arena.log().contains(&LogEvent::PathDiscarded { agent: human, at: Cell::new(4, 1) }));

    arena.advance(4);
    assert_eq!(arena.agent(human).map(Agent::cell), Some(Cell::new(2, 1)));
}

#[test]
fn step_onto_obstacle_is_discarded_by_motion() {
    let mut arena = arena_from(OPEN_ROOM, bot_config());
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.queue_path(human, vec![Cell::new(1, 0)]).expect("queue");
    assert_eq!(arena.agent(human).map(|agent| agent.path_queue().len()), Some(1));

    arena.advance(4);
    let agent = arena.agent(human).expect("human");
    assert_eq!(agent.cell(), Cell::new(1, 1));
    assert!(agent.path_queue().is_empty());
    assert!(arena.log().contains(&LogEvent::PathDiscarded { agent: human, at: Cell::new(1, 0) }));
}

#[test]
fn walking_over_power_ups_upgrades_the_agent() {
    let mut arena = arena_from(
        "
        ######
        #1+^.#
        ######
        ",
        bot_config(),
    );
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(3, 1)]).expect("queue");

    arena.advance(8);
    let agent = arena.agent(human).expect("human");
    assert_eq!(agent.device_capacity(), 2);
    assert_eq!(agent.remaining_devices(), 2);
    assert_eq!(agent.blast_radius(), 3);
    assert!(arena.power_ups().is_empty());
}

#[test]
fn external_motion_follows_synced_positions() {
    let config = ArenaConfig { motion: MotionMode::External, ..bot_config() };
    let mut arena = arena_from(OPEN_ROOM, config);
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(3, 1)]).expect("queue");

    arena.advance(10);
    assert_eq!(arena.agent(human).map(Agent::cell), Some(Cell::new(1, 1)));

    let cell = arena.sync_agent_position(human, WorldPos::new(2.4, 1.9)).expect("sync");
    assert_eq!(cell, Cell::new(2, 1));
    let agent = arena.agent(human).expect("human");
    assert_eq!(agent.path_queue().iter().copied().collect::<Vec<_>>(), vec![Cell::new(3, 1)]);
    assert_eq!(agent.world_pos(), WorldPos::new(2.4, 1.9));
}

#[test]
fn external_sync_off_route_drops_stale_queue() {
    let config = ArenaConfig { motion: MotionMode::External, ..bot_config() };
    let mut arena = arena_from(OPEN_ROOM, config);
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(1, 1)).expect("spawn");
    arena.queue_path(human, vec![Cell::new(2, 1), Cell::new(3, 1)]).expect("queue");

    let cell = arena.sync_agent_position(human, WorldPos::new(1.5, 3.5)).expect("sync");
    assert_eq!(cell, Cell::new(1, 3));
    assert!(arena.log().contains(&LogEvent::PathDiscarded { agent: human, at: Cell::new(2, 1) }));

    arena.advance(20);
    let agent = arena.agent(human).expect("human");
    assert_eq!(agent.cell(), Cell::new(1, 3));
    assert!(agent.path_queue().is_empty());
}

#[test]
fn bot_declines_placement_when_escape_crosses_another_blast() {
    let mut arena = arena_from(
        "
        ########
        #%.....#
        ###.####
        ###.####
        ########
        ",
        bot_config(),
    );
    let human = arena.spawn_agent(AgentKind::Human, Cell::new(3, 3)).expect("spawn");
    arena.place_device(human).expect("place");
    arena.advance(35);
    assert!(arena.agent(human).is_some_and(Agent::is_alive));

    // 250 ms of fuse left on the device whose cross covers the only way out.
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(2, 1)).expect("spawn");
    let placed_by_bot = |arena: &Arena| {
        arena.log().iter().any(|event| matches!(event, LogEvent::DevicePlaced { agent, .. } if *agent == bot))
    };
    while arena.tick() < 59 {
        arena.advance((59 - arena.tick()) as u32);
    }
    assert!(!placed_by_bot(&arena));
    assert!(arena.log().contains(&LogEvent::PlacementDeclined { agent: bot, cell: Cell::new(2, 1) }));
    assert!(arena.agent(human).is_some_and(|agent| !agent.is_alive()));

    while arena.tick() < 140 {
        arena.advance((140 - arena.tick()) as u32);
    }
    assert!(placed_by_bot(&arena));
    assert!(arena.agent(bot).is_some_and(Agent::is_alive));
}

#[test]
fn nearest_policy_prefers_cheaper_route() {
    let mut arena = arena_from(
        "
        #########
        #...#...#
        #...#...#
        #.......#
        #########
        ",
        bot_config(),
    );
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(3, 1)).expect("spawn");
    let far_by_route = arena.spawn_agent(AgentKind::Human, Cell::new(5, 1)).expect("spawn");
    let near_by_route = arena.spawn_agent(AgentKind::Human, Cell::new(1, 3)).expect("spawn");

    arena.refresh_target(bot);
    assert_eq!(arena.agent(bot).and_then(Agent::pursuit_target), Some(near_by_route));
    assert!(arena.log().contains(&LogEvent::TargetChanged { agent: bot, target: Some(near_by_route) }));
    assert_ne!(Some(far_by_route), arena.agent(bot).and_then(Agent::pursuit_target));
}

#[test]
fn target_search_radius_hides_distant_opponents() {
    let config = ArenaConfig {
        bot: BotConfig { target_search_radius: Some(4), ..Default::default() },
        ..bot_config()
    };
    let mut arena = arena_from(OPEN_ROOM, config);
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(1, 1)).expect("spawn");
    let far = arena.spawn_agent(AgentKind::Human, Cell::new(7, 7)).expect("spawn");

    arena.refresh_target(bot);
    assert_eq!(arena.agent(bot).and_then(Agent::pursuit_target), None);

    let near = arena.spawn_agent(AgentKind::Human, Cell::new(3, 3)).expect("spawn");
    arena.refresh_target(bot);
    assert_eq!(arena.agent(bot).and_then(Agent::pursuit_target), Some(near));
    assert_ne!(Some(far), arena.agent(bot).and_then(Agent::pursuit_target));
}

#[test]
fn random_switch_policy_targets_some_opponent() {
    let config = ArenaConfig {
        bot: BotConfig {
            target_policy: TargetPolicy::RandomSwitch { interval_ms: 1000 },
            ..Default::default()
        },
        ..bot_config()
    };
    let mut arena = arena_from(OPEN_ROOM, config);
    let bot = arena.spawn_agent(AgentKind::Bot, Cell::new(1, 1)).expect("spawn");
    let a = arena.spawn_agent(AgentKind::Human, Cell::new(7, 7)).expect("spawn");
    let b = arena.spawn_agent(AgentKind::Human, Cell::new(7, 1)).expect("spawn");

    arena.refresh_target(bot);
    let target = arena.agent(bot).and_then(Agent::pursuit_target).expect("target");
    assert!(target == a || target == b);

    // No switch before the first interval has elapsed.
    for _ in 0..5 {
        arena.refresh_target(bot);
        assert_eq!(arena.agent(bot).and_then(Agent::pursuit_target), Some(target));
    }
}

#[test]
fn same_seed_gives_same_snapshot() {
    let run = || {
        let mut arena = arena_from(
            "
            #########
            #1.%.%..#
            #.#.#.#.#
            #%..%..2#
            #########
            ",
            bot_config(),
        );
        arena.spawn_agent(AgentKind::Bot, Cell::new(1, 1)).expect("spawn");
        arena.spawn_agent(AgentKind::Bot, Cell::new(7, 3)).expect("spawn");
        arena.advance(200);
        arena.snapshot_hash()
    };
    assert_eq!(run(), run());
}
