use anyhow::Result;
use arena_core::{AdvanceStopReason, AgentId, AgentKind, Arena, ArenaConfig, BehaviorState, Cell};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tools::{generate_level, init_tracing};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 4000)]
    ticks: u32,
    /// Number of spawn corners handed to randomly driven humans
    #[arg(long, default_value_t = 1)]
    humans: usize,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn drive_human(arena: &mut Arena, id: AgentId, rng: &mut ChaCha8Rng) {
    let Some(agent) = arena.agent(id).filter(|agent| agent.is_alive()) else {
        return;
    };
    let here = agent.cell();
    if rng.next_u64() % 8 == 0 {
        // Declined placements are part of the input space.
        let _ = arena.place_device(id);
    }
    if arena.agent(id).is_some_and(|agent| agent.path_queue().is_empty()) {
        let step: Cell = choose(rng, &here.neighbors());
        let _ = arena.queue_path(id, vec![step]);
    }
}

fn check_invariants(arena: &Arena) {
    for agent in arena.agents().iter().filter(|agent| agent.is_alive()) {
        assert!(arena.grid().is_free(agent.cell()), "Invariant failed: agent inside obstacle");
        assert!(
            agent.remaining_devices() <= agent.device_capacity(),
            "Invariant failed: more devices than capacity"
        );
        assert_ne!(agent.state(), BehaviorState::PlacingDevice, "Invariant failed: stuck placing");
    }
    for hazard in arena.hazards().iter().filter(|hazard| hazard.is_live()) {
        assert!(arena.grid().is_free(hazard.cell), "Invariant failed: device inside obstacle");
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for max {} steps...", args.seed, args.ticks);
    let level = generate_level(args.seed, 13, 11)?;
    let spawns = level.spawns.clone();
    let mut arena = Arena::from_level(ArenaConfig { seed: args.seed, ..ArenaConfig::default() }, level)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut humans = Vec::new();
    for (idx, cell) in spawns.into_iter().enumerate() {
        let kind = if idx < args.humans { AgentKind::Human } else { AgentKind::Bot };
        let id = arena.spawn_agent(kind, cell)?;
        if kind == AgentKind::Human {
            humans.push(id);
        }
    }

    let mut total_steps = 0;
    while total_steps < args.ticks {
        for id in &humans {
            drive_human(&mut arena, *id, &mut rng);
        }
        let result = arena.advance(5);
        total_steps += result.simulated_ticks;

        if let AdvanceStopReason::AgentsEliminated(dead) = &result.stop_reason {
            println!("Tick {}: eliminated {:?}", arena.tick(), dead);
        }
        check_invariants(&arena);
        if arena.agents().alive_count() <= 1 {
            println!("Match decided after {} ticks", total_steps);
            break;
        }
    }

    println!("Fuzzing completed successfully. Snapshot Hash: {}", arena.snapshot_hash());
    Ok(())
}
