//! Per-tick simulation loop and stop-reason handling.

use super::*;

impl Arena {
    /// Runs up to `max_steps` ticks. Stops early after a tick in which any agent died so
    /// the host can settle the round.
    pub fn advance(&mut self, max_steps: u32) -> AdvanceResult {
        let mut steps = 0;
        while steps < max_steps {
            let eliminated = self.step_tick();
            steps += 1;
            if !eliminated.is_empty() {
                return AdvanceResult {
                    simulated_ticks: steps,
                    stop_reason: AdvanceStopReason::AgentsEliminated(eliminated),
                };
            }
        }
        AdvanceResult { simulated_ticks: steps, stop_reason: AdvanceStopReason::BudgetExhausted }
    }

    fn step_tick(&mut self) -> Vec<AgentId> {
        let dt = self.config.tick();
        self.now += dt;
        self.tick += 1;

        self.expire_blasts(dt);
        self.burn_fuses(dt);
        if self.config.motion == MotionMode::Discrete {
            self.step_motion(dt);
        }
        let eliminated = self.resolve_blast_hits();
        self.run_bots();
        eliminated
    }
}
