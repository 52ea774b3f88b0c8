//! Reward shaping constants

use serde::{Deserialize, Serialize};

/// Reward schedule applied by the environment.
///
/// Kill and wrong-order rewards replace the step cost instead of adding to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Charged on every step
    pub step_cost: f64,
    /// Added when a move is rejected by a wall or a live adversary
    pub blocked_penalty: f64,
    /// Added when a move brings the player closer to the next adversary
    pub approach_bonus: f64,
    /// Added when a move brings the player closer to the revealed goal
    pub goal_approach_bonus: f64,
    /// Kill reward is `rank × kill_multiplier`
    pub kill_multiplier: f64,
    /// Added on top of the last kill
    pub clear_bonus: f64,
    /// Reward for attacking out of order (terminal)
    pub wrong_order_penalty: f64,
    /// Added when the player stands on the revealed goal (terminal)
    pub escape_bonus: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_cost: -0.5,
            blocked_penalty: -1.0,
            approach_bonus: 5.0,
            goal_approach_bonus: 5.0,
            kill_multiplier: 20.0,
            clear_bonus: 500.0,
            wrong_order_penalty: -200.0,
            escape_bonus: 5000.0,
        }
    }
}

impl RewardConfig {
    /// Reward for defeating an adversary of the given rank.
    pub fn kill_reward(&self, rank: u32) -> f64 {
        f64::from(rank) * self.kill_multiplier
    }
}
