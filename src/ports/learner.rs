//! Learner port - abstraction over action-selecting agents
//!
//! The environment never talks to a learner directly. A driver asks the learner
//! for an action, feeds it to the environment and hands the resulting
//! [`Transition`] back to the learner, so either side can be swapped or tested
//! on its own.

use rand::RngCore;

use crate::{Result, castle::GridState, types::Action};

/// One observed environment transition.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    pub state: &'a GridState,
    pub action: Action,
    pub reward: f64,
    pub next_state: &'a GridState,
    pub done: bool,
}

/// Learner trait - unified interface for trainable and fixed policies
///
/// # Examples
///
/// ```no_run
/// use castle_warrior::{castle::GridEnvironment, ports::{Learner, Transition}};
/// use rand::RngCore;
///
/// fn run_episode(
///     env: &mut GridEnvironment,
///     learner: &mut dyn Learner,
///     rng: &mut dyn RngCore,
/// ) -> castle_warrior::Result<f64> {
///     let mut state = env.reset(None);
///     loop {
///         let action = learner.select_action(&state, rng)?;
///         let step = env.step(action)?;
///         learner.update(&Transition {
///             state: &state,
///             action,
///             reward: step.reward,
///             next_state: &step.state,
///             done: step.done,
///         })?;
///         state = step.state;
///         if step.done {
///             return Ok(env.total_reward());
///         }
///     }
/// }
/// ```
pub trait Learner: Send {
    /// Choose an action for `state`, drawing any randomness from `rng`.
    fn select_action(&mut self, state: &GridState, rng: &mut dyn RngCore) -> Result<Action>;

    /// Learn from a transition.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for fixed policies.
    fn update(&mut self, _transition: &Transition<'_>) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name.
    fn name(&self) -> &str;

    /// Current exploration rate, for learners that have one.
    fn exploration_rate(&self) -> Option<f64> {
        None
    }

    /// Number of learned entries, for learners that keep a table.
    fn table_size(&self) -> Option<usize> {
        None
    }
}
