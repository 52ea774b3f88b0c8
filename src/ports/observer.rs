//! Observer port - abstraction for training observation and data collection
//!
//! Observers receive training events without the training loop knowing what
//! they do with them: progress bars, periodic logs, CSV history, metrics.

use crate::{Result, castle::StepInfo, pipeline::EpisodeSummary};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - for each step
///    - `on_episode_end(summary)`
///    - `on_new_best(summary)` - when the episode beat every earlier one
/// 3. `on_training_end()` - once
///
/// Every method defaults to a no-op.
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every environment step, before the learner update.
    fn on_step(
        &mut self,
        _episode: usize,
        _step: usize,
        _reward: f64,
        _info: &StepInfo,
    ) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_new_best(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
