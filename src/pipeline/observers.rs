//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{fs::File, path::Path};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, castle::Outcome, pipeline::EpisodeSummary, ports::Observer};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    escapes: usize,
    best_reward: f64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            escapes: 0,
            best_reward: f64::NEG_INFINITY,
        }
    }

    fn message(&self) -> String {
        format!("escapes:{} best:{:.1}", self.escapes, self.best_reward)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.outcome == Outcome::Escaped {
            self.escapes += 1;
        }
        self.best_reward = self.best_reward.max(summary.total_reward);

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Log observer - Emits a structured `info` event every `every` episodes
pub struct LogObserver {
    every: usize,
    best_reward: f64,
}

impl LogObserver {
    /// Log every `every` episodes; zero is treated as one.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            best_reward: f64::NEG_INFINITY,
        }
    }
}

impl Observer for LogObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.best_reward = self.best_reward.max(summary.total_reward);
        if (summary.episode + 1).is_multiple_of(self.every) {
            info!(
                episode = summary.episode + 1,
                reward = summary.total_reward,
                steps = summary.steps,
                outcome = ?summary.outcome,
                epsilon = summary.epsilon.unwrap_or_default(),
                best = self.best_reward,
                "training progress"
            );
        }
        Ok(())
    }

    fn on_new_best(&mut self, summary: &EpisodeSummary) -> Result<()> {
        info!(
            episode = summary.episode + 1,
            reward = summary.total_reward,
            "new best episode"
        );
        Ok(())
    }
}

/// CSV observer - Writes one row per episode
pub struct CsvObserver {
    writer: csv::Writer<File>,
}

impl CsvObserver {
    /// Create a new CSV observer; the file is truncated.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }
}

impl Observer for CsvObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.writer.serialize(summary)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
pub struct MetricsObserver {
    escapes: usize,
    wrong_order: usize,
    out_of_steps: usize,
    total_episodes: usize,
    kills: usize,
    rewards: Vec<f64>,
    steps: Vec<usize>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            escapes: 0,
            wrong_order: 0,
            out_of_steps: 0,
            total_episodes: 0,
            kills: 0,
            rewards: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            count as f64 / self.total_episodes as f64
        }
    }

    /// Fraction of episodes that ended in an escape
    pub fn escape_rate(&self) -> f64 {
        self.rate(self.escapes)
    }

    /// Fraction of episodes lost to an out-of-order attack
    pub fn wrong_order_rate(&self) -> f64 {
        self.rate(self.wrong_order)
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    /// Per-episode total rewards, in order
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            escapes: self.escapes,
            wrong_order: self.wrong_order,
            out_of_steps: self.out_of_steps,
            kills: self.kills,
            escape_rate: self.escape_rate(),
            wrong_order_rate: self.wrong_order_rate(),
            avg_episode_length: self.avg_episode_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub escapes: usize,
    pub wrong_order: usize,
    pub out_of_steps: usize,
    pub kills: usize,
    pub escape_rate: f64,
    pub wrong_order_rate: f64,
    pub avg_episode_length: f64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.total_episodes += 1;
        self.kills += summary.kills;
        self.rewards.push(summary.total_reward);
        self.steps.push(summary.steps);
        match summary.outcome {
            Outcome::Escaped => self.escapes += 1,
            Outcome::WrongOrder => self.wrong_order += 1,
            Outcome::OutOfSteps | Outcome::Running => self.out_of_steps += 1,
        }
        Ok(())
    }
}

/// Milestone observer - Tracks key learning achievements
///
/// Records the first escape and the last out-of-order attack. Once the last
/// wrong-order episode precedes the first escape, the agent has learned the
/// defeat order.
#[derive(Debug, Default)]
pub struct MilestoneObserver {
    first_escape: Option<usize>,
    last_wrong_order: Option<usize>,
    episodes: usize,
}

impl MilestoneObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_escape(&self) -> Option<usize> {
        self.first_escape
    }

    pub fn last_wrong_order(&self) -> Option<usize> {
        self.last_wrong_order
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Order learned: escaped at least once and never attacked out of order since
    pub fn order_learned(&self) -> bool {
        match (self.first_escape, self.last_wrong_order) {
            (Some(escape), Some(wrong)) => wrong < escape,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn summary(&self) -> MilestoneSummary {
        MilestoneSummary {
            first_escape: self.first_escape,
            last_wrong_order: self.last_wrong_order,
            order_learned: self.order_learned(),
        }
    }
}

/// Learning milestones, with episodes counted from zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneSummary {
    pub first_escape: Option<usize>,
    pub last_wrong_order: Option<usize>,
    pub order_learned: bool,
}

impl Observer for MilestoneObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        match summary.outcome {
            Outcome::Escaped => {
                if self.first_escape.is_none() {
                    self.first_escape = Some(summary.episode);
                }
            }
            Outcome::WrongOrder => self.last_wrong_order = Some(summary.episode),
            _ => {}
        }
        Ok(())
    }
}
