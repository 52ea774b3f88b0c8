//! Training pipeline for the Q-learning agent

use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Result,
    castle::{GridEnvironment, Outcome},
    ports::{Learner, Observer, Transition},
    q_learning::QLearningAgent,
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Driver-side step limit per episode (the environment has its own cap)
    pub max_steps_per_episode: usize,

    /// Seed for the exploration RNG
    pub seed: Option<u64>,

    /// Stop as soon as an episode's total reward exceeds this
    pub solve_threshold: Option<f64>,

    /// Where to save the table whenever an episode sets a new best reward
    pub checkpoint: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 5000,
            max_steps_per_episode: 200,
            seed: None,
            solve_threshold: Some(5000.0),
            checkpoint: None,
        }
    }
}

/// Summary of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
    pub outcome: Outcome,
    pub kills: usize,
    pub epsilon: Option<f64>,
    pub table_size: Option<usize>,
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes actually played (fewer than configured after an early stop)
    pub episodes_run: usize,
    pub best_reward: f64,
    pub best_episode: Option<usize>,
    /// Episode that crossed the solve threshold
    pub solved_at: Option<usize>,
    pub escapes: usize,
    pub rewards: Vec<f64>,
    pub steps: Vec<usize>,
    pub final_epsilon: f64,
    pub table_size: usize,
}

impl TrainingResult {
    /// Mean total reward of the last `window` episodes
    pub fn recent_mean_reward(&self, window: usize) -> f64 {
        let start = self.rewards.len().saturating_sub(window);
        let recent = &self.rewards[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Play one episode, updating the learner after every step when `learn` is set.
pub(crate) fn play_episode(
    episode: usize,
    env: &mut GridEnvironment,
    learner: &mut dyn Learner,
    rng: &mut dyn RngCore,
    max_steps: usize,
    learn: bool,
    observers: &mut [Box<dyn Observer>],
) -> Result<EpisodeSummary> {
    let mut state = env.reset(None);
    let mut total_reward = 0.0;
    let mut steps = 0;
    let mut kills = 0;
    let mut outcome = Outcome::Running;

    while !outcome.is_terminal() && steps < max_steps {
        let action = learner.select_action(&state, rng)?;
        let step = env.step(action)?;
        steps += 1;
        total_reward += step.reward;
        kills += usize::from(step.info.killed.is_some());
        outcome = step.info.outcome;

        for observer in observers.iter_mut() {
            observer.on_step(episode, steps, step.reward, &step.info)?;
        }

        if learn {
            learner.update(&Transition {
                state: &state,
                action,
                reward: step.reward,
                next_state: &step.state,
                done: step.done,
            })?;
        }
        state = step.state;
    }

    if !outcome.is_terminal() {
        outcome = Outcome::OutOfSteps;
    }

    Ok(EpisodeSummary {
        episode,
        total_reward,
        steps,
        outcome,
        kills,
        epsilon: learner.exploration_rate(),
        table_size: learner.table_size(),
    })
}

/// Training pipeline for a single agent in a single environment
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `agent` in `env`.
    ///
    /// The table is checkpointed on every new best episode reward. A failed
    /// checkpoint is logged and training carries on; the previous file stays
    /// in place.
    pub fn run(
        &mut self,
        env: &mut GridEnvironment,
        agent: &mut QLearningAgent,
    ) -> Result<TrainingResult> {
        let mut rng = build_rng(self.config.seed);
        let mut rewards = Vec::with_capacity(self.config.episodes);
        let mut steps = Vec::with_capacity(self.config.episodes);
        let mut best_reward = f64::NEG_INFINITY;
        let mut best_episode = None;
        let mut solved_at = None;
        let mut escapes = 0;

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        for episode in 0..self.config.episodes {
            for observer in &mut self.observers {
                observer.on_episode_start(episode)?;
            }

            let summary = play_episode(
                episode,
                env,
                agent,
                &mut rng,
                self.config.max_steps_per_episode,
                true,
                &mut self.observers,
            )?;

            rewards.push(summary.total_reward);
            steps.push(summary.steps);
            escapes += usize::from(summary.outcome == Outcome::Escaped);

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }

            if summary.total_reward > best_reward {
                best_reward = summary.total_reward;
                best_episode = Some(episode);
                if let Some(path) = &self.config.checkpoint {
                    if let Err(err) = agent.save_table(path) {
                        warn!(path = %path.display(), error = %err, "checkpoint failed");
                    }
                }
                for observer in &mut self.observers {
                    observer.on_new_best(&summary)?;
                }
            }

            if let Some(threshold) = self.config.solve_threshold {
                if summary.total_reward > threshold {
                    info!(episode, reward = summary.total_reward, "environment solved");
                    solved_at = Some(episode);
                    break;
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult {
            episodes_run: rewards.len(),
            best_reward,
            best_episode,
            solved_at,
            escapes,
            rewards,
            steps,
            final_epsilon: agent.epsilon(),
            table_size: agent.q_table_size(),
        })
    }
}
