//! Evaluation of fixed policies

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::training::{EpisodeSummary, play_episode};
use crate::{
    Result,
    castle::{GridEnvironment, Outcome},
    ports::{Learner, Observer},
    render::TextRenderer,
};

/// Evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub episodes: usize,
    pub max_steps_per_episode: usize,
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            max_steps_per_episode: 200,
            seed: None,
        }
    }
}

/// Aggregate outcome of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub learner: String,
    pub episodes: usize,
    pub escapes: usize,
    pub wrong_order: usize,
    pub out_of_steps: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
    pub success_rate: f64,
    pub summaries: Vec<EpisodeSummary>,
}

impl EvaluationResult {
    fn from_summaries(learner: &str, summaries: Vec<EpisodeSummary>) -> Self {
        let episodes = summaries.len();
        let count = |outcome: Outcome| summaries.iter().filter(|s| s.outcome == outcome).count();
        let mean = |total: f64| {
            if episodes == 0 {
                0.0
            } else {
                total / episodes as f64
            }
        };

        let escapes = count(Outcome::Escaped);
        Self {
            learner: learner.to_string(),
            episodes,
            escapes,
            wrong_order: count(Outcome::WrongOrder),
            out_of_steps: count(Outcome::OutOfSteps),
            mean_reward: mean(summaries.iter().map(|s| s.total_reward).sum()),
            mean_steps: mean(summaries.iter().map(|s| s.steps as f64).sum()),
            success_rate: mean(escapes as f64),
            summaries,
        }
    }
}

/// Run `learner` for the configured number of episodes without learning.
pub fn evaluate(
    env: &mut GridEnvironment,
    learner: &mut dyn Learner,
    config: &EvaluationConfig,
    observers: &mut [Box<dyn Observer>],
) -> Result<EvaluationResult> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    for observer in observers.iter_mut() {
        observer.on_training_start(config.episodes)?;
    }

    let mut summaries = Vec::with_capacity(config.episodes);
    for episode in 0..config.episodes {
        for observer in observers.iter_mut() {
            observer.on_episode_start(episode)?;
        }
        let summary = play_episode(
            episode,
            env,
            learner,
            &mut rng,
            config.max_steps_per_episode,
            false,
            observers,
        )?;
        for observer in observers.iter_mut() {
            observer.on_episode_end(&summary)?;
        }
        summaries.push(summary);
    }

    for observer in observers.iter_mut() {
        observer.on_training_end()?;
    }

    Ok(EvaluationResult::from_summaries(learner.name(), summaries))
}

/// Play one episode without learning, presenting every frame.
///
/// Returns the total reward and the final outcome.
pub fn watch_episode(
    env: &mut GridEnvironment,
    learner: &mut dyn Learner,
    rng: &mut dyn RngCore,
    max_steps: usize,
    renderer: &TextRenderer,
) -> Result<(f64, Outcome)> {
    let mut state = env.reset(None);
    renderer.present(&env.snapshot());

    let mut outcome = Outcome::Running;
    let mut steps = 0;
    while !outcome.is_terminal() && steps < max_steps {
        let action = learner.select_action(&state, rng)?;
        let step = env.step(action)?;
        steps += 1;
        outcome = step.info.outcome;
        state = step.state;
        renderer.present(&env.snapshot());
    }

    if !outcome.is_terminal() {
        outcome = Outcome::OutOfSteps;
    }
    Ok((env.total_reward(), outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        castle::{EnvConfig, WallPattern},
        pipeline::baselines::{GreedyLearner, RandomLearner},
        q_learning::QLearningAgent,
    };

    #[test]
    fn test_untrained_greedy_agent_times_out() {
        // An all-zero table always picks Up, which never leaves the start corner
        let mut env = GridEnvironment::new(EnvConfig::default().with_max_steps(20)).unwrap();
        let agent = QLearningAgent::default();
        let mut greedy = GreedyLearner::new(&agent);
        let config = EvaluationConfig {
            episodes: 3,
            seed: Some(1),
            ..EvaluationConfig::default()
        };

        let result = evaluate(&mut env, &mut greedy, &config, &mut []).unwrap();
        assert_eq!(result.episodes, 3);
        assert_eq!(result.out_of_steps, 3);
        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.mean_steps, 20.0);
        assert_eq!(result.mean_reward, -10.0);
        assert_eq!(agent.q_table_size(), 0);
    }

    #[test]
    fn test_random_baseline_outcomes_add_up() {
        let mut env = GridEnvironment::new(
            EnvConfig::default()
                .with_grid_size(4)
                .with_walls(WallPattern::Open),
        )
        .unwrap();
        let mut learner = RandomLearner::default();
        let config = EvaluationConfig {
            episodes: 25,
            seed: Some(8),
            ..EvaluationConfig::default()
        };

        let result = evaluate(&mut env, &mut learner, &config, &mut []).unwrap();
        assert_eq!(
            result.escapes + result.wrong_order + result.out_of_steps,
            25
        );
        assert_eq!(result.learner, "Random");
    }
}
