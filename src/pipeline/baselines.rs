//! Fixed policies: a uniform random baseline and a greedy, non-learning view of
//! a trained agent.

use rand::{Rng, RngCore};

use crate::{
    Result,
    castle::GridState,
    ports::Learner,
    q_learning::QLearningAgent,
    types::{ACTION_COUNT, Action},
};

/// Random policy learner (baseline)
#[derive(Debug, Clone)]
pub struct RandomLearner {
    name: String,
}

impl RandomLearner {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

impl Default for RandomLearner {
    fn default() -> Self {
        Self::new("Random".to_string())
    }
}

impl Learner for RandomLearner {
    fn select_action(&mut self, _state: &GridState, rng: &mut dyn RngCore) -> Result<Action> {
        Action::try_from(rng.random_range(0..ACTION_COUNT))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Greedy learner that exploits a trained agent without updating it
///
/// Used for evaluation: exploration is ignored, transitions are dropped and the
/// table is only read, so unseen states are not recorded.
pub struct GreedyLearner<'a> {
    inner: &'a QLearningAgent,
}

impl<'a> GreedyLearner<'a> {
    pub fn new(inner: &'a QLearningAgent) -> Self {
        Self { inner }
    }
}

impl Learner for GreedyLearner<'_> {
    fn select_action(&mut self, state: &GridState, _rng: &mut dyn RngCore) -> Result<Action> {
        self.inner.best_action(state)
    }

    fn name(&self) -> &str {
        "Q-Learning (greedy)"
    }

    fn exploration_rate(&self) -> Option<f64> {
        Some(0.0)
    }

    fn table_size(&self) -> Option<usize> {
        Some(self.inner.q_table_size())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        castle::{EnvConfig, GridEnvironment},
        ports::Transition,
    };

    #[test]
    fn test_random_learner_covers_all_actions() {
        let env = GridEnvironment::new(EnvConfig::default()).unwrap();
        let mut learner = RandomLearner::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut seen = [false; ACTION_COUNT];
        for _ in 0..200 {
            seen[learner.select_action(env.state(), &mut rng).unwrap().index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_greedy_learner_does_not_learn() {
        let env = GridEnvironment::new(EnvConfig::default()).unwrap();
        let mut agent = QLearningAgent::default();
        let epsilon = agent.epsilon();
        let mut greedy = GreedyLearner::new(&agent);
        let state = env.state();

        greedy
            .update(&Transition {
                state,
                action: Action::Right,
                reward: 100.0,
                next_state: state,
                done: true,
            })
            .unwrap();
        assert_eq!(greedy.table_size(), Some(0));
        assert_eq!(agent.epsilon(), epsilon);
    }

    #[test]
    fn test_greedy_learner_leaves_unseen_states_out() {
        let env = GridEnvironment::new(EnvConfig::default()).unwrap();
        let agent = QLearningAgent::default();
        let mut greedy = GreedyLearner::new(&agent);
        let mut rng = StdRng::seed_from_u64(0);

        let action = greedy.select_action(env.state(), &mut rng).unwrap();
        assert_eq!(action, Action::Up);
        assert_eq!(agent.q_table_size(), 0);
    }
}
