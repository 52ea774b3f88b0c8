//! Q-learning agent
//!
//! Tabular, off-policy TD control over [`StateKey`]s with ε-greedy exploration.
//! Exploration decays on every update, not once per episode.

use std::path::Path;

use rand::{Rng, RngCore};
use tracing::{info, warn};

use crate::{
    Error, Result,
    adapters::repository_for,
    castle::GridState,
    ports::{Learner, TableRepository, Transition},
    q_learning::{
        config::AgentConfig,
        q_table::QTable,
        serialization::{LoadStatus, SavedValueTable},
        state_key::StateKey,
    },
    types::{ACTION_COUNT, Action},
};

/// Q-learning agent (off-policy TD control)
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: AgentConfig,
    epsilon: f64,
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self::from_config(AgentConfig::default())
    }
}

impl QLearningAgent {
    /// Create a new agent with an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a hyperparameter is out of range.
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: AgentConfig) -> Self {
        Self {
            q_table: QTable::new(config.learning_rate, config.discount_factor),
            epsilon: config.epsilon,
            config,
        }
    }

    /// ε-greedy action selection.
    ///
    /// With probability ε a uniformly random action is returned without looking
    /// at the state; otherwise the greedy action for the state's key.
    pub fn select_action(&mut self, state: &GridState, rng: &mut dyn RngCore) -> Result<Action> {
        if rng.random::<f64>() < self.epsilon {
            return Action::try_from(rng.random_range(0..ACTION_COUNT));
        }
        self.greedy_action(state)
    }

    /// Greedy action for `state`, ignoring ε.
    pub fn greedy_action(&mut self, state: &GridState) -> Result<Action> {
        let key = StateKey::derive(state)?;
        Ok(self.q_table.greedy_action(&key))
    }

    /// Greedy action under the current table, leaving unseen keys unrecorded.
    pub fn best_action(&self, state: &GridState) -> Result<Action> {
        let key = StateKey::derive(state)?;
        Ok(self.q_table.best_action(&key))
    }

    /// Apply one Q-learning update and decay ε.
    pub fn update(
        &mut self,
        state: &GridState,
        action: Action,
        reward: f64,
        next_state: &GridState,
        done: bool,
    ) -> Result<()> {
        let key = StateKey::derive(state)?;
        let next_key = StateKey::derive(next_state)?;
        self.q_table
            .q_learning_update(&key, action, reward, &next_key, done);
        self.decay_epsilon();
        Ok(())
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override the current exploration rate (0 gives a purely greedy policy).
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_size(&self) -> usize {
        self.q_table.size()
    }

    /// Persisted form of the current table.
    pub fn export_table(&self) -> SavedValueTable {
        SavedValueTable::from_table(&self.q_table)
    }

    /// Replace the table with a saved one. The table is untouched on error.
    pub fn import_table(&mut self, saved: SavedValueTable) -> Result<usize> {
        let rows = saved.into_rows()?;
        let entries = rows.len();
        self.q_table.replace_rows(rows);
        Ok(entries)
    }

    /// Save the table to `path`, choosing the format from the extension.
    pub fn save_table(&self, path: &Path) -> Result<()> {
        self.save_table_with(repository_for(path).as_ref(), path)
    }

    pub fn save_table_with(&self, repo: &dyn TableRepository, path: &Path) -> Result<()> {
        repo.save(&self.export_table(), path)?;
        info!(path = %path.display(), entries = self.q_table.size(), "saved value table");
        Ok(())
    }

    /// Restore the table from `path`.
    ///
    /// Never fails: a missing or unreadable file leaves the current table as is
    /// and is reported through the returned status and a log warning.
    pub fn load_table(&mut self, path: &Path) -> LoadStatus {
        self.load_table_with(repository_for(path).as_ref(), path)
    }

    pub fn load_table_with(&mut self, repo: &dyn TableRepository, path: &Path) -> LoadStatus {
        let loaded = repo.load(path).and_then(|saved| self.import_table(saved));
        match loaded {
            Ok(entries) => {
                info!(path = %path.display(), entries, "loaded value table");
                LoadStatus::Loaded { entries }
            }
            Err(Error::TableNotFound { .. }) => {
                warn!(path = %path.display(), "no saved value table found, starting fresh");
                LoadStatus::Missing
            }
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no saved value table found, starting fresh");
                LoadStatus::Missing
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable value table, starting fresh");
                LoadStatus::Corrupt {
                    reason: err.to_string(),
                }
            }
        }
    }
}

impl Learner for QLearningAgent {
    fn select_action(&mut self, state: &GridState, rng: &mut dyn RngCore) -> Result<Action> {
        QLearningAgent::select_action(self, state, rng)
    }

    fn update(&mut self, transition: &Transition<'_>) -> Result<()> {
        QLearningAgent::update(
            self,
            transition.state,
            transition.action,
            transition.reward,
            transition.next_state,
            transition.done,
        )
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn exploration_rate(&self) -> Option<f64> {
        Some(self.epsilon)
    }

    fn table_size(&self) -> Option<usize> {
        Some(self.q_table.size())
    }
}
