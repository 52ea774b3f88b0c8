//! Hyperparameters for the Q-learning agent.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for creating a [`QLearningAgent`](super::QLearningAgent).
///
/// # Examples
///
/// ```
/// use castle_warrior::q_learning::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_learning_rate(0.1)
///     .with_epsilon(0.5)
///     .with_epsilon_decay(0.999);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// α, step size of the TD update
    pub learning_rate: f64,
    /// γ, weight of the bootstrapped next-state value
    pub discount_factor: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Floor for the exploration rate
    pub min_epsilon: f64,
    /// Multiplier applied to the exploration rate after every update
    pub epsilon_decay: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            discount_factor: 0.99,
            epsilon: 1.0,
            min_epsilon: 0.01,
            epsilon_decay: 0.995,
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("learning_rate", self.learning_rate, self.learning_rate > 0.0 && self.learning_rate <= 1.0),
            ("discount_factor", self.discount_factor, (0.0..=1.0).contains(&self.discount_factor)),
            ("epsilon", self.epsilon, (0.0..=1.0).contains(&self.epsilon)),
            ("min_epsilon", self.min_epsilon, (0.0..=1.0).contains(&self.min_epsilon)),
            ("epsilon_decay", self.epsilon_decay, self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} = {value} is out of range"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(AgentConfig::default().with_learning_rate(0.0).validate().is_err());
        assert!(AgentConfig::default().with_discount_factor(1.5).validate().is_err());
        assert!(AgentConfig::default().with_epsilon_decay(0.0).validate().is_err());
        assert!(AgentConfig::default().with_min_epsilon(-0.1).validate().is_err());
    }
}
