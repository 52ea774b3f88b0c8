//! Shared configuration arguments for CLI commands

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{
    castle::{EnvConfig, WallPattern},
    q_learning::AgentConfig,
};

/// Wall layout selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    /// Fixed lattice of walls
    Lattice,
    /// No walls
    Open,
    /// Random walls at `--wall-density`
    Scattered,
}

/// Environment options shared by every command that plays episodes
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct EnvArgs {
    /// Grid side length
    #[arg(long, default_value_t = 8)]
    pub grid_size: usize,

    /// Environment step cap per episode
    #[arg(long, default_value_t = 100)]
    pub env_max_steps: usize,

    /// Wall layout
    #[arg(long, value_enum, default_value_t = WallKind::Lattice)]
    pub walls: WallKind,

    /// Wall probability for the scattered layout
    #[arg(long, default_value_t = 0.15)]
    pub wall_density: f64,

    /// Seed for the environment RNG (scattered walls)
    #[arg(long)]
    pub env_seed: Option<u64>,
}

impl EnvArgs {
    pub fn wall_pattern(&self) -> WallPattern {
        match self.walls {
            WallKind::Lattice => WallPattern::Lattice,
            WallKind::Open => WallPattern::Open,
            WallKind::Scattered => WallPattern::Scattered {
                density: self.wall_density,
            },
        }
    }

    /// Build and validate the environment configuration.
    pub fn to_env_config(&self) -> Result<EnvConfig> {
        let mut config = EnvConfig::default()
            .with_grid_size(self.grid_size)
            .with_max_steps(self.env_max_steps)
            .with_walls(self.wall_pattern());
        if let Some(seed) = self.env_seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Q-learning hyperparameters
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct AgentArgs {
    /// Learning rate α (0.0-1.0)
    #[arg(long, default_value_t = 0.2)]
    pub learning_rate: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.99)]
    pub discount: f64,

    /// Initial exploration rate ε
    #[arg(long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Exploration floor
    #[arg(long, default_value_t = 0.01)]
    pub min_epsilon: f64,

    /// Multiplicative ε decay applied after every update
    #[arg(long, default_value_t = 0.995)]
    pub epsilon_decay: f64,
}

impl AgentArgs {
    pub fn to_agent_config(&self) -> Result<AgentConfig> {
        let config = AgentConfig::default()
            .with_learning_rate(self.learning_rate)
            .with_discount_factor(self.discount)
            .with_epsilon(self.epsilon)
            .with_min_epsilon(self.min_epsilon)
            .with_epsilon_decay(self.epsilon_decay);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_args(walls: WallKind) -> EnvArgs {
        EnvArgs {
            grid_size: 8,
            env_max_steps: 100,
            walls,
            wall_density: 0.2,
            env_seed: Some(4),
        }
    }

    #[test]
    fn test_env_args_map_to_config() {
        let config = env_args(WallKind::Scattered).to_env_config().unwrap();
        assert_eq!(config.walls, WallPattern::Scattered { density: 0.2 });
        assert_eq!(config.seed, Some(4));
        assert_eq!(
            env_args(WallKind::Open).to_env_config().unwrap().walls,
            WallPattern::Open
        );
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut args = env_args(WallKind::Lattice);
        args.grid_size = 2;
        assert!(args.to_env_config().is_err());
    }
}
