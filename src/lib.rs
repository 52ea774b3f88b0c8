//! Castle warrior: a turn-based grid combat puzzle and a tabular Q-learning agent
//!
//! This crate provides:
//! - The castle environment: a multi-channel grid, three ranked adversaries
//!   that must be defeated in order, and a goal revealed once all are down
//! - A Q-learning agent over translation-invariant state keys
//! - Value-table persistence (MessagePack, JSON, in-memory)
//! - A training driver with observers, greedy evaluation and a text renderer

pub mod adapters;
pub mod castle;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod render;
pub mod types;

pub use castle::{EnvConfig, GridEnvironment, GridState, Outcome, RewardConfig, WallPattern};
pub use error::{Error, Result};
pub use q_learning::{AgentConfig, LoadStatus, QLearningAgent, StateKey};
pub use types::{Action, Coord, Offset};
