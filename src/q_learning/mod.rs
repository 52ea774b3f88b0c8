//! Tabular Q-learning for the castle puzzle
//!
//! The agent never looks at the raw grid directly. Every grid is first reduced
//! to a [`StateKey`] (relative offsets to the next adversary, the goal and the
//! nearby walls), and a [`QTable`] maps those keys to one value per action.
//!
//! ## Update rule
//!
//! ```text
//! target = r                              if done
//! target = r + γ · max_a' Q(s', a')       otherwise
//! Q(s, a) ← Q(s, a) + α · (target − Q(s, a))
//! ε ← max(ε · decay, ε_min)               after every update
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use castle_warrior::{
//!     castle::{EnvConfig, GridEnvironment},
//!     q_learning::{AgentConfig, QLearningAgent},
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//! use std::path::Path;
//!
//! let mut env = GridEnvironment::new(EnvConfig::default())?;
//! let mut agent = QLearningAgent::new(AgentConfig::default())?;
//! let mut rng = StdRng::seed_from_u64(42);
//! agent.load_table(Path::new("q_table.msgpack"));
//!
//! let mut state = env.reset(None);
//! loop {
//!     let action = agent.select_action(&state, &mut rng)?;
//!     let step = env.step(action)?;
//!     agent.update(&state, action, step.reward, &step.state, step.done)?;
//!     state = step.state;
//!     if step.done {
//!         break;
//!     }
//! }
//! agent.save_table(Path::new("q_table.msgpack"))?;
//! # Ok::<(), castle_warrior::Error>(())
//! ```

pub mod agent;
pub mod config;
pub mod q_table;
pub mod serialization;
pub mod state_key;

// Public re-exports
pub use agent::QLearningAgent;
pub use config::AgentConfig;
pub use q_table::{ActionValues, QTable};
pub use serialization::{LoadStatus, SavedValueTable, TableFormat};
pub use state_key::{StateKey, WALL_RADIUS};
