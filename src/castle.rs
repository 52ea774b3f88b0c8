//! Castle grid combat puzzle
//!
//! The player starts in one corner of a square grid, has to defeat three ranked
//! adversaries standing in the other corners in a fixed order, and then walk onto
//! a goal cell in the centre that only appears once all adversaries are gone.
//!
//! ## Channels
//!
//! | Index | Contents |
//! |-------|----------|
//! | 0 | player |
//! | 1 | adversary, rank 1 |
//! | 2 | adversary, rank 10 |
//! | 3 | adversary, rank 100 |
//! | 4 | goal (once revealed) |
//! | 5 | wall |

pub mod environment;
pub mod grid;
pub mod layout;
pub mod rewards;

pub use environment::{
    Adversary, Blocker, EnvConfig, EnvSnapshot, GridEnvironment, Outcome, StepInfo, StepResult,
};
pub use grid::{CHANNELS, Channel, GridState};
pub use layout::{Layout, MIN_GRID_SIZE, RANKS, WallPattern};
pub use rewards::RewardConfig;
