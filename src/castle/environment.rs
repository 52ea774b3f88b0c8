//! Castle environment state machine
//!
//! Owns the authoritative grid, enforces movement and combat legality, shapes
//! rewards and decides termination. Renderers only ever see [`EnvSnapshot`]s.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    grid::{Channel, GridState},
    layout::{Layout, RANKS, WallPattern},
    rewards::RewardConfig,
};
use crate::{
    Error, Result,
    types::{Action, Coord},
};

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Grid side length
    pub grid_size: usize,
    /// Episode step cap
    pub max_steps: usize,
    /// Wall layout used on every reset
    pub walls: WallPattern,
    /// Reward schedule
    pub rewards: RewardConfig,
    /// Seed for the environment RNG (only scattered walls draw from it)
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            max_steps: 100,
            walls: WallPattern::default(),
            rewards: RewardConfig::default(),
            seed: None,
        }
    }
}

impl EnvConfig {
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_walls(mut self, walls: WallPattern) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps must be at least 1".to_string(),
            });
        }
        self.walls.validate()?;
        Layout::standard(self.grid_size).map(|_| ())
    }
}

/// One of the three ranked adversaries. Adversaries never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adversary {
    pub position: Coord,
    pub rank: u32,
    /// Mandatory defeat order (0 first)
    pub precedence: usize,
    pub alive: bool,
}

/// How an episode stands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Running,
    /// All adversaries defeated and the goal reached
    Escaped,
    /// An adversary was attacked before its predecessors
    WrongOrder,
    /// Step cap reached
    OutOfSteps,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Running)
    }
}

/// What stopped a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    Wall,
    /// Live adversary, by precedence index
    Adversary(usize),
}

/// Auxiliary information about a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub action: Action,
    /// Player coordinate changed
    pub moved: bool,
    pub blocked: Option<Blocker>,
    /// Precedence index of the adversary defeated this step
    pub killed: Option<usize>,
    pub outcome: Outcome,
}

/// Result of [`GridEnvironment::step`].
#[derive(Debug, Clone)]
pub struct StepResult {
    pub state: GridState,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Read-only view of the environment for renderers and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub grid: GridState,
    pub player: Coord,
    pub adversaries: [Adversary; 3],
    pub goal: Coord,
    pub goal_revealed: bool,
    pub steps: usize,
    pub total_reward: f64,
    pub done: bool,
}

/// The castle grid environment.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    config: EnvConfig,
    layout: Layout,
    grid: GridState,
    player: Coord,
    adversaries: [Adversary; 3],
    goal_revealed: bool,
    steps: usize,
    total_reward: f64,
    done: bool,
    rng: StdRng,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

fn fresh_adversaries(layout: &Layout) -> [Adversary; 3] {
    std::array::from_fn(|precedence| Adversary {
        position: layout.adversaries[precedence],
        rank: RANKS[precedence],
        precedence,
        alive: true,
    })
}

impl GridEnvironment {
    /// Create an environment and reset it to the initial layout.
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let layout = Layout::standard(config.grid_size)?;
        let mut env = Self {
            grid: GridState::new(layout.size),
            player: layout.player_start,
            adversaries: fresh_adversaries(&layout),
            goal_revealed: false,
            steps: 0,
            total_reward: 0.0,
            done: false,
            rng: build_rng(config.seed),
            layout,
            config,
        };
        env.reset(None);
        Ok(env)
    }

    /// Discard the current episode and rebuild the fixed layout.
    ///
    /// A `seed` reseeds the environment RNG before walls are generated.
    pub fn reset(&mut self, seed: Option<u64>) -> GridState {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let mut grid = GridState::new(self.layout.size);
        for wall in self.layout.walls(self.config.walls, &mut self.rng) {
            grid.set(wall, Channel::Wall);
        }

        self.player = self.layout.player_start;
        grid.set(self.player, Channel::Player);

        self.adversaries = fresh_adversaries(&self.layout);
        for (adversary, channel) in self.adversaries.iter().zip(Channel::ADVERSARIES) {
            grid.set(adversary.position, channel);
        }

        self.grid = grid;
        self.goal_revealed = false;
        self.steps = 0;
        self.total_reward = 0.0;
        self.done = false;
        self.grid.clone()
    }

    /// Advance the episode by one action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpisodeOver`] if the episode already terminated.
    pub fn step(&mut self, action: Action) -> Result<StepResult> {
        if self.done {
            return Err(Error::EpisodeOver);
        }
        self.steps += 1;

        let rewards = self.config.rewards;
        let mut reward = rewards.step_cost;
        let mut info = StepInfo {
            action,
            moved: false,
            blocked: None,
            killed: None,
            outcome: Outcome::Running,
        };

        if action.is_move() {
            reward += self.resolve_move(action, &mut info);
        } else if let Some(attack_reward) = self.resolve_attack(&mut info) {
            reward = attack_reward;
        }

        if info.outcome == Outcome::Running && self.goal_revealed && self.player == self.layout.goal
        {
            reward += rewards.escape_bonus;
            info.outcome = Outcome::Escaped;
            debug!(steps = self.steps, "goal reached");
        }

        if info.outcome == Outcome::Running && self.steps >= self.config.max_steps {
            info.outcome = Outcome::OutOfSteps;
        }

        self.done = info.outcome.is_terminal();
        self.total_reward += reward;

        Ok(StepResult {
            state: self.grid.clone(),
            reward,
            done: self.done,
            info,
        })
    }

    /// Like [`step`](Self::step) but takes a raw action index.
    pub fn step_index(&mut self, index: usize) -> Result<StepResult> {
        self.step(Action::try_from(index)?)
    }

    /// Resolve a movement action; returns the reward to add to the step cost.
    fn resolve_move(&mut self, action: Action, info: &mut StepInfo) -> f64 {
        let rewards = self.config.rewards;
        let from = self.player;
        let to = from.step_clamped(action, self.layout.size);

        if self.grid.is_set(to, Channel::Wall) {
            info.blocked = Some(Blocker::Wall);
            return rewards.blocked_penalty;
        }
        if let Some(adversary) = self.adversaries.iter().find(|a| a.alive && a.position == to) {
            info.blocked = Some(Blocker::Adversary(adversary.precedence));
            return rewards.blocked_penalty;
        }

        self.grid.clear(from, Channel::Player);
        self.grid.set(to, Channel::Player);
        self.player = to;
        info.moved = to != from;

        match self.current_target() {
            Some((target, bonus)) if to.manhattan(target) < from.manhattan(target) => bonus,
            _ => 0.0,
        }
    }

    /// Resolve an attack; returns the reward that replaces the step cost, if any.
    fn resolve_attack(&mut self, info: &mut StepInfo) -> Option<f64> {
        let rewards = self.config.rewards;
        let player = self.player;
        let adjacent: Vec<usize> = self
            .adversaries
            .iter()
            .filter(|a| a.alive && a.position.manhattan(player) == 1)
            .map(|a| a.precedence)
            .collect();
        if adjacent.is_empty() {
            return None;
        }

        let Some(index) = self.next_required().filter(|k| adjacent.contains(k)) else {
            info.outcome = Outcome::WrongOrder;
            debug!(?adjacent, "attacked out of order");
            return Some(rewards.wrong_order_penalty);
        };

        let adversary = &mut self.adversaries[index];
        adversary.alive = false;
        let (position, rank) = (adversary.position, adversary.rank);
        if let Some(channel) = Channel::adversary(index) {
            self.grid.clear(position, channel);
        }
        info.killed = Some(index);
        debug!(precedence = index, rank, "adversary defeated");

        let mut reward = rewards.kill_reward(rank);
        if self.adversaries.iter().all(|a| !a.alive) {
            self.goal_revealed = true;
            self.grid.set(self.layout.goal, Channel::Goal);
            reward += rewards.clear_bonus;
            debug!(goal = %self.layout.goal, "goal revealed");
        }
        Some(reward)
    }

    /// Precedence index of the next adversary that may be defeated.
    pub fn next_required(&self) -> Option<usize> {
        self.adversaries
            .iter()
            .find(|a| a.alive)
            .map(|a| a.precedence)
    }

    /// Cell the shaping reward steers toward, with its approach bonus.
    fn current_target(&self) -> Option<(Coord, f64)> {
        let rewards = &self.config.rewards;
        match self.next_required() {
            Some(index) => Some((self.adversaries[index].position, rewards.approach_bonus)),
            None if self.goal_revealed => Some((self.layout.goal, rewards.goal_approach_bonus)),
            None => None,
        }
    }

    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot {
            grid: self.grid.clone(),
            player: self.player,
            adversaries: self.adversaries,
            goal: self.layout.goal,
            goal_revealed: self.goal_revealed,
            steps: self.steps,
            total_reward: self.total_reward,
            done: self.done,
        }
    }

    pub fn state(&self) -> &GridState {
        &self.grid
    }

    pub fn player(&self) -> Coord {
        self.player
    }

    pub fn adversaries(&self) -> &[Adversary; 3] {
        &self.adversaries
    }

    pub fn goal_revealed(&self) -> bool {
        self.goal_revealed
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
