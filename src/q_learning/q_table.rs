//! Q-table implementation for temporal difference learning
//!
//! Rows are created lazily the first time a key is looked up for selection or
//! update. The key space is an abstraction of the grid, so the table keeps
//! growing as long as training discovers new neighbourhoods; that growth is
//! expected and bounded only by the number of distinct keys.

use std::collections::HashMap;

use crate::{
    q_learning::state_key::StateKey,
    types::{ACTION_COUNT, Action},
};

/// Action values for one state, indexed by [`Action::index`].
pub type ActionValues = [f64; ACTION_COUNT];

/// Q-table mapping state keys to per-action values
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    q_values: HashMap<StateKey, ActionValues>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a new, empty Q-table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    /// Values for `state`, if the row exists
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.q_values.get(state)
    }

    /// Values for `state`, inserting a zero row if unseen
    pub fn row_mut(&mut self, state: &StateKey) -> &mut ActionValues {
        self.q_values
            .entry(state.clone())
            .or_insert([0.0; ACTION_COUNT])
    }

    /// Replace the row for `state`
    pub fn set(&mut self, state: StateKey, values: ActionValues) {
        self.q_values.insert(state, values);
    }

    /// Maximum value in the row for `state`, initializing it if unseen
    pub fn max_q(&mut self, state: &StateKey) -> f64 {
        self.row_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action for `state`, initializing the row if unseen.
    ///
    /// Ties go to the lowest action index.
    pub fn greedy_action(&mut self, state: &StateKey) -> Action {
        argmax(self.row_mut(state))
    }

    /// Greedy action for `state` without touching the table.
    ///
    /// An unseen key behaves like a zero row, so it maps to [`Action::Up`].
    pub fn best_action(&self, state: &StateKey) -> Action {
        self.get(state).map_or(Action::ALL[0], argmax)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)], with the target
    /// reduced to `r` on terminal transitions. Returns the TD error.
    pub fn q_learning_update(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
        done: bool,
    ) -> f64 {
        let max_next_q = self.max_q(next_state);
        let td_target = if done {
            reward
        } else {
            reward + self.discount_factor * max_next_q
        };

        let learning_rate = self.learning_rate;
        let cell = &mut self.row_mut(state)[action.index()];
        let td_error = td_target - *cell;
        *cell += learning_rate * td_error;
        td_error
    }

    /// Drop all rows
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of rows stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.q_values.iter()
    }

    /// Swap in a new set of rows, keeping α and γ
    pub fn replace_rows(&mut self, rows: HashMap<StateKey, ActionValues>) {
        self.q_values = rows;
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }
}

/// First action holding the row maximum.
fn argmax(row: &ActionValues) -> Action {
    let mut best = 0;
    for (index, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = index;
        }
    }
    Action::ALL[best]
}
