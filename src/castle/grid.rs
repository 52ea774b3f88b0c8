//! Channelled occupancy tensor for the castle grid
//!
//! The grid is an `N × N × C` array of 0/1 indicators stored row-major with the
//! channel as the fastest-varying axis.

use serde::{Deserialize, Serialize};

use crate::types::Coord;

/// Number of occupancy channels per cell.
pub const CHANNELS: usize = 6;

/// Fixed channel layout of the grid tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Player = 0,
    /// Adversary with precedence index 0 (rank 1)
    Adversary0 = 1,
    /// Adversary with precedence index 1 (rank 10)
    Adversary1 = 2,
    /// Adversary with precedence index 2 (rank 100)
    Adversary2 = 3,
    /// Only ever set once the goal is revealed
    Goal = 4,
    Wall = 5,
}

impl Channel {
    pub const ADVERSARIES: [Channel; 3] =
        [Channel::Adversary0, Channel::Adversary1, Channel::Adversary2];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Occupancy channel of the adversary with the given precedence index.
    pub fn adversary(precedence: usize) -> Option<Channel> {
        Self::ADVERSARIES.get(precedence).copied()
    }
}

/// Raw grid state as seen by learners and renderers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridState {
    size: usize,
    cells: Vec<u8>,
}

impl GridState {
    /// Create an empty `size × size` grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size * CHANNELS],
        }
    }

    /// Grid side length.
    pub fn size(&self) -> usize {
        self.size
    }

    fn offset(&self, coord: Coord, channel: Channel) -> usize {
        debug_assert!(coord.row < self.size && coord.col < self.size);
        (coord.row * self.size + coord.col) * CHANNELS + channel.index()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    /// Whether `channel` is set at `coord`. Out-of-bounds cells read as empty.
    pub fn is_set(&self, coord: Coord, channel: Channel) -> bool {
        self.contains(coord) && self.cells[self.offset(coord, channel)] == 1
    }

    pub fn set(&mut self, coord: Coord, channel: Channel) {
        let idx = self.offset(coord, channel);
        self.cells[idx] = 1;
    }

    pub fn clear(&mut self, coord: Coord, channel: Channel) {
        let idx = self.offset(coord, channel);
        self.cells[idx] = 0;
    }

    /// Cells with `channel` set, in row-major order.
    pub fn positions(&self, channel: Channel) -> impl Iterator<Item = Coord> + '_ {
        (0..self.size * self.size)
            .map(move |i| Coord::new(i / self.size, i % self.size))
            .filter(move |&coord| self.is_set(coord, channel))
    }

    pub fn count(&self, channel: Channel) -> usize {
        self.positions(channel).count()
    }

    /// First cell holding the player, if any.
    pub fn player(&self) -> Option<Coord> {
        self.positions(Channel::Player).next()
    }
}
