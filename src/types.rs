//! Newtype wrappers for coordinates, offsets and actions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the square grid, addressed by row then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Relative offset from `self` to `other`.
    pub fn offset_to(self, other: Coord) -> Offset {
        Offset::new(
            other.row as i32 - self.row as i32,
            other.col as i32 - self.col as i32,
        )
    }

    /// Neighbouring cell in `action`'s direction, clamped to a `size`×`size` grid.
    ///
    /// Returns `self` for [`Action::Attack`] and when the move would leave the grid.
    pub fn step_clamped(self, action: Action, size: usize) -> Coord {
        let last = size.saturating_sub(1);
        match action {
            Action::Up => Coord::new(self.row.saturating_sub(1), self.col),
            Action::Right => Coord::new(self.row, (self.col + 1).min(last)),
            Action::Down => Coord::new((self.row + 1).min(last), self.col),
            Action::Left => Coord::new(self.row, self.col.saturating_sub(1)),
            Action::Attack => self,
        }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row, col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Signed (Δrow, Δcol) displacement between two cells.
///
/// Ordering is lexicographic on (row, col), which gives wall lists a canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Offset {
    pub row: i32,
    pub col: i32,
}

impl Offset {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) length.
    pub fn chebyshev(self) -> u32 {
        self.row.unsigned_abs().max(self.col.unsigned_abs())
    }

    /// Manhattan length.
    pub fn manhattan(self) -> u32 {
        self.row.unsigned_abs() + self.col.unsigned_abs()
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Number of discrete actions.
pub const ACTION_COUNT: usize = 5;

/// Player actions, indexed 0..[`ACTION_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
    Attack = 4,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Up,
        Action::Right,
        Action::Down,
        Action::Left,
        Action::Attack,
    ];

    /// Index of the action in value rows.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_move(self) -> bool {
        !matches!(self, Action::Attack)
    }
}

impl TryFrom<usize> for Action {
    type Error = crate::Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(crate::Error::InvalidAction {
                index,
                count: ACTION_COUNT,
            })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
            Action::Attack => "attack",
        };
        f.write_str(name)
    }
}
