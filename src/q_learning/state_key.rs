//! State abstraction for the tabular learner
//!
//! A raw grid has far too many configurations for a lookup table, so the agent
//! only keys on what it sees from the player's cell: where the next adversary
//! is, where the goal is (once revealed), and which walls are within two cells.
//! Absolute position is dropped entirely, so two grids that look the same from
//! the player's point of view share a key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    Error, Result,
    castle::{Channel, GridState},
    types::Offset,
};

/// Walls further than this (Chebyshev distance) are ignored.
pub const WALL_RADIUS: u32 = 2;

/// Compact, translation-invariant key derived from a grid state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    /// Offset to the next adversary that may be attacked
    target: Option<Offset>,
    /// Offset to the goal, present only once revealed
    goal: Option<Offset>,
    /// Nearby wall offsets, sorted
    walls: Vec<Offset>,
}

impl StateKey {
    pub fn new(target: Option<Offset>, goal: Option<Offset>, mut walls: Vec<Offset>) -> Self {
        walls.sort_unstable();
        Self {
            target,
            goal,
            walls,
        }
    }

    /// Derive the key for `state`.
    ///
    /// The target is taken from the lowest adversary channel that still has an
    /// occupied cell; defeated adversaries clear their channel, so this is always
    /// the adversary whose turn it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPlayer`] if no cell has the player channel set.
    pub fn derive(state: &GridState) -> Result<Self> {
        let player = state.player().ok_or(Error::MissingPlayer)?;

        let target = Channel::ADVERSARIES.iter().find_map(|&channel| {
            state
                .positions(channel)
                .min_by_key(|&cell| player.manhattan(cell))
                .map(|cell| player.offset_to(cell))
        });

        let goal = state
            .positions(Channel::Goal)
            .min_by_key(|&cell| player.manhattan(cell))
            .map(|cell| player.offset_to(cell));

        let walls = state
            .positions(Channel::Wall)
            .map(|cell| player.offset_to(cell))
            .filter(|offset| offset.chebyshev() <= WALL_RADIUS)
            .collect();

        Ok(Self::new(target, goal, walls))
    }

    pub fn target(&self) -> Option<Offset> {
        self.target
    }

    pub fn goal(&self) -> Option<Offset> {
        self.goal
    }

    pub fn walls(&self) -> &[Offset] {
        &self.walls
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, offset: Option<Offset>) -> fmt::Result {
    match offset {
        Some(offset) => write!(f, "{offset}"),
        None => f.write_str("-"),
    }
}

/// Canonical form: `T<dr>,<dc>|G<dr>,<dc>|W<dr>,<dc>;<dr>,<dc>...` with `-` for absent parts.
impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("T")?;
        write_optional(f, self.target)?;
        f.write_str("|G")?;
        write_optional(f, self.goal)?;
        f.write_str("|W")?;
        if self.walls.is_empty() {
            return f.write_str("-");
        }
        for (i, wall) in self.walls.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{wall}")?;
        }
        Ok(())
    }
}

fn parse_offset(raw: &str, key: &str) -> Result<Offset> {
    let invalid = || Error::InvalidStateKey {
        key: key.to_string(),
        reason: format!("malformed offset '{raw}'"),
    };
    let (row, col) = raw.split_once(',').ok_or_else(invalid)?;
    Ok(Offset::new(
        row.parse().map_err(|_| invalid())?,
        col.parse().map_err(|_| invalid())?,
    ))
}

fn parse_optional(raw: &str, key: &str) -> Result<Option<Offset>> {
    if raw == "-" {
        Ok(None)
    } else {
        parse_offset(raw, key).map(Some)
    }
}

impl FromStr for StateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('|');
        let mut section = |prefix: char| {
            parts
                .next()
                .and_then(|part| part.strip_prefix(prefix))
                .ok_or_else(|| Error::InvalidStateKey {
                    key: s.to_string(),
                    reason: format!("missing '{prefix}' section"),
                })
        };

        let target = parse_optional(section('T')?, s)?;
        let goal = parse_optional(section('G')?, s)?;
        let walls_raw = section('W')?;
        let walls = if walls_raw == "-" {
            Vec::new()
        } else {
            walls_raw
                .split(';')
                .map(|raw| parse_offset(raw, s))
                .collect::<Result<Vec<_>>>()?
        };

        if parts.next().is_some() {
            return Err(Error::InvalidStateKey {
                key: s.to_string(),
                reason: "trailing sections".to_string(),
            });
        }

        Ok(Self::new(target, goal, walls))
    }
}

impl Serialize for StateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn grid_with(size: usize, player: Coord) -> GridState {
        let mut grid = GridState::new(size);
        grid.set(player, Channel::Player);
        grid
    }

    #[test]
    fn test_missing_player_is_an_error() {
        let grid = GridState::new(5);
        assert!(matches!(StateKey::derive(&grid), Err(Error::MissingPlayer)));
    }

    #[test]
    fn test_target_uses_lowest_occupied_channel() {
        let mut grid = grid_with(8, Coord::new(3, 3));
        grid.set(Coord::new(3, 4), Channel::Adversary2);
        grid.set(Coord::new(0, 7), Channel::Adversary1);

        let key = StateKey::derive(&grid).unwrap();
        assert_eq!(key.target(), Some(Offset::new(-3, 4)));
        assert_eq!(key.goal(), None);
    }

    #[test]
    fn test_walls_limited_to_radius_and_sorted() {
        let mut grid = grid_with(8, Coord::new(4, 4));
        grid.set(Coord::new(6, 6), Channel::Wall);
        grid.set(Coord::new(2, 5), Channel::Wall);
        grid.set(Coord::new(4, 7), Channel::Wall);
        grid.set(Coord::new(4, 3), Channel::Wall);

        let key = StateKey::derive(&grid).unwrap();
        assert_eq!(
            key.walls(),
            &[Offset::new(-2, 1), Offset::new(0, -1), Offset::new(2, 2)]
        );
    }

    #[test]
    fn test_display_and_parse() {
        let key = StateKey::new(
            Some(Offset::new(0, 7)),
            None,
            vec![Offset::new(1, -1), Offset::new(-2, 0)],
        );
        let text = key.to_string();
        assert_eq!(text, "T0,7|G-|W-2,0;1,-1");
        assert_eq!(text.parse::<StateKey>().unwrap(), key);

        let empty = StateKey::new(None, Some(Offset::new(-1, 2)), Vec::new());
        assert_eq!(empty.to_string(), "T-|G-1,2|W-");
        assert_eq!("T-|G-1,2|W-".parse::<StateKey>().unwrap(), empty);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<StateKey>().is_err());
        assert!("T0,1|G-".parse::<StateKey>().is_err());
        assert!("T0;1|G-|W-".parse::<StateKey>().is_err());
        assert!("T0,1|G-|W-|X".parse::<StateKey>().is_err());
    }
}
