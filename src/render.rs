//! Plain-text rendering of environment snapshots
//!
//! The renderer only consumes [`EnvSnapshot`]s; the environment has no idea it
//! exists.

use std::{fmt::Write, thread, time::Duration};

use crate::castle::{Channel, EnvSnapshot};
use crate::types::Coord;

/// Draws snapshots as ASCII frames with a small status panel.
///
/// | Glyph | Meaning |
/// |-------|---------|
/// | `P` | player |
/// | `1` `2` `3` | adversaries by precedence |
/// | `G` | revealed goal |
/// | `#` | wall |
/// | `.` | empty |
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    /// Pause after each presented frame; purely cosmetic
    frame_delay: Duration,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    fn glyph(snapshot: &EnvSnapshot, coord: Coord) -> char {
        let grid = &snapshot.grid;
        if grid.is_set(coord, Channel::Player) {
            'P'
        } else if let Some(k) = Channel::ADVERSARIES
            .iter()
            .position(|&channel| grid.is_set(coord, channel))
        {
            char::from(b'1' + k as u8)
        } else if grid.is_set(coord, Channel::Goal) {
            'G'
        } else if grid.is_set(coord, Channel::Wall) {
            '#'
        } else {
            '.'
        }
    }

    /// Render one frame.
    pub fn frame(&self, snapshot: &EnvSnapshot) -> String {
        let size = snapshot.grid.size();
        let mut status = vec![
            format!("Steps: {}", snapshot.steps),
            format!("Reward: {:.1}", snapshot.total_reward),
        ];
        status.extend(snapshot.adversaries.iter().map(|a| {
            format!(
                "L{:<3} {}",
                a.rank,
                if a.alive { "alive" } else { "defeated" }
            )
        }));
        status.push(if snapshot.goal_revealed {
            format!("Goal: open at {}", snapshot.goal)
        } else {
            "Goal: hidden".to_string()
        });
        if snapshot.done {
            status.push("Episode over".to_string());
        }

        let mut out = String::new();
        for row in 0..size.max(status.len()) {
            let mut line = String::new();
            if row < size {
                for col in 0..size {
                    line.push(Self::glyph(snapshot, Coord::new(row, col)));
                    line.push(' ');
                }
            } else {
                line.push_str(&" ".repeat(size * 2));
            }
            if let Some(text) = status.get(row) {
                let _ = write!(line, "  {text}");
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    /// Print a frame to stdout and wait for the configured delay.
    pub fn present(&self, snapshot: &EnvSnapshot) {
        println!("{}", self.frame(snapshot));
        if !self.frame_delay.is_zero() {
            thread::sleep(self.frame_delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        castle::{EnvConfig, GridEnvironment, WallPattern},
        types::Action,
    };

    #[test]
    fn test_initial_frame() {
        let env = GridEnvironment::new(
            EnvConfig::default()
                .with_grid_size(3)
                .with_walls(WallPattern::Open),
        )
        .unwrap();
        let frame = TextRenderer::new().frame(&env.snapshot());
        let lines: Vec<&str> = frame.lines().collect();

        assert!(lines[0].starts_with("P . 1"));
        assert!(lines[1].starts_with(". . ."));
        assert!(lines[2].starts_with("3 . 2"));
        assert!(frame.contains("Goal: hidden"));
        assert!(frame.contains("L1   alive"));
    }

    #[test]
    fn test_frame_shows_walls() {
        let mut env = GridEnvironment::new(EnvConfig::default()).unwrap();
        env.step(Action::Right).unwrap();
        let frame = TextRenderer::new().frame(&env.snapshot());
        let first = frame.lines().next().unwrap();
        assert!(first.starts_with(". P # # # . # 1"));
        assert!(frame.contains("Steps: 1"));
    }
}
