//! Common test utilities for the castle test suite.

#![allow(dead_code)]

use castle_warrior::{
    Action, Coord, EnvConfig, GridEnvironment, WallPattern,
    castle::{Channel, GridState},
};

/// Environment without walls, so the corner-to-corner routes are straight lines.
pub fn open_env(size: usize) -> GridEnvironment {
    GridEnvironment::new(
        EnvConfig::default()
            .with_grid_size(size)
            .with_walls(WallPattern::Open),
    )
    .unwrap()
}

/// Repeat `action` and return the summed reward.
pub fn walk(env: &mut GridEnvironment, action: Action, times: usize) -> f64 {
    (0..times).map(|_| env.step(action).unwrap().reward).sum()
}

/// Hand-built grid with one player, optional first adversary and some walls.
pub fn grid_with(
    size: usize,
    player: (usize, usize),
    target: Option<(usize, usize)>,
    walls: &[(usize, usize)],
) -> GridState {
    let mut grid = GridState::new(size);
    grid.set(Coord::from(player), Channel::Player);
    if let Some(target) = target {
        grid.set(Coord::from(target), Channel::Adversary0);
    }
    for &wall in walls {
        grid.set(Coord::from(wall), Channel::Wall);
    }
    grid
}
