//! Fixed castle layout and wall generation

use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    types::{Action, Coord},
};

/// Smallest grid on which the four corners and the centre are distinct cells.
pub const MIN_GRID_SIZE: usize = 3;

/// Adversary ranks, indexed by precedence.
pub const RANKS: [u32; 3] = [1, 10, 100];

/// How walls are laid out on reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WallPattern {
    /// Wall at `(i, j)` iff `(i even and j % 3 == 0) or (i % 3 == 0 and j even)`
    #[default]
    Lattice,
    /// No walls at all
    Open,
    /// Each free cell becomes a wall with probability `density`
    Scattered { density: f64 },
}

impl WallPattern {
    pub fn validate(&self) -> Result<()> {
        match *self {
            WallPattern::Scattered { density } if !(0.0..1.0).contains(&density) => {
                Err(Error::InvalidConfiguration {
                    message: format!("wall density {density} must be in [0, 1)"),
                })
            }
            _ => Ok(()),
        }
    }

    fn is_lattice_wall(coord: Coord) -> bool {
        let (i, j) = (coord.row, coord.col);
        (i.is_multiple_of(2) && j.is_multiple_of(3)) || (i.is_multiple_of(3) && j.is_multiple_of(2))
    }
}

/// Fixed positions of every entity on a `size × size` grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub size: usize,
    pub player_start: Coord,
    /// Adversary cells, indexed by precedence
    pub adversaries: [Coord; 3],
    pub goal: Coord,
}

impl Layout {
    /// Standard layout: player top-left, rank 1 top-right, rank 10 bottom-right,
    /// rank 100 bottom-left and the goal in the centre.
    pub fn standard(size: usize) -> Result<Self> {
        if size < MIN_GRID_SIZE {
            return Err(Error::InvalidConfiguration {
                message: format!("grid size {size} is below the minimum of {MIN_GRID_SIZE}"),
            });
        }
        let last = size - 1;
        Ok(Self {
            size,
            player_start: Coord::new(0, 0),
            adversaries: [
                Coord::new(0, last),
                Coord::new(last, last),
                Coord::new(last, 0),
            ],
            goal: Coord::new(size / 2, size / 2),
        })
    }

    /// Cells that never receive a wall.
    pub fn protected(&self) -> BTreeSet<Coord> {
        let mut cells = BTreeSet::from([self.player_start, self.goal]);
        cells.extend(self.adversaries);
        cells
    }

    /// Wall cells for `pattern`. Only [`WallPattern::Scattered`] draws from `rng`.
    ///
    /// The result always leaves the puzzle solvable: with every adversary still
    /// standing, the player can reach a cell next to each adversary and the goal.
    pub fn walls(&self, pattern: WallPattern, rng: &mut dyn RngCore) -> BTreeSet<Coord> {
        let protected = self.protected();
        let free = (0..self.size * self.size)
            .map(|i| Coord::new(i / self.size, i % self.size))
            .filter(|coord| !protected.contains(coord));

        let mut walls = match pattern {
            WallPattern::Open => BTreeSet::new(),
            WallPattern::Lattice => free.filter(|&c| WallPattern::is_lattice_wall(c)).collect(),
            WallPattern::Scattered { density } => {
                free.filter(|_| rng.random::<f64>() < density).collect()
            }
        };

        for adversary in self.adversaries {
            let approaches: Vec<Coord> = self
                .neighbours(adversary)
                .filter(|cell| !self.adversaries.contains(cell))
                .collect();
            self.carve_path(&mut walls, &approaches);
        }
        self.carve_path(&mut walls, &[self.goal]);
        walls
    }

    /// In-grid cells one move away from `cell`.
    pub fn neighbours(&self, cell: Coord) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        Action::ALL
            .into_iter()
            .filter(|action| action.is_move())
            .map(move |action| cell.step_clamped(action, size))
            .filter(move |&next| next != cell)
    }

    /// Remove the fewest walls that connect the start to one of `targets`.
    ///
    /// Adversary cells are impassable. Walls cost one to cross and open cells
    /// nothing, so a 0-1 BFS finds the cheapest route; ties go to the smallest
    /// target cell.
    fn carve_path(&self, walls: &mut BTreeSet<Coord>, targets: &[Coord]) {
        let index = |cell: Coord| cell.row * self.size + cell.col;
        let mut cost = vec![usize::MAX; self.size * self.size];
        let mut parent: Vec<Option<Coord>> = vec![None; self.size * self.size];
        let mut queue = VecDeque::from([self.player_start]);
        cost[index(self.player_start)] = 0;

        while let Some(cell) = queue.pop_front() {
            for next in self.neighbours(cell) {
                if self.adversaries.contains(&next) {
                    continue;
                }
                let step = usize::from(walls.contains(&next));
                let candidate = cost[index(cell)] + step;
                if candidate < cost[index(next)] {
                    cost[index(next)] = candidate;
                    parent[index(next)] = Some(cell);
                    if step == 0 {
                        queue.push_front(next);
                    } else {
                        queue.push_back(next);
                    }
                }
            }
        }

        let mut cursor = targets
            .iter()
            .copied()
            .filter(|&target| cost[index(target)] != usize::MAX)
            .min_by_key(|&target| (cost[index(target)], target));
        while let Some(cell) = cursor {
            walls.remove(&cell);
            cursor = parent[index(cell)];
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_standard_layout_corners() {
        let layout = Layout::standard(8).unwrap();
        assert_eq!(layout.player_start, Coord::new(0, 0));
        assert_eq!(layout.adversaries[0], Coord::new(0, 7));
        assert_eq!(layout.adversaries[1], Coord::new(7, 7));
        assert_eq!(layout.adversaries[2], Coord::new(7, 0));
        assert_eq!(layout.goal, Coord::new(4, 4));
        assert_eq!(layout.protected().len(), 5);
    }

    #[test]
    fn test_grid_too_small() {
        assert!(Layout::standard(2).is_err());
        assert!(Layout::standard(MIN_GRID_SIZE).is_ok());
    }

    #[test]
    fn test_lattice_row_zero() {
        let layout = Layout::standard(8).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let walls = layout.walls(WallPattern::Lattice, &mut rng);
        let row0: Vec<usize> = walls.iter().filter(|c| c.row == 0).map(|c| c.col).collect();
        // (0, 0) is protected
        assert_eq!(row0, vec![2, 3, 4, 6]);
        assert!(walls.iter().all(|c| c.row != 1));
    }

    #[test]
    fn test_lattice_opens_a_way_in() {
        let mut rng = StdRng::seed_from_u64(0);

        // The centre of a 6 × 6 lattice is boxed in on all four sides
        let layout = Layout::standard(6).unwrap();
        let walls = layout.walls(WallPattern::Lattice, &mut rng);
        assert!(layout.neighbours(layout.goal).any(|c| !walls.contains(&c)));

        // Both cells next to the rank 10 adversary on a 4 × 4 lattice are walls
        let layout = Layout::standard(4).unwrap();
        let walls = layout.walls(WallPattern::Lattice, &mut rng);
        let adversary = layout.adversaries[1];
        assert!(layout.neighbours(adversary).any(|c| !walls.contains(&c)));
    }

    #[test]
    fn test_neighbours_stay_on_grid() {
        let layout = Layout::standard(5).unwrap();
        let corner: Vec<Coord> = layout.neighbours(Coord::new(0, 0)).collect();
        assert_eq!(corner, vec![Coord::new(0, 1), Coord::new(1, 0)]);
        assert_eq!(layout.neighbours(Coord::new(2, 2)).count(), 4);
    }

    #[test]
    fn test_scattered_is_seeded_and_protected() {
        let layout = Layout::standard(10).unwrap();
        let pattern = WallPattern::Scattered { density: 0.6 };
        let a = layout.walls(pattern, &mut StdRng::seed_from_u64(3));
        let b = layout.walls(pattern, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert!(layout.protected().iter().all(|c| !a.contains(c)));
    }

    #[test]
    fn test_density_validation() {
        assert!(WallPattern::Scattered { density: 1.0 }.validate().is_err());
        assert!(WallPattern::Scattered { density: -0.1 }.validate().is_err());
        assert!(WallPattern::Scattered { density: 0.3 }.validate().is_ok());
    }
}
