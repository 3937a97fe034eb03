// ABOUTME: Fixed-size 2D grids of blocks, their coordinates and health snapshots.
// ABOUTME: Also pairs two grids into the mirrored world of the message-passing strategy.

use serde::{Deserialize, Serialize};

use super::resource::{GuardKind, HitLatency, Resource};
use crate::agent::AgentId;

/// A cell position. `x` selects the row, `y` the column.
///
/// Serialized as a two-element array `[x, y]`, the format of attack-sequence files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<[usize; 2]> for Coord {
    fn from([x, y]: [usize; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [usize; 2] {
    fn from(coord: Coord) -> Self {
        [coord.x, coord.y]
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A fixed-size grid of blocks. Its shape never changes after construction.
///
/// Blocks are numbered from 1 in row-major order; the number decides the
/// block's hit latency.
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Resource>,
}

impl Grid {
    /// Build a `height` x `width` grid with every block guarded by `kind`.
    pub fn new(width: usize, height: usize, latency: HitLatency, kind: GuardKind) -> Self {
        let cells = (0..height)
            .flat_map(|x| (0..width).map(move |y| Coord::new(x, y)))
            .enumerate()
            .map(|(index, coord)| Resource::new(index + 1, coord, latency, kind))
            .collect();

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `coord` lies inside the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.height && coord.y < self.width
    }

    /// The block at `coord`, if it lies inside the grid.
    pub fn get(&self, coord: Coord) -> Option<&Resource> {
        if self.contains(coord) {
            self.cells.get(coord.x * self.width + coord.y)
        } else {
            None
        }
    }

    /// All blocks in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.cells.iter()
    }

    /// Copy of every block's current health.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            health: self.cells.iter().map(Resource::health).collect(),
        }
    }
}

/// Health values of a grid at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major health values.
    pub health: Vec<i32>,
}

impl GridSnapshot {
    /// Health at `coord`, if it lies inside the grid.
    pub fn at(&self, coord: Coord) -> Option<i32> {
        if coord.x < self.height && coord.y < self.width {
            self.health.get(coord.x * self.width + coord.y).copied()
        } else {
            None
        }
    }

    /// Health values row by row.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.health.chunks(self.width.max(1))
    }

    /// Sum of all health values.
    pub fn total(&self) -> i64 {
        self.health.iter().map(|&h| i64::from(h)).sum()
    }
}

impl std::fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for health in row {
                write!(f, "{:3} ", health)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Two grids of the same shape describing one logical world.
///
/// Each agent owns one grid and strikes only that one. The other grid is
/// that agent's mirror: coordinator tasks apply the agent's effects there,
/// never the agent itself.
#[derive(Debug)]
pub struct MirroredGrids {
    first: Grid,
    second: Grid,
}

impl MirroredGrids {
    /// Build both grids with priority-lock guards.
    pub fn new(width: usize, height: usize, latency: HitLatency) -> Self {
        Self {
            first: Grid::new(width, height, latency, GuardKind::Priority),
            second: Grid::new(width, height, latency, GuardKind::Priority),
        }
    }

    /// The grid `agent` strikes directly.
    pub fn owned_by(&self, agent: AgentId) -> &Grid {
        match agent {
            AgentId::One => &self.first,
            AgentId::Two => &self.second,
        }
    }

    /// The grid where `agent`'s effects are mirrored.
    pub fn mirror_for(&self, agent: AgentId) -> &Grid {
        self.owned_by(agent.other())
    }

    pub fn width(&self) -> usize {
        self.first.width()
    }

    pub fn height(&self) -> usize {
        self.first.height()
    }

    /// Snapshots of the first and second grid, in that order.
    pub fn snapshots(&self) -> [GridSnapshot; 2] {
        [self.first.snapshot(), self.second.snapshot()]
    }
}
