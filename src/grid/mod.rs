// ABOUTME: Grid module - blocks, their guards, the hit operation and grids.
// ABOUTME: Shared by every strategy; only the guard kind changes between them.

mod grid;
mod resource;

pub use grid::{Coord, Grid, GridSnapshot, MirroredGrids};
pub use resource::{Critical, GuardKind, HitLatency, HitOutcome, MAX_HEALTH, Resource};

#[cfg(test)]
mod resource_test;
