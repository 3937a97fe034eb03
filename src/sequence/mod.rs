// ABOUTME: Attack sequences - loading them and checking them against the grid.
// ABOUTME: Sequences are fixed before a run and never change during it.

mod plan;
mod source;

pub use plan::AttackPlan;
pub use source::{JsonFileSource, SequenceSource, StaticSource, read_sequence};

#[cfg(test)]
mod sequence_test;
