// ABOUTME: AttackPlan - both agents' sequences, validated before any task starts.

use crate::agent::AgentId;
use crate::error::SequenceError;
use crate::grid::Coord;

use super::source::SequenceSource;

/// The coordinate sequences of both agents for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPlan {
    sequences: [Vec<Coord>; 2],
}

impl AttackPlan {
    /// Wrap two sequences without validating them.
    pub fn new(first: Vec<Coord>, second: Vec<Coord>) -> Self {
        Self {
            sequences: [first, second],
        }
    }

    /// Load both sequences from `source`, check them against a
    /// `width` x `height` grid and keep the first `hits` coordinates of each.
    ///
    /// Any failure aborts the load; there is no partial plan.
    pub async fn load(
        source: &dyn SequenceSource,
        width: usize,
        height: usize,
        hits: usize,
    ) -> Result<Self, SequenceError> {
        let first = source.load(AgentId::One).await?;
        let second = source.load(AgentId::Two).await?;

        let plan = Self::new(first, second).truncated(hits)?;
        plan.check_bounds(width, height)?;
        Ok(plan)
    }

    /// The sequence of `agent`.
    pub fn sequence(&self, agent: AgentId) -> &[Coord] {
        &self.sequences[agent.index()]
    }

    /// Keep exactly `hits` coordinates per agent.
    ///
    /// Fails with `SequenceError::TooShort` if a sequence has fewer.
    pub fn truncated(mut self, hits: usize) -> Result<Self, SequenceError> {
        for agent in AgentId::ALL {
            let sequence = &mut self.sequences[agent.index()];
            if sequence.len() < hits {
                return Err(SequenceError::TooShort {
                    agent,
                    expected: hits,
                    actual: sequence.len(),
                });
            }
            sequence.truncate(hits);
        }
        Ok(self)
    }

    /// Check that every coordinate lies inside a `width` x `height` grid.
    pub fn check_bounds(&self, width: usize, height: usize) -> Result<(), SequenceError> {
        for agent in AgentId::ALL {
            let outside = self
                .sequence(agent)
                .iter()
                .enumerate()
                .find(|(_, coord)| coord.x >= height || coord.y >= width);

            if let Some((index, &coord)) = outside {
                return Err(SequenceError::OutOfBounds {
                    agent,
                    index,
                    coord,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }

    /// Coordinates struck by `agent` and never by the other agent.
    pub fn exclusive_to(&self, agent: AgentId) -> Vec<Coord> {
        let others = self.sequence(agent.other());
        let mut coords: Vec<Coord> = self
            .sequence(agent)
            .iter()
            .filter(|coord| !others.contains(coord))
            .copied()
            .collect();
        coords.sort_by_key(|c| (c.x, c.y));
        coords.dedup();
        coords
    }
}
