// ABOUTME: Agent loop - replays an agent's coordinate sequence against its grid.
// ABOUTME: Handles both shared-grid strikes and mirrored strikes routed through coordinators.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{Agent, AgentId};
use crate::coordination::Mailbox;
use crate::error::{SequenceError, SiegeError};
use crate::grid::{Coord, Grid, HitOutcome, MirroredGrids, Resource};
use crate::observe::{Observer, SharedObserver, SiegeEvent};

/// Where an agent strikes.
#[derive(Clone)]
pub enum Battlefield {
    /// Both agents strike one grid directly.
    Shared(Arc<Grid>),

    /// Each agent strikes its own grid; effects reach the other grid through
    /// the coordinators behind `mailbox`.
    Mirrored {
        grids: Arc<MirroredGrids>,
        mailbox: Mailbox,
    },
}

/// Result from running an agent to the end of its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Which agent ran.
    pub agent: AgentId,

    /// Blocks destroyed.
    pub score: u32,

    /// Strikes that dealt damage.
    pub applied: usize,

    /// Strikes that found the block already destroyed.
    pub depleted: usize,
}

impl Agent {
    /// Strike the block at step `step` of this agent's sequence, on a grid
    /// both agents share.
    pub async fn strike(
        &mut self,
        grid: &Grid,
        step: usize,
        observer: &dyn Observer,
    ) -> Result<HitOutcome, SiegeError> {
        let (_, block) = self.target(grid, step)?;
        Ok(block.hit(self, observer).await?)
    }

    /// Strike the block at step `step` of this agent's sequence on its own
    /// grid and mirror the effect to the other grid.
    ///
    /// The begin envelope goes out before the local strike, the update (only
    /// when damage was dealt) after it, and the end envelope last on every
    /// path. No guard is held while sending.
    pub async fn strike_mirrored(
        &mut self,
        grid: &Grid,
        mailbox: &Mailbox,
        step: usize,
        observer: &dyn Observer,
    ) -> Result<HitOutcome, SiegeError> {
        let (coord, block) = self.target(grid, step)?;
        let agent = self.id();

        let open = mailbox.begin_hit(agent, coord).await?;

        let outcome = async {
            let outcome = block.hit(self, observer).await?;
            if let HitOutcome::Applied { health, .. } = outcome {
                mailbox.update(agent, coord, health).await?;
            }
            Ok::<_, SiegeError>(outcome)
        }
        .await;

        let ended = open.finish().await;
        let outcome = outcome?;
        ended?;
        Ok(outcome)
    }

    /// The coordinate at `step` and the block it names on `grid`.
    fn target<'g>(
        &self,
        grid: &'g Grid,
        step: usize,
    ) -> Result<(Coord, &'g Resource), SequenceError> {
        let coord = *self
            .sequence()
            .get(step)
            .ok_or_else(|| SequenceError::TooShort {
                agent: self.id(),
                expected: step + 1,
                actual: self.sequence().len(),
            })?;
        let block = grid
            .get(coord)
            .ok_or_else(|| out_of_bounds(self.id(), step, coord, grid))?;
        Ok((coord, block))
    }

    /// Replay the whole sequence, one strike at a time.
    pub async fn run(
        mut self,
        battlefield: Battlefield,
        observer: SharedObserver,
    ) -> Result<AgentResult, SiegeError> {
        let mut applied = 0;
        let mut depleted = 0;

        for step in 0..self.sequence().len() {
            let outcome = match &battlefield {
                Battlefield::Shared(grid) => self.strike(grid, step, observer.as_ref()).await?,
                Battlefield::Mirrored { grids, mailbox } => {
                    let grid = grids.owned_by(self.id());
                    self.strike_mirrored(grid, mailbox, step, observer.as_ref())
                        .await?
                }
            };

            if outcome.is_applied() {
                applied += 1;
            } else {
                depleted += 1;
            }
        }

        observer.emit(SiegeEvent::AgentFinished {
            agent: self.id(),
            score: self.score(),
        });

        Ok(AgentResult {
            agent: self.id(),
            score: self.score(),
            applied,
            depleted,
        })
    }
}

fn out_of_bounds(agent: AgentId, index: usize, coord: Coord, grid: &Grid) -> SequenceError {
    SequenceError::OutOfBounds {
        agent,
        index,
        coord,
        width: grid.width(),
        height: grid.height(),
    }
}
