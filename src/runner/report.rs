// ABOUTME: What a strategy run reports: duration, final grid health and scores.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::strategy::Strategy;
use crate::agent::{AgentId, AgentResult};
use crate::coordination::CoordinationStats;
use crate::grid::GridSnapshot;

/// Outcome of running one strategy to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub strategy: Strategy,

    /// Wall-clock time from starting the agents until both finished.
    pub elapsed: Duration,

    /// Final health. One grid for shared strategies; for message-passing the
    /// grid owned by agent 1 comes first, then agent 2's.
    pub grids: Vec<GridSnapshot>,

    /// Per-agent results, agent 1 first.
    pub agents: Vec<AgentResult>,

    /// Envelope counts, for message-passing runs.
    pub coordination: Option<CoordinationStats>,
}

impl RunReport {
    /// Score of `agent`.
    pub fn score(&self, agent: AgentId) -> u32 {
        self.agents
            .iter()
            .find(|result| result.agent == agent)
            .map_or(0, |result| result.score)
    }

    /// The agent with the higher score, or `None` on a tie.
    pub fn winner(&self) -> Option<AgentId> {
        let first = self.score(AgentId::One);
        let second = self.score(AgentId::Two);
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => Some(AgentId::One),
            std::cmp::Ordering::Less => Some(AgentId::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The final grid, or agent 1's grid for message-passing.
    pub fn grid(&self) -> &GridSnapshot {
        &self.grids[0]
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] elapsed {:?}", self.strategy, self.elapsed)?;
        writeln!(f, "------------------------------------------------")?;
        for (index, grid) in self.grids.iter().enumerate() {
            if self.grids.len() > 1 {
                writeln!(f, "Final state of grid {}:", index + 1)?;
            } else {
                writeln!(f, "Final state of the blocks:")?;
            }
            write!(f, "{}", grid)?;
            writeln!(f, "------------------------------------------------")?;
        }
        for result in &self.agents {
            writeln!(f, "Agent {} scored {} point(s)", result.agent, result.score)?;
        }
        Ok(())
    }
}
