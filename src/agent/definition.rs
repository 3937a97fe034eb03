// ABOUTME: Agent identity and state - power, score and the fixed attack sequence.
// ABOUTME: Exactly two agents exist; AgentId names them and their mirror partner.

use serde::{Deserialize, Serialize};

use crate::grid::Coord;

/// One of the two agents of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentId {
    One,
    Two,
}

impl AgentId {
    /// Both agents, in order.
    pub const ALL: [AgentId; 2] = [AgentId::One, AgentId::Two];

    /// The other agent.
    pub fn other(self) -> AgentId {
        match self {
            AgentId::One => AgentId::Two,
            AgentId::Two => AgentId::One,
        }
    }

    /// 1-based number, as shown in reports.
    pub fn number(self) -> u8 {
        match self {
            AgentId::One => 1,
            AgentId::Two => 2,
        }
    }

    /// 0-based slot, for indexing per-agent arrays.
    pub fn index(self) -> usize {
        match self {
            AgentId::One => 0,
            AgentId::Two => 1,
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A striker replaying a fixed coordinate sequence.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Which agent this is.
    id: AgentId,

    /// Damage dealt per strike.
    power: u32,

    /// Blocks destroyed so far. Only ever grows.
    score: u32,

    /// Coordinates to strike, in order.
    sequence: Vec<Coord>,
}

impl Agent {
    /// Create an agent with a zero score.
    pub fn new(id: AgentId, power: u32, sequence: Vec<Coord>) -> Self {
        Self {
            id,
            power,
            score: 0,
            sequence,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn sequence(&self) -> &[Coord] {
        &self.sequence
    }

    /// Credit one destroyed block.
    pub(crate) fn award_point(&mut self) {
        self.score += 1;
    }
}
