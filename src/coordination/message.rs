// ABOUTME: Envelopes exchanged between agents and the coordinator tasks.
// ABOUTME: A tagged enum with named fields: BeginHit, EndHit and Update.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::grid::Coord;

/// A message routed to a coordinator.
///
/// `BeginHit` and `EndHit` travel on the lock channel; `Update` travels on
/// the update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinationMessage {
    /// `agent` is about to strike `coord` in its own grid.
    BeginHit { agent: AgentId, coord: Coord },

    /// `agent` is done with `coord`.
    EndHit { agent: AgentId, coord: Coord },

    /// `agent`'s strike left the block at `coord` with `health`.
    Update {
        agent: AgentId,
        coord: Coord,
        health: i32,
    },
}

impl CoordinationMessage {
    /// The agent the message was sent by.
    pub fn agent(&self) -> AgentId {
        match self {
            CoordinationMessage::BeginHit { agent, .. }
            | CoordinationMessage::EndHit { agent, .. }
            | CoordinationMessage::Update { agent, .. } => *agent,
        }
    }

    /// The coordinate the message is about.
    pub fn coord(&self) -> Coord {
        match self {
            CoordinationMessage::BeginHit { coord, .. }
            | CoordinationMessage::EndHit { coord, .. }
            | CoordinationMessage::Update { coord, .. } => *coord,
        }
    }

    /// Whether the message belongs on the lock channel.
    pub fn is_lock_message(&self) -> bool {
        matches!(
            self,
            CoordinationMessage::BeginHit { .. } | CoordinationMessage::EndHit { .. }
        )
    }
}

impl std::fmt::Display for CoordinationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinationMessage::BeginHit { agent, coord } => {
                write!(f, "begin hit by agent {} at {}", agent, coord)
            }
            CoordinationMessage::EndHit { agent, coord } => {
                write!(f, "end hit by agent {} at {}", agent, coord)
            }
            CoordinationMessage::Update {
                agent,
                coord,
                health,
            } => write!(f, "update by agent {} at {}: health {}", agent, coord, health),
        }
    }
}
