// ABOUTME: Defines all error types for the siege library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under SiegeError.

use std::path::PathBuf;

use crate::agent::AgentId;
use crate::grid::Coord;
use crate::sync::Priority;

/// Top-level error type for the siege library.
#[derive(Debug, thiserror::Error)]
pub enum SiegeError {
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Coordination error: {0}")]
    Coordination(#[from] CoordinationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors from loading and validating attack sequences.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("failed to read sequence file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed sequence file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("agent {agent} coordinate #{index} {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        agent: AgentId,
        index: usize,
        coord: Coord,
        width: usize,
        height: usize,
    },

    #[error("agent {agent} has {actual} coordinates, {expected} required")]
    TooShort {
        agent: AgentId,
        expected: usize,
        actual: usize,
    },

    #[error("sequence source failed: {0}")]
    Source(#[source] anyhow::Error),
}

/// Errors from guard and priority-lock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The class being released does not hold the lock.
    #[error("{requested} unlock while the lock is held by {holder}")]
    NotHeld { requested: Priority, holder: Holder },

    /// The underlying semaphore was closed.
    #[error("lock closed")]
    Closed,
}

/// Who currently holds a priority lock, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holder {
    Nobody,
    Class(Priority),
}

impl std::fmt::Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Holder::Nobody => write!(f, "nobody"),
            Holder::Class(priority) => write!(f, "{}", priority),
        }
    }
}

/// Errors from the message-routed coordination between mirrored grids.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("{channel} channel closed while agent {agent} was still sending")]
    ChannelClosed {
        agent: AgentId,
        channel: &'static str,
    },

    #[error("{coordinator} coordinator received a message it does not route: {message}")]
    UnexpectedMessage {
        coordinator: &'static str,
        message: String,
    },

    #[error("agent {agent} began a hit at {coord} that is already open")]
    DuplicateBegin { agent: AgentId, coord: Coord },

    #[error("agent {agent} ended a hit at {coord} that was never begun")]
    UnmatchedEnd { agent: AgentId, coord: Coord },

    #[error("update from agent {agent} at {coord} arrived outside an open hit")]
    UpdateOutsideHit { agent: AgentId, coord: Coord },

    #[error("{count} mirrored hit(s) still open when the lock channel closed")]
    DanglingHits { count: usize },

    #[error("no mirror resource at {coord}")]
    UnknownCoordinate { coord: Coord },

    #[error("resource {id} is not guarded by a priority lock")]
    NotMirrored { id: usize },

    #[error("mirror lock failed: {0}")]
    Lock(#[from] LockError),
}

/// Errors from building or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Parse { key: String, value: String },

    #[error("unknown strategy '{0}' (expected exclusive-lock, token-lock, message-passing or all)")]
    UnknownStrategy(String),

    #[error("{0}")]
    Invalid(String),
}
