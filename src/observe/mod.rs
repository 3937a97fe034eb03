// ABOUTME: Observer capability passed into every component instead of a global logger.
// ABOUTME: Provides the event type, the trait, and no-op, tracing and recording observers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::agent::AgentId;
use crate::grid::Coord;
use crate::runner::Strategy;

/// Events emitted while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiegeEvent {
    /// A strategy run is starting.
    RunStarted { strategy: Strategy },

    /// A strategy run finished; `elapsed` covers the agent phase.
    RunFinished { strategy: Strategy, elapsed: Duration },

    /// An agent took a block's guard and is about to strike it.
    HitAttempted {
        agent: AgentId,
        block: usize,
        coord: Coord,
    },

    /// The strike landed and the block has `health` left.
    HitApplied {
        agent: AgentId,
        block: usize,
        health: i32,
    },

    /// The block was already at zero health; nothing happened.
    HitRejected { agent: AgentId, block: usize },

    /// The strike destroyed the block and scored a point.
    BlockDestroyed { agent: AgentId, block: usize },

    /// The lock-sync coordinator took the mirror lock for `agent`'s hit.
    MirrorLocked { agent: AgentId, coord: Coord },

    /// The lock-sync coordinator released the mirror lock for `agent`'s hit.
    MirrorUnlocked { agent: AgentId, coord: Coord },

    /// The update coordinator recorded `health` on the mirror block.
    MirrorUpdated {
        agent: AgentId,
        coord: Coord,
        health: i32,
    },

    /// An agent replayed its whole sequence.
    AgentFinished { agent: AgentId, score: u32 },
}

/// Receives [`SiegeEvent`]s.
///
/// Observers are called synchronously, sometimes from inside a critical
/// section, so implementations must not block.
pub trait Observer: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &SiegeEvent);

    /// Optional: Filter which events this observer cares about.
    /// Default returns true for all events.
    fn accepts(&self, event: &SiegeEvent) -> bool {
        let _ = event;
        true
    }

    /// Deliver `event` if [`accepts`](Self::accepts) allows it.
    fn emit(&self, event: SiegeEvent) {
        if self.accepts(&event) {
            self.on_event(&event);
        }
    }
}

/// Shared observer handle passed between tasks.
pub type SharedObserver = Arc<dyn Observer>;

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &SiegeEvent) {}

    fn accepts(&self, _event: &SiegeEvent) -> bool {
        false
    }
}

/// Forwards events to `tracing`. Per-hit events are logged at debug level,
/// run and agent milestones at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &SiegeEvent) {
        match event {
            SiegeEvent::RunStarted { strategy } => {
                tracing::info!(%strategy, "run started");
            }
            SiegeEvent::RunFinished { strategy, elapsed } => {
                tracing::info!(%strategy, ?elapsed, "run finished");
            }
            SiegeEvent::HitAttempted { agent, block, coord } => {
                tracing::debug!(%agent, block, %coord, "agent strikes block");
            }
            SiegeEvent::HitApplied {
                agent,
                block,
                health,
            } => {
                tracing::debug!(%agent, block, health, "strike landed");
            }
            SiegeEvent::HitRejected { agent, block } => {
                tracing::debug!(%agent, block, "block already destroyed");
            }
            SiegeEvent::BlockDestroyed { agent, block } => {
                tracing::info!(%agent, block, "agent destroyed block");
            }
            SiegeEvent::MirrorLocked { agent, coord } => {
                tracing::trace!(%agent, %coord, "mirror locked");
            }
            SiegeEvent::MirrorUnlocked { agent, coord } => {
                tracing::trace!(%agent, %coord, "mirror unlocked");
            }
            SiegeEvent::MirrorUpdated {
                agent,
                coord,
                health,
            } => {
                tracing::debug!(%agent, %coord, health, "mirror updated");
            }
            SiegeEvent::AgentFinished { agent, score } => {
                tracing::info!(%agent, score, "agent finished");
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SiegeEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events seen so far.
    pub fn events(&self) -> Vec<SiegeEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SiegeEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &SiegeEvent) {
        self.events.lock().push(event.clone());
    }
}
