// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use siege::prelude::*;` to get started quickly.

pub use crate::agent::{Agent, AgentId, AgentResult, Battlefield};
pub use crate::config::SiegeConfig;
pub use crate::coordination::{
    CoordinationMessage, CoordinationStats, Inbox, Mailbox, MirrorHolds, channels,
};
pub use crate::error::{ConfigError, CoordinationError, LockError, SequenceError, SiegeError};
pub use crate::grid::{
    Coord, Grid, GridSnapshot, GuardKind, HitLatency, HitOutcome, MirroredGrids,
};
pub use crate::observe::{
    NoopObserver, Observer, RecordingObserver, SharedObserver, SiegeEvent, TracingObserver,
};
pub use crate::runner::{RunReport, Runner, Strategy, StrategySelector};
pub use crate::sequence::{AttackPlan, JsonFileSource, SequenceSource, StaticSource};
pub use crate::sync::{Priority, PriorityGuard, PriorityLock};
