// ABOUTME: The lock-sync and update coordinators for mirrored grids.
// ABOUTME: Each drains one channel; together they mirror a hit as begin, update, end.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::channel::Inbox;
use super::holds::MirrorHolds;
use super::message::CoordinationMessage;
use crate::agent::AgentId;
use crate::error::{CoordinationError, SiegeError};
use crate::grid::{Coord, MirroredGrids, Resource};
use crate::observe::{Observer, SharedObserver, SiegeEvent};
use crate::sync::{Priority, PriorityLock};

/// Messages handled by the coordinators over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinationStats {
    pub begins: usize,
    pub ends: usize,
    pub updates: usize,
}

/// Handles of the two running coordinator tasks.
pub struct Coordinators {
    lock_sync: JoinHandle<Result<(usize, usize), CoordinationError>>,
    updates: JoinHandle<Result<usize, CoordinationError>>,
}

impl Coordinators {
    /// Start both coordinators. They run until their channel closes.
    pub fn spawn(inbox: Inbox, grids: Arc<MirroredGrids>, observer: SharedObserver) -> Self {
        let Inbox {
            locks,
            updates,
            holds,
        } = inbox;

        let lock_sync = {
            let grids = grids.clone();
            let observer = observer.clone();
            let holds = holds.clone();
            tokio::spawn(async move { sync_locks(locks, &grids, &holds, observer.as_ref()).await })
        };
        let updates = tokio::spawn(async move {
            apply_updates(updates, &grids, &holds, observer.as_ref()).await
        });

        Self { lock_sync, updates }
    }

    /// Wait for both coordinators to drain their channels and stop.
    ///
    /// Only returns once every sender is gone, so call it after the agents
    /// have been joined.
    pub async fn join(self) -> Result<CoordinationStats, SiegeError> {
        let (lock_sync, updates) = tokio::join!(self.lock_sync, self.updates);
        let (begins, ends) = lock_sync??;
        let updates = updates??;

        Ok(CoordinationStats {
            begins,
            ends,
            updates,
        })
    }
}

/// Drain the lock channel.
///
/// A begin envelope from agent A takes the Elevated class of the mirror
/// block's priority lock on A's behalf and opens the hold in `holds`. The
/// matching end envelope waits until every update A sent for that hit has been
/// written through the hold, then releases it. Returns the number of begins
/// and ends processed.
///
/// If anything goes wrong, every hold still open is released before the
/// error is returned, so a protocol fault cannot leave mirror blocks locked.
pub async fn sync_locks(
    mut locks: mpsc::Receiver<CoordinationMessage>,
    grids: &MirroredGrids,
    holds: &MirrorHolds,
    observer: &dyn Observer,
) -> Result<(usize, usize), CoordinationError> {
    let mut begins = 0;
    let mut ends = 0;

    let result: Result<(), CoordinationError> = async {
        while let Some(message) = locks.recv().await {
            let (agent, coord) = (message.agent(), message.coord());
            match message {
                CoordinationMessage::BeginHit { .. } => {
                    if holds.is_open(agent, coord) {
                        return Err(CoordinationError::DuplicateBegin { agent, coord });
                    }
                    mirror_lock(grids, agent, coord)?
                        .lock(Priority::Elevated)
                        .await?;
                    observer.emit(SiegeEvent::MirrorLocked { agent, coord });
                    holds.open(agent, coord);
                    begins += 1;
                }
                CoordinationMessage::EndHit { .. } => {
                    if !holds.is_open(agent, coord) {
                        return Err(CoordinationError::UnmatchedEnd { agent, coord });
                    }
                    holds.drained(agent, coord).await;

                    let lock = mirror_lock(grids, agent, coord)?;
                    holds
                        .close(agent, coord, || lock.unlock(Priority::Elevated))
                        .ok_or(CoordinationError::UnmatchedEnd { agent, coord })??;
                    ends += 1;
                    observer.emit(SiegeEvent::MirrorUnlocked { agent, coord });
                }
                other => {
                    return Err(CoordinationError::UnexpectedMessage {
                        coordinator: "lock-sync",
                        message: other.to_string(),
                    });
                }
            }
        }

        match holds.open_count() {
            0 => Ok(()),
            count => Err(CoordinationError::DanglingHits { count }),
        }
    }
    .await;

    holds.close_all(|agent, coord| {
        if let Ok(lock) = mirror_lock(grids, agent, coord) {
            let _ = lock.unlock(Priority::Elevated);
        }
    });
    holds.lock_sync_stopped();

    result.map(|()| (begins, ends))
}

/// Drain the update channel.
///
/// Each update waits for the hold its begin envelope opened, then records the
/// reported health on the mirror block through that hold. Returns the number
/// of updates applied.
pub async fn apply_updates(
    mut updates: mpsc::Receiver<CoordinationMessage>,
    grids: &MirroredGrids,
    holds: &MirrorHolds,
    observer: &dyn Observer,
) -> Result<usize, CoordinationError> {
    let result: Result<usize, CoordinationError> = async {
        let mut applied = 0;

        while let Some(message) = updates.recv().await {
            let CoordinationMessage::Update {
                agent,
                coord,
                health,
            } = message
            else {
                return Err(CoordinationError::UnexpectedMessage {
                    coordinator: "update",
                    message: message.to_string(),
                });
            };

            let block = mirror_block(grids, agent, coord)?;
            if block.priority_lock().is_none() {
                return Err(CoordinationError::NotMirrored { id: block.id() });
            }

            if !holds.opened(agent, coord).await {
                return Err(CoordinationError::UpdateOutsideHit { agent, coord });
            }

            holds
                .with_open(agent, coord, || {
                    let recorded = block.enter_held(Priority::Elevated)?.record_mirrored(health);
                    observer.emit(SiegeEvent::MirrorUpdated {
                        agent,
                        coord,
                        health: recorded,
                    });
                    Ok::<_, CoordinationError>(())
                })
                .ok_or(CoordinationError::UpdateOutsideHit { agent, coord })??;
            holds.settle_update(agent, coord);
            applied += 1;
        }

        Ok(applied)
    }
    .await;

    holds.updates_stopped();
    result
}

fn mirror_block(
    grids: &MirroredGrids,
    agent: AgentId,
    coord: Coord,
) -> Result<&Resource, CoordinationError> {
    grids
        .mirror_for(agent)
        .get(coord)
        .ok_or(CoordinationError::UnknownCoordinate { coord })
}

fn mirror_lock(
    grids: &MirroredGrids,
    agent: AgentId,
    coord: Coord,
) -> Result<&PriorityLock, CoordinationError> {
    let block = mirror_block(grids, agent, coord)?;
    block
        .priority_lock()
        .ok_or(CoordinationError::NotMirrored { id: block.id() })
}
