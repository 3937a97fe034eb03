// ABOUTME: Mirror holds shared by the agents' mailboxes and both coordinators.
// ABOUTME: Orders each mirrored hit as begin, then update, then end.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::agent::AgentId;
use crate::grid::Coord;

type HitKey = (AgentId, Coord);

/// Hits are numbered per agent and coordinate, from 1, in the order the agent
/// began them.
type Generation = u64;

#[derive(Debug, Default)]
struct HoldState {
    /// Hits begun by the agent, whether or not the coordinator has seen them.
    begun: HashMap<HitKey, Generation>,
    /// Begin envelopes processed by the lock-sync coordinator.
    processed: HashMap<HitKey, Generation>,
    /// The hit whose mirror lock is currently held.
    open: HashMap<HitKey, Generation>,
    /// Updates sent and not yet written, per hit.
    pending: HashMap<(HitKey, Generation), usize>,
    lock_sync_stopped: bool,
    updates_stopped: bool,
}

impl HoldState {
    /// The oldest hit at `key` with an update still to write.
    fn oldest_pending(&self, key: HitKey) -> Option<Generation> {
        self.pending
            .keys()
            .filter(|(k, _)| *k == key)
            .map(|(_, generation)| *generation)
            .min()
    }
}

/// Bookkeeping of the mirror locks the lock-sync coordinator holds.
///
/// The update coordinator writes through the hold its hit's begin envelope
/// opened instead of taking the mirror lock itself, and the lock-sync
/// coordinator releases a hold only once every update sent for that hit has
/// been written.
#[derive(Debug, Default)]
pub struct MirrorHolds {
    state: Mutex<HoldState>,
    changed: Notify,
}

impl MirrorHolds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a hold for `agent` at `coord` is open.
    pub fn is_open(&self, agent: AgentId, coord: Coord) -> bool {
        self.state.lock().open.contains_key(&(agent, coord))
    }

    /// Number of open holds.
    pub fn open_count(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Updates sent by `agent` at `coord` and not yet written.
    pub fn pending(&self, agent: AgentId, coord: Coord) -> usize {
        self.state
            .lock()
            .pending
            .iter()
            .filter(|((key, _), _)| *key == (agent, coord))
            .map(|(_, count)| count)
            .sum()
    }

    /// Record that `agent` is beginning a new hit at `coord`.
    pub(crate) fn begin(&self, agent: AgentId, coord: Coord) {
        *self.state.lock().begun.entry((agent, coord)).or_insert(0) += 1;
    }

    /// Record that an update for the hit in progress is about to be sent.
    pub(crate) fn expect_update(&self, agent: AgentId, coord: Coord) {
        let mut state = self.state.lock();
        let generation = state.begun.get(&(agent, coord)).copied().unwrap_or(0);
        *state
            .pending
            .entry(((agent, coord), generation))
            .or_insert(0) += 1;
    }

    /// Mark the oldest expected update at `coord` as written, or as never sent.
    pub(crate) fn settle_update(&self, agent: AgentId, coord: Coord) {
        {
            let mut state = self.state.lock();
            if let Some(generation) = state.oldest_pending((agent, coord)) {
                let entry = ((agent, coord), generation);
                if let Some(count) = state.pending.get_mut(&entry) {
                    *count -= 1;
                    if *count == 0 {
                        state.pending.remove(&entry);
                    }
                }
            }
        }
        self.changed.notify_waiters();
    }

    /// Register a hold the lock-sync coordinator has just acquired for the
    /// next hit at `coord`.
    pub(crate) fn open(&self, agent: AgentId, coord: Coord) {
        {
            let mut state = self.state.lock();
            let processed = state.processed.entry((agent, coord)).or_insert(0);
            *processed += 1;
            let generation = *processed;
            state.open.insert((agent, coord), generation);
        }
        self.changed.notify_waiters();
    }

    /// Remove the hold and run `release` while no update can be written
    /// through it. Returns `None` if no hold was open.
    pub(crate) fn close<T>(
        &self,
        agent: AgentId,
        coord: Coord,
        release: impl FnOnce() -> T,
    ) -> Option<T> {
        let mut state = self.state.lock();
        state.open.remove(&(agent, coord)).map(|_| release())
    }

    /// Remove every open hold, running `release` for each.
    pub(crate) fn close_all(&self, mut release: impl FnMut(AgentId, Coord)) {
        let mut state = self.state.lock();
        for ((agent, coord), _) in state.open.drain() {
            release(agent, coord);
        }
    }

    /// Run `write` under the hold of the hit the oldest pending update at
    /// `coord` belongs to. Returns `None` if that hold is not open.
    pub(crate) fn with_open<T>(
        &self,
        agent: AgentId,
        coord: Coord,
        write: impl FnOnce() -> T,
    ) -> Option<T> {
        let state = self.state.lock();
        let open = state.open.get(&(agent, coord)).copied()?;
        match state.oldest_pending((agent, coord)) {
            Some(generation) if generation != open => None,
            _ => Some(write()),
        }
    }

    /// Wait until the hold for the oldest pending update at `coord` is open.
    /// Returns `false` if the lock-sync coordinator stopped first.
    pub(crate) async fn opened(&self, agent: AgentId, coord: Coord) -> bool {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.state.lock();
                if let Some(&open) = state.open.get(&(agent, coord)) {
                    match state.oldest_pending((agent, coord)) {
                        Some(generation) if generation != open => {}
                        _ => return true,
                    }
                }
                if state.lock_sync_stopped {
                    return false;
                }
            }
            notified.await;
        }
    }

    /// Wait until every update sent for the open hit at `coord` has been
    /// written, or the update coordinator stopped.
    pub(crate) async fn drained(&self, agent: AgentId, coord: Coord) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.state.lock();
                let Some(&open) = state.open.get(&(agent, coord)) else {
                    return;
                };
                if state.updates_stopped || !state.pending.contains_key(&((agent, coord), open)) {
                    return;
                }
            }
            notified.await;
        }
    }

    pub(crate) fn lock_sync_stopped(&self) {
        self.state.lock().lock_sync_stopped = true;
        self.changed.notify_waiters();
    }

    pub(crate) fn updates_stopped(&self) {
        self.state.lock().updates_stopped = true;
        self.changed.notify_waiters();
    }
}
