// ABOUTME: The two coordination channels: agents send through a Mailbox,
// ABOUTME: coordinators drain the matching Inbox.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::holds::MirrorHolds;
use super::message::CoordinationMessage;
use crate::agent::AgentId;
use crate::error::CoordinationError;
use crate::grid::Coord;

/// Channel capacity: one slot per concurrent producer.
///
/// Each agent has at most one message in flight per channel, so a
/// coordinator parked on a contended mirror lock never stalls a sender.
pub const COORDINATION_CAPACITY: usize = AgentId::ALL.len();

const LOCK_CHANNEL: &str = "lock";
const UPDATE_CHANNEL: &str = "update";

/// Create the lock and update channels.
pub fn channels(capacity: usize) -> (Mailbox, Inbox) {
    let (locks_tx, locks_rx) = mpsc::channel(capacity);
    let (updates_tx, updates_rx) = mpsc::channel(capacity);
    let holds = Arc::new(MirrorHolds::new());

    (
        Mailbox {
            locks: locks_tx,
            updates: updates_tx,
            holds: holds.clone(),
        },
        Inbox {
            locks: locks_rx,
            updates: updates_rx,
            holds,
        },
    )
}

/// Sending side of both channels. Cloned into each agent task.
///
/// The channels close when the last `Mailbox` is dropped, so a runner that
/// hands every clone to an agent closes them exactly when the last agent
/// finishes.
#[derive(Debug, Clone)]
pub struct Mailbox {
    locks: mpsc::Sender<CoordinationMessage>,
    updates: mpsc::Sender<CoordinationMessage>,
    holds: Arc<MirrorHolds>,
}

impl Mailbox {
    /// Announce that `agent` is about to strike `coord`.
    ///
    /// The returned [`OpenHit`] must be finished once the strike is over; if
    /// it is dropped instead, it still tries to send the end envelope.
    pub async fn begin_hit(
        &self,
        agent: AgentId,
        coord: Coord,
    ) -> Result<OpenHit<'_>, CoordinationError> {
        self.holds.begin(agent, coord);
        self.send_lock(CoordinationMessage::BeginHit { agent, coord })
            .await?;

        Ok(OpenHit {
            mailbox: self,
            agent,
            coord,
            finished: false,
        })
    }

    /// Report the health `agent`'s strike left at `coord`.
    ///
    /// The update is counted as pending before it is queued, so the end
    /// envelope that follows is not processed until it has been written.
    pub async fn update(
        &self,
        agent: AgentId,
        coord: Coord,
        health: i32,
    ) -> Result<(), CoordinationError> {
        self.holds.expect_update(agent, coord);
        let sent = self
            .updates
            .send(CoordinationMessage::Update {
                agent,
                coord,
                health,
            })
            .await;

        if sent.is_err() {
            self.holds.settle_update(agent, coord);
            return Err(CoordinationError::ChannelClosed {
                agent,
                channel: UPDATE_CHANNEL,
            });
        }
        Ok(())
    }

    async fn send_lock(&self, message: CoordinationMessage) -> Result<(), CoordinationError> {
        let agent = message.agent();
        self.locks
            .send(message)
            .await
            .map_err(|_| CoordinationError::ChannelClosed {
                agent,
                channel: LOCK_CHANNEL,
            })
    }
}

/// A mirrored hit whose begin envelope was sent.
pub struct OpenHit<'a> {
    mailbox: &'a Mailbox,
    agent: AgentId,
    coord: Coord,
    finished: bool,
}

impl OpenHit<'_> {
    /// Send the end envelope.
    pub async fn finish(mut self) -> Result<(), CoordinationError> {
        let result = self
            .mailbox
            .send_lock(CoordinationMessage::EndHit {
                agent: self.agent,
                coord: self.coord,
            })
            .await;
        self.finished = true;
        result
    }
}

impl Drop for OpenHit<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Unwound without finishing. If this cannot be queued the lock-sync
        // coordinator reports the hold as dangling.
        let _ = self.mailbox.locks.try_send(CoordinationMessage::EndHit {
            agent: self.agent,
            coord: self.coord,
        });
    }
}

/// Receiving side of both channels, consumed by the coordinators.
#[derive(Debug)]
pub struct Inbox {
    pub(crate) locks: mpsc::Receiver<CoordinationMessage>,
    pub(crate) updates: mpsc::Receiver<CoordinationMessage>,
    pub(crate) holds: Arc<MirrorHolds>,
}

impl Inbox {
    /// Hold bookkeeping shared with the mailboxes.
    pub fn holds(&self) -> &Arc<MirrorHolds> {
        &self.holds
    }

    /// Close both channels to further sends.
    ///
    /// Messages already queued can still be received. Any agent that sends
    /// afterwards gets [`CoordinationError::ChannelClosed`]: closing while an
    /// agent is still running is a fault, never a clean shutdown.
    pub fn close(&mut self) {
        self.locks.close();
        self.updates.close();
    }
}
