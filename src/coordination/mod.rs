// ABOUTME: Message-routed coordination between two independently owned grids.
// ABOUTME: Contains the envelope type, the channels and the coordinator tasks.

mod channel;
mod coordinator;
mod holds;
mod message;

pub use channel::{COORDINATION_CAPACITY, Inbox, Mailbox, OpenHit, channels};
pub use coordinator::{CoordinationStats, Coordinators, apply_updates, sync_locks};
pub use holds::MirrorHolds;
pub use message::CoordinationMessage;
