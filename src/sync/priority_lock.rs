// ABOUTME: Two-class mutual exclusion: Normal and Elevated callers each pass a
// ABOUTME: capacity-1 admission slot, then contend for one shared exclusive lock.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::Semaphore;

use crate::error::{Holder, LockError};

/// Admission class of a priority-lock caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Ordinary callers, e.g. an agent striking its own grid.
    Normal,
    /// Coordination callers acting on behalf of another owner.
    Elevated,
}

impl Priority {
    fn code(self) -> u8 {
        match self {
            Priority::Normal => HELD_NORMAL,
            Priority::Elevated => HELD_ELEVATED,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Normal => write!(f, "normal"),
            Priority::Elevated => write!(f, "elevated"),
        }
    }
}

const HELD_NONE: u8 = 0;
const HELD_NORMAL: u8 = 1;
const HELD_ELEVATED: u8 = 2;

/// Mutual exclusion with two independently admitted caller classes.
///
/// Each class may have at most one outstanding acquisition request: a caller
/// first claims its class's single admission slot, then waits on the shared
/// exclusive lock. An Elevated caller therefore never queues behind more than
/// one Normal caller, however many Normal callers are waiting, because the
/// others are parked on the Normal slot rather than on the exclusive lock.
///
/// Acquisition is fair: tokio's semaphore hands out permits in request order.
///
/// `lock`/`unlock` are separate calls so a hold can span two messages (see the
/// lock-sync coordinator). Owners that acquire and release in one scope use
/// [`PriorityLock::guard`] instead.
pub struct PriorityLock {
    normal: Semaphore,
    elevated: Semaphore,
    exclusive: Semaphore,
    holder: AtomicU8,
}

impl Default for PriorityLock {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityLock {
    /// Create an unlocked priority lock.
    pub fn new() -> Self {
        Self {
            normal: Semaphore::new(1),
            elevated: Semaphore::new(1),
            exclusive: Semaphore::new(1),
            holder: AtomicU8::new(HELD_NONE),
        }
    }

    fn slot(&self, class: Priority) -> &Semaphore {
        match class {
            Priority::Normal => &self.normal,
            Priority::Elevated => &self.elevated,
        }
    }

    /// Block until the lock is held by `class`.
    ///
    /// Cancel safe: if the future is dropped before both the admission slot and
    /// the exclusive lock are obtained, whatever was claimed is returned.
    pub async fn lock(&self, class: Priority) -> Result<(), LockError> {
        let slot = self
            .slot(class)
            .acquire()
            .await
            .map_err(|_| LockError::Closed)?;
        let exclusive = self
            .exclusive
            .acquire()
            .await
            .map_err(|_| LockError::Closed)?;

        slot.forget();
        exclusive.forget();
        self.holder.store(class.code(), Ordering::SeqCst);
        Ok(())
    }

    /// Try to take the lock for `class` without waiting.
    ///
    /// When the admission slot is claimed but the exclusive lock is busy, the
    /// slot is put back before returning `false`, for either class.
    pub fn try_lock(&self, class: Priority) -> bool {
        let Ok(slot) = self.slot(class).try_acquire() else {
            return false;
        };

        match self.exclusive.try_acquire() {
            Ok(exclusive) => {
                slot.forget();
                exclusive.forget();
                self.holder.store(class.code(), Ordering::SeqCst);
                true
            }
            // Dropping the slot permit restores it.
            Err(_) => false,
        }
    }

    /// Release a hold taken with [`lock`](Self::lock) or [`try_lock`](Self::try_lock).
    ///
    /// Returns `LockError::NotHeld` if `class` is not the current holder; the
    /// lock is left untouched in that case.
    pub fn unlock(&self, class: Priority) -> Result<(), LockError> {
        self.holder
            .compare_exchange(class.code(), HELD_NONE, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|current| LockError::NotHeld {
                requested: class,
                holder: decode(current),
            })?;

        self.exclusive.add_permits(1);
        self.slot(class).add_permits(1);
        Ok(())
    }

    /// Acquire the lock for `class`, releasing it when the guard drops.
    pub async fn guard(&self, class: Priority) -> Result<PriorityGuard<'_>, LockError> {
        self.lock(class).await?;
        Ok(PriorityGuard { lock: self, class })
    }

    /// The class currently holding the lock, if any.
    pub fn holder(&self) -> Holder {
        decode(self.holder.load(Ordering::SeqCst))
    }

    /// Whether any class currently holds the exclusive lock.
    pub fn is_locked(&self) -> bool {
        self.exclusive.available_permits() == 0
    }
}

fn decode(code: u8) -> Holder {
    match code {
        HELD_NORMAL => Holder::Class(Priority::Normal),
        HELD_ELEVATED => Holder::Class(Priority::Elevated),
        _ => Holder::Nobody,
    }
}

/// Scoped hold on a [`PriorityLock`]; unlocks on drop.
pub struct PriorityGuard<'a> {
    lock: &'a PriorityLock,
    class: Priority,
}

impl PriorityGuard<'_> {
    /// The class this guard holds the lock for.
    pub fn class(&self) -> Priority {
        self.class
    }
}

impl Drop for PriorityGuard<'_> {
    fn drop(&mut self) {
        // A guard is only built after a successful lock, so the holder matches.
        let _ = self.lock.unlock(self.class);
    }
}
