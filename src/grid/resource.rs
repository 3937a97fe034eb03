// ABOUTME: A destructible block: health counter, fixed hit latency and a guard.
// ABOUTME: One Resource type serves every strategy; the guard variant differs.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, Semaphore, SemaphorePermit};

use super::Coord;
use crate::agent::Agent;
use crate::error::{Holder, LockError};
use crate::observe::{Observer, SiegeEvent};
use crate::sync::{Priority, PriorityGuard, PriorityLock};

/// Health every block starts with.
pub const MAX_HEALTH: i32 = 100;

/// How long a strike takes, chosen once per block by the parity of its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitLatency {
    /// Latency of blocks with an even id.
    pub even: Duration,
    /// Latency of blocks with an odd id.
    pub odd: Duration,
}

impl Default for HitLatency {
    fn default() -> Self {
        Self {
            even: Duration::from_millis(500),
            odd: Duration::from_millis(125),
        }
    }
}

impl HitLatency {
    /// The same latency for every block.
    pub fn uniform(latency: Duration) -> Self {
        Self {
            even: latency,
            odd: latency,
        }
    }

    /// No latency at all.
    pub fn zero() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Latency for the block with the given id.
    pub fn for_block(&self, id: usize) -> Duration {
        if id % 2 == 0 { self.even } else { self.odd }
    }
}

/// Which mechanism guards a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// A plain mutex.
    Exclusive,
    /// A counting semaphore with a single token.
    Token,
    /// A two-class [`PriorityLock`]; required for mirrored grids.
    Priority,
}

/// The guard instance owned by a block.
enum Guard {
    Exclusive(Mutex<()>),
    Token(Semaphore),
    Priority(PriorityLock),
}

impl Guard {
    /// Build a fresh, released guard of the given kind.
    fn new(kind: GuardKind) -> Self {
        match kind {
            GuardKind::Exclusive => Guard::Exclusive(Mutex::new(())),
            GuardKind::Token => Guard::Token(Semaphore::new(1)),
            GuardKind::Priority => Guard::Priority(PriorityLock::new()),
        }
    }

    /// The kind of this guard.
    fn kind(&self) -> GuardKind {
        match self {
            Guard::Exclusive(_) => GuardKind::Exclusive,
            Guard::Token(_) => GuardKind::Token,
            Guard::Priority(_) => GuardKind::Priority,
        }
    }

    /// Acquire the guard. `class` only matters for priority locks.
    async fn acquire(&self, class: Priority) -> Result<Held<'_>, LockError> {
        match self {
            Guard::Exclusive(mutex) => Ok(Held::Exclusive(mutex.lock().await)),
            Guard::Token(tokens) => tokens
                .acquire()
                .await
                .map(Held::Token)
                .map_err(|_| LockError::Closed),
            Guard::Priority(lock) => Ok(Held::Priority(lock.guard(class).await?)),
        }
    }
}

/// Proof that a guard is held. Releases it on drop.
// Variants are kept only for their Drop.
#[allow(dead_code)]
enum Held<'a> {
    Exclusive(MutexGuard<'a, ()>),
    Token(SemaphorePermit<'a>),
    Priority(PriorityGuard<'a>),
    /// A hold taken elsewhere with [`PriorityLock::lock`]; not released on drop.
    Borrowed,
}

/// What a strike did to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The block was already at zero health.
    Depleted,
    /// Damage was applied.
    Applied {
        /// Health after the strike, clamped at zero.
        health: i32,
        /// This strike brought the block to zero and scored.
        destroyed: bool,
    },
}

impl HitOutcome {
    /// Whether the strike changed the block.
    pub fn is_applied(&self) -> bool {
        matches!(self, HitOutcome::Applied { .. })
    }
}

/// One destructible cell of a grid.
pub struct Resource {
    id: usize,
    coord: Coord,
    health: AtomicI32,
    hit_latency: Duration,
    guard: Guard,
}

impl Resource {
    /// Create a block at full health.
    pub fn new(id: usize, coord: Coord, latency: HitLatency, kind: GuardKind) -> Self {
        Self {
            id,
            coord,
            health: AtomicI32::new(MAX_HEALTH),
            hit_latency: latency.for_block(id),
            guard: Guard::new(kind),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn hit_latency(&self) -> Duration {
        self.hit_latency
    }

    pub fn guard_kind(&self) -> GuardKind {
        self.guard.kind()
    }

    /// Current health, read without taking the guard.
    ///
    /// Only meaningful once no task can be striking the block, e.g. for the
    /// final report.
    pub fn health(&self) -> i32 {
        self.health.load(Ordering::SeqCst)
    }

    /// The priority lock guarding this block, if it has one.
    pub fn priority_lock(&self) -> Option<&PriorityLock> {
        match &self.guard {
            Guard::Priority(lock) => Some(lock),
            _ => None,
        }
    }

    /// Take the guard and return a handle that may read and write health.
    pub async fn enter(&self, class: Priority) -> Result<Critical<'_>, LockError> {
        let held = self.guard.acquire(class).await?;
        Ok(Critical {
            resource: self,
            _held: held,
        })
    }

    /// Access health under a priority-lock hold some other call already owns.
    ///
    /// Fails with `LockError::NotHeld` unless `class` currently holds the
    /// block's lock. The returned handle does not release the hold.
    pub fn enter_held(&self, class: Priority) -> Result<Critical<'_>, LockError> {
        let holder = match self.priority_lock() {
            Some(lock) => lock.holder(),
            None => Holder::Nobody,
        };
        if holder != Holder::Class(class) {
            return Err(LockError::NotHeld {
                requested: class,
                holder,
            });
        }
        Ok(Critical {
            resource: self,
            _held: Held::Borrowed,
        })
    }

    /// Strike the block on behalf of `agent`.
    ///
    /// The guard is held for the whole strike, including the latency sleep, so
    /// a second striker on the same block waits its turn. A strike that brings
    /// health to zero awards the agent exactly one point; later strikes find
    /// the block depleted and do nothing.
    pub async fn hit(
        &self,
        agent: &mut Agent,
        observer: &dyn Observer,
    ) -> Result<HitOutcome, LockError> {
        let mut critical = self.enter(Priority::Normal).await?;

        observer.emit(SiegeEvent::HitAttempted {
            agent: agent.id(),
            block: self.id,
            coord: self.coord,
        });

        if critical.health() <= 0 {
            observer.emit(SiegeEvent::HitRejected {
                agent: agent.id(),
                block: self.id,
            });
            return Ok(HitOutcome::Depleted);
        }

        tokio::time::sleep(self.hit_latency).await;

        let health = critical.apply_damage(agent.power());
        observer.emit(SiegeEvent::HitApplied {
            agent: agent.id(),
            block: self.id,
            health,
        });

        let destroyed = health == 0;
        if destroyed {
            agent.award_point();
            observer.emit(SiegeEvent::BlockDestroyed {
                agent: agent.id(),
                block: self.id,
            });
        }

        Ok(HitOutcome::Applied { health, destroyed })
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("coord", &self.coord)
            .field("health", &self.health())
            .field("hit_latency", &self.hit_latency)
            .field("guard", &self.guard.kind())
            .finish()
    }
}

/// Exclusive access to a block's health while its guard is held.
pub struct Critical<'a> {
    resource: &'a Resource,
    _held: Held<'a>,
}

impl Critical<'_> {
    pub fn health(&self) -> i32 {
        self.resource.health.load(Ordering::SeqCst)
    }

    /// Subtract `power`, clamping at zero. Returns the new health.
    pub fn apply_damage(&mut self, power: u32) -> i32 {
        let power = i32::try_from(power).unwrap_or(i32::MAX);
        let health = self.health().saturating_sub(power).max(0);
        self.resource.health.store(health, Ordering::SeqCst);
        health
    }

    /// Record a health value observed on the mirror block.
    ///
    /// Health never rises: the lower of the current and reported values wins.
    pub fn record_mirrored(&mut self, reported: i32) -> i32 {
        let health = self.health().min(reported.clamp(0, MAX_HEALTH));
        self.resource.health.store(health, Ordering::SeqCst);
        health
    }
}
