// ABOUTME: Tests for the hit operation and guarded access to a block's health.
// ABOUTME: Runs every guard kind through the same damage, scoring and exclusion checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::grid::Coord;
use super::resource::{GuardKind, HitLatency, HitOutcome, MAX_HEALTH, Resource};
use crate::agent::{Agent, AgentId};
use crate::error::{Holder, LockError};
use crate::observe::{NoopObserver, RecordingObserver, SiegeEvent};
use crate::sync::Priority;

const KINDS: [GuardKind; 3] = [GuardKind::Exclusive, GuardKind::Token, GuardKind::Priority];

fn block(kind: GuardKind) -> Resource {
    Resource::new(1, Coord::new(0, 0), HitLatency::zero(), kind)
}

fn agent(id: AgentId, power: u32) -> Agent {
    Agent::new(id, power, Vec::new())
}

#[tokio::test]
async fn test_hit_subtracts_power() {
    for kind in KINDS {
        let block = block(kind);
        let mut striker = agent(AgentId::One, 30);

        let outcome = block.hit(&mut striker, &NoopObserver).await.unwrap();

        assert_eq!(
            outcome,
            HitOutcome::Applied {
                health: 70,
                destroyed: false
            }
        );
        assert_eq!(block.health(), 70);
        assert_eq!(striker.score(), 0);
    }
}

#[tokio::test]
async fn test_destroying_hit_clamps_and_scores_once() {
    for kind in KINDS {
        let block = block(kind);
        let mut striker = agent(AgentId::Two, 30);

        for _ in 0..3 {
            block.hit(&mut striker, &NoopObserver).await.unwrap();
        }
        assert_eq!(block.health(), 10);

        let outcome = block.hit(&mut striker, &NoopObserver).await.unwrap();
        assert_eq!(
            outcome,
            HitOutcome::Applied {
                health: 0,
                destroyed: true
            }
        );
        assert_eq!(striker.score(), 1);

        let outcome = block.hit(&mut striker, &NoopObserver).await.unwrap();
        assert_eq!(outcome, HitOutcome::Depleted);
        assert_eq!(block.health(), 0);
        assert_eq!(striker.score(), 1);
    }
}

#[tokio::test]
async fn test_exact_damage_to_zero_scores() {
    let block = block(GuardKind::Exclusive);
    let mut striker = agent(AgentId::One, 25);

    for _ in 0..4 {
        block.hit(&mut striker, &NoopObserver).await.unwrap();
    }

    assert_eq!(block.health(), 0);
    assert_eq!(striker.score(), 1);
}

#[tokio::test]
async fn test_only_first_destroyer_scores() {
    let block = block(GuardKind::Token);
    let mut first = agent(AgentId::One, 60);
    let mut second = agent(AgentId::Two, 60);

    block.hit(&mut first, &NoopObserver).await.unwrap();
    block.hit(&mut second, &NoopObserver).await.unwrap();
    block.hit(&mut first, &NoopObserver).await.unwrap();

    assert_eq!(first.score(), 0);
    assert_eq!(second.score(), 1);
}

#[tokio::test]
async fn test_guard_serializes_concurrent_hits() {
    for kind in KINDS {
        let block = Arc::new(Resource::new(
            2,
            Coord::new(0, 1),
            HitLatency::uniform(Duration::from_millis(40)),
            kind,
        ));

        let started = Instant::now();
        let tasks: Vec<_> = AgentId::ALL
            .into_iter()
            .map(|id| {
                let block = block.clone();
                tokio::spawn(async move {
                    let mut striker = agent(id, 10);
                    block.hit(&mut striker, &NoopObserver).await.unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(
            started.elapsed() >= Duration::from_millis(80),
            "{:?} guard let two strikes overlap",
            kind
        );
        assert_eq!(block.health(), 80);
    }
}

#[tokio::test]
async fn test_hit_emits_events() {
    let block = block(GuardKind::Exclusive);
    let observer = RecordingObserver::new();
    let mut striker = agent(AgentId::One, 100);

    block.hit(&mut striker, &observer).await.unwrap();
    block.hit(&mut striker, &observer).await.unwrap();

    let events = observer.events();
    assert!(matches!(events[0], SiegeEvent::HitAttempted { block: 1, .. }));
    assert!(matches!(events[1], SiegeEvent::HitApplied { health: 0, .. }));
    assert!(matches!(events[2], SiegeEvent::BlockDestroyed { .. }));
    assert!(matches!(events[3], SiegeEvent::HitAttempted { .. }));
    assert!(matches!(events[4], SiegeEvent::HitRejected { .. }));
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn test_record_mirrored_never_raises_health() {
    let block = block(GuardKind::Priority);
    {
        let mut critical = block.enter(Priority::Elevated).await.unwrap();
        assert_eq!(critical.record_mirrored(40), 40);
        assert_eq!(critical.record_mirrored(70), 40);
        assert_eq!(critical.record_mirrored(-5), 0);
    }
    assert_eq!(block.health(), 0);
}

#[tokio::test]
async fn test_enter_holds_priority_lock() {
    let block = block(GuardKind::Priority);
    let lock = block.priority_lock().unwrap();

    let critical = block.enter(Priority::Elevated).await.unwrap();
    assert!(!lock.try_lock(Priority::Normal));
    drop(critical);

    assert!(lock.try_lock(Priority::Normal));
    lock.unlock(Priority::Normal).unwrap();
}

#[tokio::test]
async fn test_enter_held_requires_existing_hold() {
    let block = block(GuardKind::Priority);
    let lock = block.priority_lock().unwrap();

    let err = block.enter_held(Priority::Elevated).err().unwrap();
    assert!(matches!(
        err,
        LockError::NotHeld {
            requested: Priority::Elevated,
            holder: Holder::Nobody,
        }
    ));

    lock.lock(Priority::Normal).await.unwrap();
    assert!(block.enter_held(Priority::Elevated).is_err());
    lock.unlock(Priority::Normal).unwrap();

    assert!(block.enter_held(Priority::Elevated).is_err());
    assert!(self::block(GuardKind::Exclusive).enter_held(Priority::Normal).is_err());
}

#[tokio::test]
async fn test_enter_held_leaves_hold_in_place() {
    let block = block(GuardKind::Priority);
    let lock = block.priority_lock().unwrap();
    lock.lock(Priority::Elevated).await.unwrap();

    {
        let mut critical = block.enter_held(Priority::Elevated).unwrap();
        assert_eq!(critical.record_mirrored(55), 55);
    }

    // Dropping the handle did not release the lock.
    assert_eq!(lock.holder(), Holder::Class(Priority::Elevated));
    assert!(!lock.try_lock(Priority::Normal));
    lock.unlock(Priority::Elevated).unwrap();
    assert_eq!(block.health(), 55);
}

#[test]
fn test_only_priority_blocks_expose_lock() {
    assert!(block(GuardKind::Exclusive).priority_lock().is_none());
    assert!(block(GuardKind::Token).priority_lock().is_none());
    assert!(block(GuardKind::Priority).priority_lock().is_some());
    assert_eq!(block(GuardKind::Token).health(), MAX_HEALTH);
}
