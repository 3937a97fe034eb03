// ABOUTME: Synchronization primitives guarding per-cell state.
// ABOUTME: Contains the two-class priority lock used by mirrored grids.

mod priority_lock;

pub use priority_lock::{Priority, PriorityGuard, PriorityLock};
