// ABOUTME: Root module for siege - two agents striking a grid of blocks under
// ABOUTME: different locking strategies. Re-exports the public types of each module.

pub mod agent;
pub mod config;
pub mod coordination;
pub mod error;
pub mod grid;
pub mod observe;
pub mod prelude;
pub mod runner;
pub mod sequence;
pub mod sync;

pub use error::SiegeError;
