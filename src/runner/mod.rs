// ABOUTME: Runner module - strategy selection, orchestration and run reports.
// ABOUTME: Ties grids, agents and coordinators together for one strategy at a time.

mod report;
mod runner;
mod strategy;

pub use report::RunReport;
pub use runner::Runner;
pub use strategy::{Strategy, StrategySelector};
