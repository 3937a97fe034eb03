// ABOUTME: Agent module - the two strikers and the loop that replays their sequences.
// ABOUTME: Provides Agent, AgentId, the Battlefield they strike and AgentResult.

mod definition;
mod runner;

pub use definition::{Agent, AgentId};
pub use runner::{AgentResult, Battlefield};
