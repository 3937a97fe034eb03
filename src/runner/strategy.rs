// ABOUTME: The three synchronization strategies a run can use.
// ABOUTME: Also the launcher-facing selector that may name all of them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::GuardKind;

/// How per-block state is guarded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One shared grid, every block behind a mutex.
    ExclusiveLock,
    /// One shared grid, every block behind a single-token semaphore.
    TokenLock,
    /// Two mirrored grids kept in step by coordinator tasks.
    MessagePassing,
}

impl Strategy {
    /// Every strategy, in the order `all` runs them.
    pub const ALL: [Strategy; 3] = [
        Strategy::ExclusiveLock,
        Strategy::TokenLock,
        Strategy::MessagePassing,
    ];

    /// Guard used by the blocks of this strategy.
    pub fn guard_kind(self) -> GuardKind {
        match self {
            Strategy::ExclusiveLock => GuardKind::Exclusive,
            Strategy::TokenLock => GuardKind::Token,
            Strategy::MessagePassing => GuardKind::Priority,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::ExclusiveLock => "exclusive-lock",
            Strategy::TokenLock => "token-lock",
            Strategy::MessagePassing => "message-passing",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which strategies a launcher asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategySelector {
    ExclusiveLock,
    TokenLock,
    MessagePassing,
    #[default]
    All,
}

impl StrategySelector {
    /// The strategies to run, in order.
    pub fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategySelector::ExclusiveLock => vec![Strategy::ExclusiveLock],
            StrategySelector::TokenLock => vec![Strategy::TokenLock],
            StrategySelector::MessagePassing => vec![Strategy::MessagePassing],
            StrategySelector::All => Strategy::ALL.to_vec(),
        }
    }
}

impl From<Strategy> for StrategySelector {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::ExclusiveLock => StrategySelector::ExclusiveLock,
            Strategy::TokenLock => StrategySelector::TokenLock,
            Strategy::MessagePassing => StrategySelector::MessagePassing,
        }
    }
}

impl FromStr for StrategySelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive-lock" | "mutex" => Ok(StrategySelector::ExclusiveLock),
            "token-lock" | "semaphore" => Ok(StrategySelector::TokenLock),
            "message-passing" | "messages" => Ok(StrategySelector::MessagePassing),
            "all" => Ok(StrategySelector::All),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl std::fmt::Display for StrategySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategySelector::ExclusiveLock => f.write_str("exclusive-lock"),
            StrategySelector::TokenLock => f.write_str("token-lock"),
            StrategySelector::MessagePassing => f.write_str("message-passing"),
            StrategySelector::All => f.write_str("all"),
        }
    }
}
