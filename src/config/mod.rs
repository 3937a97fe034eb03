// ABOUTME: Run configuration - grid shape, hit counts, power, strategy and latencies.
// ABOUTME: Built from defaults overlaid with SIEGE_* environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::HitLatency;
use crate::runner::StrategySelector;
use crate::sequence::JsonFileSource;

/// Settings for one invocation, as handed over by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeConfig {
    /// Columns per row.
    pub grid_width: usize,

    /// Rows.
    pub grid_height: usize,

    /// Strikes each agent performs.
    pub hits_per_agent: usize,

    /// Damage per strike, shared by both agents.
    pub agent_power: u32,

    /// Which strategies to run.
    pub strategy: StrategySelector,

    /// Strike latency of even-numbered blocks, in milliseconds.
    pub even_latency_ms: u64,

    /// Strike latency of odd-numbered blocks, in milliseconds.
    pub odd_latency_ms: u64,

    /// Sequence file of agent 1.
    pub first_sequence: PathBuf,

    /// Sequence file of agent 2.
    pub second_sequence: PathBuf,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            grid_width: 8,
            grid_height: 8,
            hits_per_agent: 256,
            agent_power: 30,
            strategy: StrategySelector::All,
            even_latency_ms: 500,
            odd_latency_ms: 125,
            first_sequence: PathBuf::from("sequence_1.json"),
            second_sequence: PathBuf::from("sequence_2.json"),
        }
    }
}

impl SiegeConfig {
    /// Defaults overlaid with `SIEGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `SIEGE_*` key.
    ///
    /// `SIEGE_GRID_SIZE` sets both dimensions; `SIEGE_GRID_WIDTH` and
    /// `SIEGE_GRID_HEIGHT` override it individually.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = parse::<usize>(&lookup, "SIEGE_GRID_SIZE")? {
            config.grid_width = size;
            config.grid_height = size;
        }
        if let Some(width) = parse(&lookup, "SIEGE_GRID_WIDTH")? {
            config.grid_width = width;
        }
        if let Some(height) = parse(&lookup, "SIEGE_GRID_HEIGHT")? {
            config.grid_height = height;
        }
        if let Some(hits) = parse(&lookup, "SIEGE_HITS_PER_AGENT")? {
            config.hits_per_agent = hits;
        }
        if let Some(power) = parse(&lookup, "SIEGE_AGENT_POWER")? {
            config.agent_power = power;
        }
        if let Some(strategy) = lookup("SIEGE_STRATEGY") {
            config.strategy = StrategySelector::from_str(&strategy)?;
        }
        if let Some(ms) = parse(&lookup, "SIEGE_EVEN_LATENCY_MS")? {
            config.even_latency_ms = ms;
        }
        if let Some(ms) = parse(&lookup, "SIEGE_ODD_LATENCY_MS")? {
            config.odd_latency_ms = ms;
        }
        if let Some(path) = lookup("SIEGE_SEQUENCE_1") {
            config.first_sequence = PathBuf::from(path);
        }
        if let Some(path) = lookup("SIEGE_SEQUENCE_2") {
            config.second_sequence = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one block, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.hits_per_agent == 0 {
            return Err(ConfigError::Invalid(
                "hits_per_agent must be positive".to_string(),
            ));
        }
        if self.agent_power == 0 {
            return Err(ConfigError::Invalid(
                "agent_power must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-block strike latency.
    pub fn latency(&self) -> HitLatency {
        HitLatency {
            even: Duration::from_millis(self.even_latency_ms),
            odd: Duration::from_millis(self.odd_latency_ms),
        }
    }

    /// Use the same latency for every block.
    pub fn with_uniform_latency(mut self, latency: Duration) -> Self {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.even_latency_ms = ms;
        self.odd_latency_ms = ms;
        self
    }

    /// The configured sequence files.
    pub fn sequence_source(&self) -> JsonFileSource {
        JsonFileSource::new(&self.first_sequence, &self.second_sequence)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse {
                key: key.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod config_test;
