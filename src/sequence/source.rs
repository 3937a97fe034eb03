// ABOUTME: Where attack sequences come from: JSON files or memory.
// ABOUTME: Files hold an array of [x, y] pairs and are read once per run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::agent::AgentId;
use crate::error::SequenceError;
use crate::grid::Coord;

/// Supplies the fixed coordinate sequence of each agent.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Load the sequence for `agent`.
    async fn load(&self, agent: AgentId) -> Result<Vec<Coord>, SequenceError>;
}

/// Read one sequence file.
pub async fn read_sequence(path: impl AsRef<Path>) -> Result<Vec<Coord>, SequenceError> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| SequenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_slice(&data).map_err(|source| SequenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// One JSON file per agent.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    paths: [PathBuf; 2],
}

impl JsonFileSource {
    pub fn new(first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Self {
        Self {
            paths: [first.into(), second.into()],
        }
    }

    /// Path of `agent`'s file.
    pub fn path(&self, agent: AgentId) -> &Path {
        &self.paths[agent.index()]
    }
}

#[async_trait]
impl SequenceSource for JsonFileSource {
    async fn load(&self, agent: AgentId) -> Result<Vec<Coord>, SequenceError> {
        read_sequence(self.path(agent)).await
    }
}

/// Sequences held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    sequences: [Vec<Coord>; 2],
}

impl StaticSource {
    pub fn new(first: Vec<Coord>, second: Vec<Coord>) -> Self {
        Self {
            sequences: [first, second],
        }
    }

    /// Build from `[x, y]` pairs.
    pub fn from_pairs(first: &[[usize; 2]], second: &[[usize; 2]]) -> Self {
        Self::new(
            first.iter().copied().map(Coord::from).collect(),
            second.iter().copied().map(Coord::from).collect(),
        )
    }
}

#[async_trait]
impl SequenceSource for StaticSource {
    async fn load(&self, agent: AgentId) -> Result<Vec<Coord>, SequenceError> {
        Ok(self.sequences[agent.index()].clone())
    }
}
