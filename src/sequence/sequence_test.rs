// ABOUTME: Tests for sequence sources and attack plan validation.
// ABOUTME: Uses temporary files for the JSON source.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::plan::AttackPlan;
use super::source::{JsonFileSource, SequenceSource, StaticSource, read_sequence};
use crate::agent::AgentId;
use crate::error::SequenceError;
use crate::grid::Coord;

fn sequence_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

struct BrokenSource;

#[async_trait]
impl SequenceSource for BrokenSource {
    async fn load(&self, _agent: AgentId) -> Result<Vec<Coord>, SequenceError> {
        Err(SequenceError::Source(anyhow::anyhow!("generator unavailable")))
    }
}

#[tokio::test]
async fn test_read_sequence_parses_pairs() {
    let file = sequence_file("[[0, 1], [2, 3], [0, 1]]");

    let sequence = read_sequence(file.path()).await.unwrap();
    assert_eq!(
        sequence,
        vec![Coord::new(0, 1), Coord::new(2, 3), Coord::new(0, 1)]
    );
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sequence_1.json");

    let err = read_sequence(&path).await.unwrap_err();
    match err {
        SequenceError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected Io, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_file_is_rejected() {
    for contents in ["[[0, 1], [2]]", "{\"x\": 1}", "[[0, -1]]", "not json"] {
        let file = sequence_file(contents);
        let err = read_sequence(file.path()).await.unwrap_err();
        assert!(
            matches!(err, SequenceError::Malformed { .. }),
            "{} should be malformed, got {:?}",
            contents,
            err
        );
    }
}

#[tokio::test]
async fn test_json_source_reads_one_file_per_agent() {
    let first = sequence_file("[[0, 0]]");
    let second = sequence_file("[[1, 1], [1, 0]]");
    let source = JsonFileSource::new(first.path(), second.path());

    assert_eq!(source.path(AgentId::Two), second.path());
    assert_eq!(source.load(AgentId::One).await.unwrap(), vec![Coord::new(0, 0)]);
    assert_eq!(source.load(AgentId::Two).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_plan_truncates_to_hit_count() {
    let source = StaticSource::from_pairs(&[[0, 0], [0, 1], [1, 1]], &[[1, 0], [1, 1]]);

    let plan = AttackPlan::load(&source, 2, 2, 2).await.unwrap();
    assert_eq!(plan.sequence(AgentId::One), &[Coord::new(0, 0), Coord::new(0, 1)]);
    assert_eq!(plan.sequence(AgentId::Two), &[Coord::new(1, 0), Coord::new(1, 1)]);
}

#[tokio::test]
async fn test_plan_rejects_short_sequence() {
    let source = StaticSource::from_pairs(&[[0, 0], [0, 1]], &[[1, 0]]);

    let err = AttackPlan::load(&source, 2, 2, 2).await.unwrap_err();
    assert!(matches!(
        err,
        SequenceError::TooShort {
            agent: AgentId::Two,
            expected: 2,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn test_plan_rejects_out_of_bounds() {
    // 3 columns, 2 rows: x must stay below 2, y below 3.
    let source = StaticSource::from_pairs(&[[1, 2], [0, 0]], &[[0, 2], [2, 0]]);

    let err = AttackPlan::load(&source, 3, 2, 2).await.unwrap_err();
    match err {
        SequenceError::OutOfBounds {
            agent,
            index,
            coord,
            width,
            height,
        } => {
            assert_eq!(agent, AgentId::Two);
            assert_eq!(index, 1);
            assert_eq!(coord, Coord::new(2, 0));
            assert_eq!((width, height), (3, 2));
        }
        other => panic!("Expected OutOfBounds, got {:?}", other),
    }
}

#[tokio::test]
async fn test_source_failure_aborts_load() {
    let err = AttackPlan::load(&BrokenSource, 4, 4, 1).await.unwrap_err();
    assert!(err.to_string().contains("generator unavailable"));
}

#[test]
fn test_exclusive_to_skips_shared_coordinates() {
    let plan = AttackPlan::new(
        vec![Coord::new(0, 0), Coord::new(1, 1), Coord::new(0, 0)],
        vec![Coord::new(1, 1), Coord::new(2, 2)],
    );

    assert_eq!(plan.exclusive_to(AgentId::One), vec![Coord::new(0, 0)]);
    assert_eq!(plan.exclusive_to(AgentId::Two), vec![Coord::new(2, 2)]);
}
