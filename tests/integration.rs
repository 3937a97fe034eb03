// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Runs full strategy comparisons from on-disk sequence files.

use std::sync::Arc;

use siege::prelude::*;
use tempfile::TempDir;

/// Write both sequence files and return a config pointing at them.
fn setup(first: &str, second: &str, vars: &[(&str, &str)]) -> (TempDir, SiegeConfig) {
    let dir = tempfile::tempdir().unwrap();
    let first_path = dir.path().join("sequence_1.json");
    let second_path = dir.path().join("sequence_2.json");
    std::fs::write(&first_path, first).unwrap();
    std::fs::write(&second_path, second).unwrap();

    let first_path = first_path.to_string_lossy().into_owned();
    let second_path = second_path.to_string_lossy().into_owned();
    let config = SiegeConfig::from_lookup(|key| match key {
        "SIEGE_SEQUENCE_1" => Some(first_path.clone()),
        "SIEGE_SEQUENCE_2" => Some(second_path.clone()),
        "SIEGE_EVEN_LATENCY_MS" | "SIEGE_ODD_LATENCY_MS" => Some("1".to_string()),
        other => vars
            .iter()
            .find(|(k, _)| *k == other)
            .map(|(_, v)| v.to_string()),
    })
    .unwrap();

    (dir, config)
}

#[tokio::test]
async fn test_full_comparison_from_files() {
    let (_dir, config) = setup(
        "[[0, 0], [0, 0], [0, 1], [1, 1], [0, 0], [0, 0], [2, 2]]",
        "[[2, 0], [2, 0], [2, 0], [2, 0], [1, 2], [0, 1], [2, 1]]",
        &[
            ("SIEGE_GRID_SIZE", "3"),
            ("SIEGE_HITS_PER_AGENT", "6"),
            ("SIEGE_AGENT_POWER", "25"),
        ],
    );

    let plan = AttackPlan::load(
        &config.sequence_source(),
        config.grid_width,
        config.grid_height,
        config.hits_per_agent,
    )
    .await
    .unwrap();
    // The seventh coordinate is beyond the hit count.
    assert_eq!(plan.sequence(AgentId::One).len(), 6);

    let observer = Arc::new(RecordingObserver::new());
    let runner = Runner::new(config).with_observer(observer.clone());
    let reports = runner.run_selection(&plan).await.unwrap();
    assert_eq!(reports.len(), 3);

    let [exclusive, token, messages] = &reports[..] else {
        panic!("expected three reports");
    };
    assert_eq!(exclusive.grids, token.grids);
    assert_eq!(exclusive.agents, token.agents);

    for report in &reports {
        assert_eq!(report.score(AgentId::One), 1);
        assert_eq!(report.score(AgentId::Two), 1);
        assert_eq!(report.grid().at(Coord::new(0, 0)), Some(0));
        assert_eq!(report.grid().at(Coord::new(2, 0)), Some(0));
        assert_eq!(report.grid().at(Coord::new(2, 2)), Some(100));
    }

    let [first, second] = &messages.grids[..] else {
        panic!("expected two grids");
    };
    for coord in plan
        .exclusive_to(AgentId::One)
        .into_iter()
        .chain(plan.exclusive_to(AgentId::Two))
    {
        assert_eq!(first.at(coord), second.at(coord));
    }

    let destroyed = observer.count(|e| matches!(e, SiegeEvent::BlockDestroyed { .. }));
    assert_eq!(destroyed, 6);
}

#[tokio::test]
async fn test_missing_sequence_file_aborts_before_running() {
    let (dir, config) = setup("[[0, 0]]", "[[0, 0]]", &[("SIEGE_HITS_PER_AGENT", "1")]);
    std::fs::remove_file(dir.path().join("sequence_2.json")).unwrap();

    let err = AttackPlan::load(&config.sequence_source(), 8, 8, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SequenceError::Io { .. }));

    let err: SiegeError = err.into();
    assert!(err.to_string().starts_with("Sequence error"));
}

#[tokio::test]
async fn test_report_renders_grids_and_scores() {
    let runner = Runner::new(SiegeConfig {
        grid_width: 2,
        grid_height: 1,
        hits_per_agent: 1,
        agent_power: 100,
        even_latency_ms: 0,
        odd_latency_ms: 0,
        ..SiegeConfig::default()
    });
    let plan = AttackPlan::new(vec![Coord::new(0, 0)], vec![Coord::new(0, 1)]);

    let shared = runner.run(Strategy::TokenLock, &plan).await.unwrap();
    let rendered = shared.to_string();
    assert!(rendered.starts_with("[token-lock] elapsed"));
    assert!(rendered.contains("Final state of the blocks:\n  0   0 \n"));
    assert!(rendered.contains("Agent 1 scored 1 point(s)"));
    assert!(rendered.contains("Agent 2 scored 1 point(s)"));

    let mirrored = runner.run(Strategy::MessagePassing, &plan).await.unwrap();
    let rendered = mirrored.to_string();
    assert!(rendered.contains("Final state of grid 1:"));
    assert!(rendered.contains("Final state of grid 2:"));

    let json = serde_json::to_value(&mirrored).unwrap();
    assert_eq!(json["strategy"], "message-passing");
    assert_eq!(json["grids"].as_array().unwrap().len(), 2);
    assert_eq!(json["coordination"]["begins"], 2);
}

#[tokio::test]
async fn test_priority_lock_try_lock_from_public_api() {
    let lock = PriorityLock::new();
    let guard = lock.guard(Priority::Normal).await.unwrap();

    assert!(!lock.try_lock(Priority::Elevated));
    assert!(!lock.try_lock(Priority::Normal));
    drop(guard);

    assert!(lock.try_lock(Priority::Elevated));
    lock.unlock(Priority::Elevated).unwrap();
    assert!(lock.unlock(Priority::Elevated).is_err());
}
