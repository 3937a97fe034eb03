// ABOUTME: Tests for configuration defaults, environment overrides and validation.

use std::collections::HashMap;
use std::time::Duration;

use super::SiegeConfig;
use crate::error::ConfigError;
use crate::runner::{Strategy, StrategySelector};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = SiegeConfig::default();

    assert_eq!((config.grid_width, config.grid_height), (8, 8));
    assert_eq!(config.hits_per_agent, 256);
    assert_eq!(config.agent_power, 30);
    assert_eq!(config.strategy, StrategySelector::All);
    assert_eq!(config.latency().even, Duration::from_millis(500));
    assert_eq!(config.latency().odd, Duration::from_millis(125));
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_environment_gives_defaults() {
    let config = SiegeConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, SiegeConfig::default());
}

#[test]
fn test_environment_overrides() {
    let config = SiegeConfig::from_lookup(lookup(&[
        ("SIEGE_GRID_SIZE", "4"),
        ("SIEGE_GRID_HEIGHT", "3"),
        ("SIEGE_HITS_PER_AGENT", "10"),
        ("SIEGE_AGENT_POWER", " 25 "),
        ("SIEGE_STRATEGY", "semaphore"),
        ("SIEGE_ODD_LATENCY_MS", "1"),
        ("SIEGE_SEQUENCE_2", "/tmp/second.json"),
    ]))
    .unwrap();

    assert_eq!(config.grid_width, 4);
    assert_eq!(config.grid_height, 3);
    assert_eq!(config.hits_per_agent, 10);
    assert_eq!(config.agent_power, 25);
    assert_eq!(config.strategy, StrategySelector::TokenLock);
    assert_eq!(config.odd_latency_ms, 1);
    assert_eq!(config.even_latency_ms, 500);
    assert_eq!(config.second_sequence.to_str(), Some("/tmp/second.json"));
    assert_eq!(config.first_sequence.to_str(), Some("sequence_1.json"));
}

#[test]
fn test_unparseable_value_names_key() {
    let err = SiegeConfig::from_lookup(lookup(&[("SIEGE_AGENT_POWER", "lots")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::Parse {
            key: "SIEGE_AGENT_POWER".to_string(),
            value: "lots".to_string(),
        }
    );
}

#[test]
fn test_unknown_strategy() {
    let err = SiegeConfig::from_lookup(lookup(&[("SIEGE_STRATEGY", "spinlock")])).unwrap_err();
    assert_eq!(err, ConfigError::UnknownStrategy("spinlock".to_string()));
}

#[test]
fn test_validate_rejects_zero_values() {
    for vars in [
        [("SIEGE_GRID_WIDTH", "0")],
        [("SIEGE_HITS_PER_AGENT", "0")],
        [("SIEGE_AGENT_POWER", "0")],
    ] {
        let err = SiegeConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{:?}", vars);
    }
}

#[test]
fn test_uniform_latency() {
    let config = SiegeConfig::default().with_uniform_latency(Duration::from_millis(2));
    assert_eq!(config.latency().even, Duration::from_millis(2));
    assert_eq!(config.latency().odd, Duration::from_millis(2));
}

#[test]
fn test_selector_names() {
    assert_eq!("all".parse::<StrategySelector>().unwrap(), StrategySelector::All);
    assert_eq!(
        "Message-Passing".parse::<StrategySelector>().unwrap(),
        StrategySelector::MessagePassing
    );
    assert_eq!(StrategySelector::All.strategies(), Strategy::ALL.to_vec());
    assert_eq!(
        StrategySelector::from(Strategy::ExclusiveLock).strategies(),
        vec![Strategy::ExclusiveLock]
    );
    assert_eq!(StrategySelector::TokenLock.to_string(), "token-lock");
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: SiegeConfig =
        serde_json::from_str(r#"{"grid_width": 4, "strategy": "message-passing"}"#).unwrap();

    assert_eq!(config.grid_width, 4);
    assert_eq!(config.grid_height, 8);
    assert_eq!(config.strategy, StrategySelector::MessagePassing);
}
