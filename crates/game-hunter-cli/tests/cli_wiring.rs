//! Config-to-store wiring used by the CLI subcommands.

use game_hunter::{Column, HunterConfig, Source, SourceRecord};
use game_hunter_cli::config::{load_or_default, write_default};
use game_hunter_cli::runner::{build_orchestrator, open_store};

fn config_in(dir: &tempfile::TempDir) -> HunterConfig {
    let mut config = HunterConfig::default();
    config.database.folder = dir.path().join("db");
    config.database.name = "Backlog".to_string();
    config
}

#[test]
fn test_open_store_creates_database_in_configured_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut store = open_store(&config).unwrap();
    store.register_titles(&["Hades"]).unwrap();
    store
        .upsert_source_record("Hades", &SourceRecord::not_found(Source::Aggregator))
        .unwrap();
    assert!(dir.path().join("db").join("Backlog.db").exists());

    let reopened = open_store(&config).unwrap();
    assert_eq!(reopened.all_titles().unwrap(), vec![(1, "Hades".to_string())]);
    assert_eq!(
        reopened.get_field("Hades", Column::OpenCriticTitle).unwrap().as_deref(),
        Some("Not Found")
    );
}

#[test]
fn test_build_orchestrator_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    config.min_wait_secs = 60;
    config.max_wait_secs = 1;
    assert!(build_orchestrator(&config).is_err());
}

#[test]
fn test_init_config_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game-hunter.json");
    write_default(&path, false).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw["staleness_days"], 30);
    assert_eq!(raw["database"]["table"], "GAMES");

    assert_eq!(load_or_default(&path).unwrap(), HunterConfig::default());
}
