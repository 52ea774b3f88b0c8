//! Saving and restoring value tables through the file repositories

use castle_warrior::{
    LoadStatus, QLearningAgent,
    adapters::{JsonRepository, MsgPackRepository},
    pipeline::{TrainingConfig, TrainingPipeline},
    ports::TableRepository,
    q_learning::SavedValueTable,
};
use tempfile::TempDir;

mod common;

use common::open_env;

fn trained_agent() -> QLearningAgent {
    let mut env = open_env(5);
    let mut agent = QLearningAgent::default();
    let config = TrainingConfig {
        episodes: 15,
        seed: Some(21),
        solve_threshold: None,
        ..TrainingConfig::default()
    };
    TrainingPipeline::new(config)
        .run(&mut env, &mut agent)
        .unwrap();
    agent
}

#[test]
fn test_msgpack_round_trip_is_exact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("q_table.msgpack");
    let agent = trained_agent();
    agent.save_table(&path).unwrap();

    let mut restored = QLearningAgent::default();
    let status = restored.load_table(&path);
    assert_eq!(
        status,
        LoadStatus::Loaded {
            entries: agent.q_table_size()
        }
    );
    assert_eq!(restored.q_table(), agent.q_table());
}

#[test]
fn test_json_extension_selects_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("q_table.json");
    let agent = trained_agent();
    agent.save_table(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"entries\""));

    let mut restored = QLearningAgent::default();
    assert!(restored.load_table(&path).is_loaded());
    assert_eq!(restored.q_table(), agent.q_table());
}

#[test]
fn test_missing_file_keeps_table() {
    let temp_dir = TempDir::new().unwrap();
    let mut agent = trained_agent();
    let before = agent.q_table().clone();

    let status = agent.load_table(&temp_dir.path().join("absent.msgpack"));
    assert_eq!(status, LoadStatus::Missing);
    assert_eq!(agent.q_table(), &before);
}

#[test]
fn test_corrupt_file_keeps_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.msgpack");
    std::fs::write(&path, b"definitely not msgpack").unwrap();

    let mut agent = trained_agent();
    let before = agent.q_table().clone();
    assert!(matches!(
        agent.load_table(&path),
        LoadStatus::Corrupt { .. }
    ));
    assert_eq!(agent.q_table(), &before);
}

#[test]
fn test_bad_row_length_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("short.json");
    std::fs::write(
        &path,
        r#"{"version":1,"action_count":5,"entries":{"T0,1|G-|W-":[1.0,2.0]}}"#,
    )
    .unwrap();

    let mut agent = QLearningAgent::default();
    assert!(matches!(
        agent.load_table_with(&JsonRepository, &path),
        LoadStatus::Corrupt { .. }
    ));
    assert_eq!(agent.q_table_size(), 0);
}

#[test]
fn test_duplicate_key_spellings_are_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dupes.json");
    std::fs::write(
        &path,
        r#"{"version":1,"action_count":5,"entries":{
            "T0,1|G-|W-1,0;1,0":[1.0,0.0,0.0,0.0,0.0],
            "T0,1|G-|W1,0;-1,0":[2.0,0.0,0.0,0.0,0.0]}}"#,
    )
    .unwrap();

    let mut agent = trained_agent();
    let before = agent.q_table().clone();
    assert!(matches!(
        agent.load_table_with(&JsonRepository, &path),
        LoadStatus::Corrupt { .. }
    ));
    assert_eq!(agent.q_table(), &before);
}

#[test]
fn test_repositories_share_one_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("table.bin");
    let saved: SavedValueTable = trained_agent().export_table();

    MsgPackRepository.save(&saved, &path).unwrap();
    let loaded = MsgPackRepository.load(&path).unwrap();
    assert_eq!(loaded, saved);
}
