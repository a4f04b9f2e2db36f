// Match log replay tests
// Record a series to JSONL, then re-simulate it and expect every tick to match

use std::fs;

use snake_gauntlet::config::Config;
use snake_gauntlet::match_log::MatchLogger;
use snake_gauntlet::replay::ReplayEngine;
use snake_gauntlet::sandbox::{source_for, StrategyRegistry};
use snake_gauntlet::series::{Contestant, SeriesRunner};

fn record(path: &std::path::Path, games: usize) {
    let config = Config::default_hardcoded();
    let registry = StrategyRegistry::with_builtins();
    let mut logger = MatchLogger::new(true, path);
    let mut runner =
        SeriesRunner::new(config.game_rules(), games, &registry).with_logger(&mut logger);
    runner
        .run(
            &Contestant::new("seeker", source_for("food_seeker")),
            &Contestant::new("wanderer", source_for("random")),
            2024,
        )
        .unwrap();
}

#[test]
fn test_recorded_series_replays_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match_log.jsonl");
    record(&path, 3);

    let engine = ReplayEngine::new(&Config::default_hardcoded(), false);
    let entries = engine.load_log_file(&path).unwrap();
    assert!(!entries.is_empty());

    let games = ReplayEngine::group_games(&entries);
    assert_eq!(games.len(), 3);
    assert!(games.iter().all(|g| g.series == "seeker vs wanderer"));

    let results = engine.replay_all(&entries);
    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_ticks, entries.len());
    assert_eq!(stats.mismatches, 0);
    assert_eq!(stats.games, 3);
    assert_eq!(stats.match_rate, 100.0);
}

#[test]
fn test_replay_with_different_rules_reports_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match_log.jsonl");
    record(&path, 1);

    let mut config = Config::default_hardcoded();
    config.grid.width = 30;
    let engine = ReplayEngine::new(&config, false);
    let entries = engine.load_log_file(&path).unwrap();
    let results = engine.replay_all(&entries);

    assert!(results.iter().any(|r| !r.matches));
}

#[test]
fn test_corrupt_log_line_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    fs::write(&path, "{\"series\": \"a\"}\n").unwrap();

    let engine = ReplayEngine::new(&Config::default_hardcoded(), false);
    let err = engine.load_log_file(&path).unwrap_err();
    assert!(err.contains("line 1"));
}
