// Match logging: one JSONL line per tick
//
// Writes are synchronous and flushed per line so a crashed run still leaves a
// replayable prefix. A logger that fails to open its file degrades to a no-op.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::food::Food;
use crate::game::{MatchEnvironment, StepReport};
use crate::invocation::Decision;
use crate::types::{Direction, Position};

/// A single logged tick
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MatchLogEntry {
    pub series: String,
    pub game: usize,
    pub game_seed: u64,
    pub tick: u32,
    pub challenger_action: Direction,
    pub opponent_action: Direction,
    pub challenger_decision: String,
    pub opponent_decision: String,
    /// Bodies and food after the tick was applied
    pub challenger_body: Vec<Position>,
    pub opponent_body: Vec<Position>,
    pub food: Option<Food>,
    pub report: StepReport,
    pub timestamp: String,
}

impl MatchLogEntry {
    /// Captures the state of `env` right after a step
    pub fn capture(
        series: &str,
        game: usize,
        game_seed: u64,
        env: &MatchEnvironment,
        decisions: (&Decision, &Decision),
        report: StepReport,
    ) -> Self {
        MatchLogEntry {
            series: series.to_string(),
            game,
            game_seed,
            tick: env.steps(),
            challenger_action: decisions.0.direction(),
            opponent_action: decisions.1.direction(),
            challenger_decision: decisions.0.kind().to_string(),
            opponent_decision: decisions.1.kind().to_string(),
            challenger_body: env.challenger().body().iter().copied().collect(),
            opponent_body: env.opponent().body().iter().copied().collect(),
            food: env.food().copied(),
            report,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub struct MatchLogger {
    file: Option<File>,
}

impl MatchLogger {
    /// Creates a logger, truncating `log_file_path` when enabled
    pub fn new<P: AsRef<Path>>(enabled: bool, log_file_path: P) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let path = log_file_path.as_ref();
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
        {
            Ok(file) => {
                info!("Match logging enabled: {}", path.display());
                MatchLogger { file: Some(file) }
            }
            Err(e) => {
                error!("Failed to create match log file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        MatchLogger { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log_tick(&mut self, entry: &MatchLogEntry) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        match serde_json::to_string(entry) {
            Ok(json_line) => {
                if let Err(e) = writeln!(file, "{}", json_line).and_then(|_| file.flush()) {
                    error!("Failed to write match log entry: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize match log entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameRules;
    use crate::grid::Grid;
    use std::fs;

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let logger = MatchLogger::new(false, &path);
        assert!(!logger.is_enabled());
        assert!(!path.exists());
    }

    #[test]
    fn test_entries_are_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut logger = MatchLogger::new(true, &path);
        assert!(logger.is_enabled());

        let rules = GameRules {
            grid: Grid::new(20, 10),
            initial_snake_length: 5,
            max_snake_length: 100,
            max_steps: 400,
        };
        let mut env = MatchEnvironment::new(rules, 9).unwrap();
        let a = Decision::Chosen(env.challenger().direction());
        let b = Decision::Chosen(env.opponent().direction());
        let report = env.step(a.direction(), b.direction());
        let entry = MatchLogEntry::capture("s1", 0, 9, &env, (&a, &b), report);
        logger.log_tick(&entry);
        logger.log_tick(&entry);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: MatchLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.tick, 1);
        assert_eq!(parsed.challenger_decision, "chosen");
        assert_eq!(parsed.challenger_body.len(), env.challenger().len());
    }

    #[test]
    fn test_unwritable_path_disables_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.jsonl");
        assert!(!MatchLogger::new(true, &path).is_enabled());
    }
}
