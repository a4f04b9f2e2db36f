// Replay module for verifying recorded matches
//
// This module provides functionality to:
// 1. Parse JSONL match logs
// 2. Re-simulate each logged game from its seed with the recorded actions
// 3. Compare the resulting bodies, food and step reports tick by tick
// 4. Generate summary reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::game::{GameRules, MatchEnvironment};
use crate::match_log::MatchLogEntry;
use crate::types::Position;

/// Consecutive log entries belonging to one game
#[derive(Debug, Clone)]
pub struct LoggedGame {
    pub series: String,
    pub game: usize,
    pub game_seed: u64,
    pub ticks: Vec<MatchLogEntry>,
}

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct TickCheck {
    pub series: String,
    pub game: usize,
    pub tick: u32,
    pub matches: bool,
    pub mismatch: Option<String>,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub games: usize,
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for match logs
pub struct ReplayEngine {
    rules: GameRules,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine using the game rules of `config`
    pub fn new(config: &Config, verbose: bool) -> Self {
        ReplayEngine {
            rules: config.game_rules(),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<MatchLogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: MatchLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Splits entries into games; a new game starts when the label changes or ticks restart
    pub fn group_games(entries: &[MatchLogEntry]) -> Vec<LoggedGame> {
        let mut games: Vec<LoggedGame> = Vec::new();

        for entry in entries {
            let continues = games.last().is_some_and(|g| {
                g.series == entry.series
                    && g.game == entry.game
                    && g.game_seed == entry.game_seed
                    && g.ticks.last().is_some_and(|t| t.tick < entry.tick)
            });

            match games.last_mut() {
                Some(current) if continues => current.ticks.push(entry.clone()),
                _ => games.push(LoggedGame {
                    series: entry.series.clone(),
                    game: entry.game,
                    game_seed: entry.game_seed,
                    ticks: vec![entry.clone()],
                }),
            }
        }

        games
    }

    /// Re-simulates one game from its seed and checks every recorded tick
    pub fn replay_game(&self, game: &LoggedGame) -> Result<Vec<TickCheck>, String> {
        let mut env = MatchEnvironment::new(self.rules, game.game_seed)
            .map_err(|e| format!("Failed to set up game: {}", e))?;
        let mut results = Vec::with_capacity(game.ticks.len());

        for entry in &game.ticks {
            let report = env.step(entry.challenger_action, entry.opponent_action);

            let challenger_body: Vec<Position> = env.challenger().body().iter().copied().collect();
            let opponent_body: Vec<Position> = env.opponent().body().iter().copied().collect();

            let mismatch = if env.steps() != entry.tick {
                Some(format!("tick {} replayed as {}", entry.tick, env.steps()))
            } else if challenger_body != entry.challenger_body {
                Some("challenger body differs".to_string())
            } else if opponent_body != entry.opponent_body {
                Some("opponent body differs".to_string())
            } else if env.food().copied() != entry.food {
                Some(format!(
                    "food differs: logged {:?}, replayed {:?}",
                    entry.food.map(|f| f.position),
                    env.food().map(|f| f.position)
                ))
            } else if report != entry.report {
                Some(format!(
                    "step report differs: logged {:?}, replayed {:?}",
                    entry.report, report
                ))
            } else {
                None
            };

            if self.verbose {
                match &mismatch {
                    None => info!(
                        "{} game {} tick {}: ✓ MATCH - {} / {}",
                        game.series,
                        game.game + 1,
                        entry.tick,
                        entry.challenger_action,
                        entry.opponent_action
                    ),
                    Some(reason) => warn!(
                        "{} game {} tick {}: ✗ MISMATCH - {}",
                        game.series,
                        game.game + 1,
                        entry.tick,
                        reason
                    ),
                }
            }

            results.push(TickCheck {
                series: game.series.clone(),
                game: game.game,
                tick: entry.tick,
                matches: mismatch.is_none(),
                mismatch,
            });
        }

        Ok(results)
    }

    /// Replays every game in a log
    pub fn replay_all(&self, entries: &[MatchLogEntry]) -> Vec<TickCheck> {
        let mut results = Vec::new();

        for game in Self::group_games(entries) {
            match self.replay_game(&game) {
                Ok(checks) => results.extend(checks),
                Err(e) => {
                    warn!(
                        "Failed to replay {} game {}: {}",
                        game.series,
                        game.game + 1,
                        e
                    );
                }
            }
        }

        results
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[TickCheck]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };
        let mut games: Vec<(&str, usize)> =
            results.iter().map(|r| (r.series.as_str(), r.game)).collect();
        games.dedup();

        ReplayStats {
            games: games.len(),
            total_ticks,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[TickCheck]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Games:          {}", stats.games);
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "{} game {} tick {}: {}",
                    result.series,
                    result.game + 1,
                    result.tick,
                    result.mismatch.as_deref().unwrap_or("")
                );
            }
            println!();
        }
    }
}
