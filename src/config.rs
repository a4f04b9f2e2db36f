// Configuration module for reading Gauntlet.toml
// This module provides the tunable surface consumed by the engine and the tournament

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::game::GameRules;
use crate::grid::Grid;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub grid: GridConfig,
    pub game_rules: GameRulesConfig,
    pub series: SeriesConfig,
    pub gauntlet: GauntletConfig,
    pub storage: StorageConfig,
    pub rng: RngConfig,
    pub debug: DebugConfig,
}

/// Board dimensions (toroidal)
#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

/// Game rules constants
#[derive(Debug, Deserialize, Clone)]
pub struct GameRulesConfig {
    pub initial_snake_length: usize,
    pub max_steps_per_episode: u32,
}

/// Match series constants
#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub games_per_series: usize,
}

/// Gauntlet and leaderboard constants
#[derive(Debug, Deserialize, Clone)]
pub struct GauntletConfig {
    pub leaderboard_size: usize,
    pub max_opponents: usize,
    pub default_challenger_name: String,
    /// 0 runs forever
    pub max_generations: u64,
}

/// Where durable tournament state lives
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub leaderboard_file: String,
    pub champions_dir: String,
    pub best_file: String,
    pub challenger_file: String,
    pub archive_extension: String,
}

/// Seed for the master random stream
#[derive(Debug, Deserialize, Clone)]
pub struct RngConfig {
    pub seed: u64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl GameRulesConfig {
    /// Longest a snake may grow on the given grid
    pub fn max_snake_length(&self, grid: &GridConfig) -> usize {
        (grid.width.max(0) as usize * grid.height.max(0) as usize) / 2
    }
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Gauntlet.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Gauntlet.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Gauntlet.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Gauntlet.toml
    pub fn default_hardcoded() -> Self {
        Config {
            grid: GridConfig {
                width: 20,
                height: 10,
            },
            game_rules: GameRulesConfig {
                initial_snake_length: 5,
                max_steps_per_episode: 400,
            },
            series: SeriesConfig {
                games_per_series: 10,
            },
            gauntlet: GauntletConfig {
                leaderboard_size: 5,
                max_opponents: 3,
                default_challenger_name: "DefaultChallenger".to_string(),
                max_generations: 0,
            },
            storage: StorageConfig {
                leaderboard_file: "leaderboard.json".to_string(),
                champions_dir: "past_champions".to_string(),
                best_file: "best_snake_logic.toml".to_string(),
                challenger_file: "challenger_snake_logic.toml".to_string(),
                archive_extension: "toml".to_string(),
            },
            rng: RngConfig { seed: 42 },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "match_log.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Gauntlet.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Rejects values the engine cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.grid.width <= 0 || self.grid.height <= 0 {
            return Err(format!(
                "Grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            ));
        }
        if self.game_rules.initial_snake_length == 0 {
            return Err("initial_snake_length must be positive".to_string());
        }
        let max_length = self.game_rules.max_snake_length(&self.grid);
        if self.game_rules.initial_snake_length > max_length {
            return Err(format!(
                "initial_snake_length {} exceeds max snake length {} for a {}x{} grid",
                self.game_rules.initial_snake_length, max_length, self.grid.width, self.grid.height
            ));
        }
        if self.game_rules.max_steps_per_episode == 0 {
            return Err("max_steps_per_episode must be positive".to_string());
        }
        if self.series.games_per_series == 0 {
            return Err("games_per_series must be positive".to_string());
        }
        if self.gauntlet.leaderboard_size == 0 || self.gauntlet.max_opponents == 0 {
            return Err("leaderboard_size and max_opponents must be positive".to_string());
        }
        Ok(())
    }

    /// The immutable rules every environment of this run is built from
    pub fn game_rules(&self) -> GameRules {
        GameRules {
            grid: Grid::new(self.grid.width, self.grid.height),
            initial_snake_length: self.game_rules.initial_snake_length,
            max_snake_length: self.game_rules.max_snake_length(&self.grid),
            max_steps: self.game_rules.max_steps_per_episode,
        }
    }

    /// Maximum generations to run, `None` when unbounded
    pub fn generation_limit(&self) -> Option<u64> {
        match self.gauntlet.max_generations {
            0 => None,
            n => Some(n),
        }
    }
}
