// Tournament controller
//
// One generation: build the gauntlet from the leaderboard, fetch a challenger, play
// series in rank order until the first loss, crown the challenger if it beat everyone,
// then advance the generation counter whatever happened.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::error::GauntletError;
use crate::game::GameRules;
use crate::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardStore};
use crate::match_log::MatchLogger;
use crate::provider::StrategyProvider;
use crate::sandbox::StrategySandbox;
use crate::series::{Contestant, SeriesResult, SeriesRunner};
use crate::vault::ChampionVault;

/// Everything that survives from one generation to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentState {
    pub generation: u64,
    pub leaderboard: Leaderboard,
}

impl TournamentState {
    /// Resumes after the newest crowning on `leaderboard`
    pub fn resume(leaderboard: Leaderboard) -> Self {
        TournamentState {
            generation: leaderboard.next_generation(),
            leaderboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// No series was played
    Skipped(String),
    /// The challenger lost or tied the series against this opponent
    Defeated { by: String },
    Crowned {
        name: String,
        file: String,
        /// Whether the leaderboard reached disk
        persisted: bool,
    },
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: u64,
    pub challenger: Option<String>,
    pub series: Vec<SeriesResult>,
    pub outcome: GenerationOutcome,
}

impl GenerationReport {
    pub fn crowned(&self) -> bool {
        matches!(self.outcome, GenerationOutcome::Crowned { .. })
    }
}

/// Result of running one challenger through a gauntlet
#[derive(Debug, Clone)]
pub struct GauntletRun {
    pub won_all: bool,
    pub results: Vec<SeriesResult>,
}

/// Plays `opponents` in order, stopping at the first series the challenger fails to win
///
/// An empty gauntlet cannot be won.
pub fn run_gauntlet<F>(opponents: &[Contestant], mut play: F) -> GauntletRun
where
    F: FnMut(&Contestant) -> SeriesResult,
{
    let mut results = Vec::with_capacity(opponents.len());
    for opponent in opponents {
        let result = play(opponent);
        let won = result.challenger_won();
        results.push(result);
        if !won {
            return GauntletRun {
                won_all: false,
                results,
            };
        }
    }
    GauntletRun {
        won_all: !opponents.is_empty(),
        results,
    }
}

pub struct TournamentController {
    rules: GameRules,
    games_per_series: usize,
    max_opponents: usize,
    sandbox: Box<dyn StrategySandbox>,
    provider: Box<dyn StrategyProvider>,
    vault: Box<dyn ChampionVault>,
    store: Box<dyn LeaderboardStore>,
    state: TournamentState,
    rng: StdRng,
    logger: MatchLogger,
}

impl TournamentController {
    /// Loads the persisted leaderboard and resumes from the generation after its newest entry
    pub fn new(
        config: &Config,
        sandbox: Box<dyn StrategySandbox>,
        provider: Box<dyn StrategyProvider>,
        vault: Box<dyn ChampionVault>,
        store: Box<dyn LeaderboardStore>,
    ) -> Self {
        let leaderboard = Leaderboard::from_entries(store.load(), config.gauntlet.leaderboard_size);
        let state = TournamentState::resume(leaderboard);
        info!(
            "Loaded leaderboard with {} entries, starting at generation {}",
            state.leaderboard.len(),
            state.generation
        );

        TournamentController {
            rules: config.game_rules(),
            games_per_series: config.series.games_per_series,
            max_opponents: config.gauntlet.max_opponents,
            sandbox,
            provider,
            vault,
            store,
            state,
            rng: StdRng::seed_from_u64(config.rng.seed),
            logger: MatchLogger::disabled(),
        }
    }

    pub fn with_logger(mut self, logger: MatchLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.state.leaderboard
    }

    /// Name given to the current-best strategy when it stands in as the only opponent
    pub fn fallback_opponent_name(&self) -> String {
        match self.state.leaderboard.head() {
            Some(entry) => entry.name.clone(),
            None => self.vault.best_label(),
        }
    }

    /// Top leaderboard entries whose archive still exists, else the current best
    pub fn build_gauntlet(&self) -> Vec<Contestant> {
        let mut opponents = Vec::new();
        for entry in self.state.leaderboard.top(self.max_opponents) {
            if !self.vault.contains(&entry.file) {
                warn!(
                    "Leaderboard champion file '{}' for '{}' not found. Skipping.",
                    entry.file, entry.name
                );
                continue;
            }
            match self.vault.read(&entry.file) {
                Ok(source) => opponents.push(Contestant::new(entry.name.clone(), source)),
                Err(e) => warn!("Skipping '{}': {}", entry.name, e),
            }
        }

        if opponents.is_empty() {
            match self.vault.read_best() {
                Ok(source) => {
                    let name = self.fallback_opponent_name();
                    info!("Challenger faces the current best strategy as '{}'", name);
                    opponents.push(Contestant::new(name, source));
                }
                Err(e) => warn!("No archived champions and no current best: {}", e),
            }
        }

        opponents
    }

    /// Runs one full generation and advances the counter
    pub fn run_generation(&mut self) -> GenerationReport {
        let generation = self.state.generation;
        info!("=== STARTING GENERATION {} ===", generation);
        let report = self.evaluate_generation(generation);
        self.state.generation += 1;
        report
    }

    /// Runs `limit` generations, or forever when `None`
    pub fn run(&mut self, limit: Option<u64>) -> u64 {
        let mut ran = 0;
        while limit.map_or(true, |l| ran < l) {
            let report = self.run_generation();
            if !report.crowned() {
                info!(
                    "Generation {} ended without a new champion ({:?})",
                    report.generation, report.outcome
                );
            }
            ran += 1;
        }
        ran
    }

    fn evaluate_generation(&mut self, generation: u64) -> GenerationReport {
        let opponents = self.build_gauntlet();
        if opponents.is_empty() {
            warn!(
                "{}. Skipping generation {}.",
                GauntletError::NoOpponentAvailable,
                generation
            );
            return GenerationReport {
                generation,
                challenger: None,
                series: Vec::new(),
                outcome: GenerationOutcome::Skipped(GauntletError::NoOpponentAvailable.to_string()),
            };
        }

        let champion_source = self.vault.read_best().ok();
        let challenger = match self
            .provider
            .next_challenger(generation, champion_source.as_deref())
        {
            Ok(challenger) => challenger,
            Err(e) => {
                warn!("No challenger for generation {}: {}", generation, e);
                return GenerationReport {
                    generation,
                    challenger: None,
                    series: Vec::new(),
                    outcome: GenerationOutcome::Skipped(e.to_string()),
                };
            }
        };

        info!(
            "Challenger '{}' must win against {} opponent(s): {}",
            challenger.name,
            opponents.len(),
            opponents
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let gauntlet = {
            let rules = self.rules;
            let games = self.games_per_series;
            let sandbox = &*self.sandbox;
            let logger = &mut self.logger;
            let rng = &mut self.rng;
            run_gauntlet(&opponents, |opponent| {
                let seed: u64 = rng.random();
                let mut runner = SeriesRunner::new(rules, games, sandbox).with_logger(&mut *logger);
                runner.run(&challenger, opponent, seed).unwrap_or_else(|e| {
                    error!(
                        "Series '{}' vs '{}' could not be played: {}",
                        challenger.name, opponent.name, e
                    );
                    SeriesResult {
                        challenger: challenger.name.clone(),
                        opponent: opponent.name.clone(),
                        outcomes: Vec::new(),
                        score: 0,
                        forfeited: true,
                        opponent_fallback: false,
                    }
                })
            })
        };

        let outcome = if gauntlet.won_all {
            self.crown(&challenger, generation)
        } else {
            let by = gauntlet
                .results
                .last()
                .map(|r| r.opponent.clone())
                .unwrap_or_default();
            info!(
                "Challenger '{}' failed against '{}'. Gauntlet challenge unsuccessful.",
                challenger.name, by
            );
            GenerationOutcome::Defeated { by }
        };

        GenerationReport {
            generation,
            challenger: Some(challenger.name),
            series: gauntlet.results,
            outcome,
        }
    }

    /// Archives the challenger, makes it the current best and promotes it
    ///
    /// Persistence is best effort: the in-memory leaderboard keeps the promotion even
    /// when the store rejects the write.
    fn crown(&mut self, challenger: &Contestant, generation: u64) -> GenerationOutcome {
        info!(
            "'{}' is the new OVERALL CHAMPION of generation {}!",
            challenger.name, generation
        );

        let file = match self
            .vault
            .archive(&challenger.name, generation, &challenger.source)
        {
            Ok(file) => file,
            Err(e) => {
                warn!("Error archiving champion source: {}", e);
                self.provider.origin()
            }
        };

        if let Err(e) = self.vault.write_best(&challenger.source) {
            error!("Champion update of the current best failed: {}", e);
        }

        self.state.leaderboard.promote(LeaderboardEntry::new(
            challenger.name.clone(),
            generation,
            file.clone(),
        ));
        self.log_leaderboard();

        let persisted = match self.store.save(self.state.leaderboard.entries()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Leaderboard not saved, keeping it in memory: {}", e);
                false
            }
        };

        GenerationOutcome::Crowned {
            name: challenger.name.clone(),
            file,
            persisted,
        }
    }

    fn log_leaderboard(&self) {
        info!("--- Top Snakes Leaderboard ---");
        for (i, entry) in self.state.leaderboard.entries().iter().enumerate() {
            info!(
                "{}. {} (Crowned Gen: {}, File: {})",
                i + 1,
                entry.name,
                entry.generation_crowned,
                entry.file
            );
        }
    }
}
