// Match series runner
//
// Plays N independent games between two strategy sources and sums the per-game
// outcomes from the challenger's point of view. Load failures are asymmetric: a
// challenger that cannot load forfeits, an opponent that cannot load is replaced by
// a random mover so the tournament never stalls on a broken archive.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::{GameRules, MatchEnvironment};
use crate::invocation::decide;
use crate::match_log::{MatchLogEntry, MatchLogger};
use crate::sandbox::StrategySandbox;
use crate::snake::Snake;
use crate::strategy::{RandomMove, Strategy};

/// A named strategy source taking part in a series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contestant {
    pub name: String,
    pub source: String,
}

impl Contestant {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Contestant {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Result of a single game for the challenger
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

impl GameOutcome {
    /// +1, -1 or 0
    pub fn value(self) -> i32 {
        match self {
            GameOutcome::Win => 1,
            GameOutcome::Loss => -1,
            GameOutcome::Tie => 0,
        }
    }

    fn from_ordering(ordering: std::cmp::Ordering) -> Self {
        match ordering {
            std::cmp::Ordering::Greater => GameOutcome::Win,
            std::cmp::Ordering::Less => GameOutcome::Loss,
            std::cmp::Ordering::Equal => GameOutcome::Tie,
        }
    }
}

/// Ranks a finished game from the challenger's side
///
/// Both dead: score decides. One dead: the survivor wins. Neither dead: score, then
/// body length.
pub fn judge_game(challenger: &Snake, opponent: &Snake) -> GameOutcome {
    match (challenger.is_alive(), opponent.is_alive()) {
        (false, false) => GameOutcome::from_ordering(challenger.score().cmp(&opponent.score())),
        (true, false) => GameOutcome::Win,
        (false, true) => GameOutcome::Loss,
        (true, true) => GameOutcome::from_ordering(
            challenger
                .score()
                .cmp(&opponent.score())
                .then(challenger.len().cmp(&opponent.len())),
        ),
    }
}

pub fn series_score(outcomes: &[GameOutcome]) -> i32 {
    outcomes.iter().map(|o| o.value()).sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesResult {
    pub challenger: String,
    /// Opponent name as played, suffixed when the fallback mover stood in
    pub opponent: String,
    pub outcomes: Vec<GameOutcome>,
    pub score: i32,
    /// The challenger could not be loaded; no games were played
    pub forfeited: bool,
    pub opponent_fallback: bool,
}

impl SeriesResult {
    /// A strictly positive sum is required; ties do not tip the series
    pub fn challenger_won(&self) -> bool {
        !self.forfeited && self.score > 0
    }

    pub fn wins(&self) -> usize {
        self.count(GameOutcome::Win)
    }

    pub fn losses(&self) -> usize {
        self.count(GameOutcome::Loss)
    }

    pub fn ties(&self) -> usize {
        self.count(GameOutcome::Tie)
    }

    fn count(&self, outcome: GameOutcome) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }
}

pub struct SeriesRunner<'a> {
    rules: GameRules,
    games: usize,
    sandbox: &'a dyn StrategySandbox,
    logger: Option<&'a mut MatchLogger>,
}

impl<'a> SeriesRunner<'a> {
    pub fn new(rules: GameRules, games: usize, sandbox: &'a dyn StrategySandbox) -> Self {
        SeriesRunner {
            rules,
            games,
            sandbox,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: &'a mut MatchLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Plays the whole series; every random choice derives from `seed`
    ///
    /// Only an environment that cannot place its snakes is an error.
    pub fn run(
        &mut self,
        challenger: &Contestant,
        opponent: &Contestant,
        seed: u64,
    ) -> Result<SeriesResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        let challenger_seed: u64 = rng.random();
        let opponent_seed: u64 = rng.random();

        let mut challenger_strategy = match self.sandbox.load(&challenger.source, challenger_seed)
        {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!(
                    "Challenger '{}' failed to load, forfeiting series: {}",
                    challenger.name, e
                );
                return Ok(SeriesResult {
                    challenger: challenger.name.clone(),
                    opponent: opponent.name.clone(),
                    outcomes: Vec::new(),
                    score: 0,
                    forfeited: true,
                    opponent_fallback: false,
                });
            }
        };

        let (mut opponent_strategy, opponent_name, opponent_fallback) =
            match self.sandbox.load(&opponent.source, opponent_seed) {
                Ok(strategy) => (strategy, opponent.name.clone(), false),
                Err(e) => {
                    warn!(
                        "Opponent '{}' failed to load, substituting random mover: {}",
                        opponent.name, e
                    );
                    let fallback: Box<dyn Strategy> = Box::new(RandomMove::new(opponent_seed));
                    (fallback, format!("{}_DummyFallback", opponent.name), true)
                }
            };

        let label = format!("{} vs {}", challenger.name, opponent_name);
        let mut env = MatchEnvironment::new(self.rules, seed)?;
        let mut outcomes = Vec::with_capacity(self.games);

        for game in 0..self.games {
            let game_seed: u64 = rng.random();
            let move_seed: u64 = rng.random();
            let outcome = self.play_game(
                &mut env,
                &label,
                game,
                (game_seed, move_seed),
                challenger_strategy.as_mut(),
                opponent_strategy.as_mut(),
            )?;
            debug!(
                "{} game {}: {:?} after {} ticks (scores {}-{})",
                label,
                game + 1,
                outcome,
                env.steps(),
                env.challenger().score(),
                env.opponent().score()
            );
            outcomes.push(outcome);
        }

        let score = series_score(&outcomes);
        let result = SeriesResult {
            challenger: challenger.name.clone(),
            opponent: opponent_name,
            outcomes,
            score,
            forfeited: false,
            opponent_fallback,
        };
        info!(
            "Series {}: {}W/{}L/{}T, score {} ({})",
            label,
            result.wins(),
            result.losses(),
            result.ties(),
            result.score,
            if result.challenger_won() { "challenger wins" } else { "challenger does not win" }
        );
        Ok(result)
    }

    fn play_game(
        &mut self,
        env: &mut MatchEnvironment,
        label: &str,
        game: usize,
        (game_seed, move_seed): (u64, u64),
        challenger: &mut dyn Strategy,
        opponent: &mut dyn Strategy,
    ) -> Result<GameOutcome> {
        env.reseed(game_seed);
        env.reset()?;
        let mut move_rng = StdRng::seed_from_u64(move_seed);

        while !env.is_over() {
            let a = decide(
                challenger,
                env.challenger(),
                Some(env.opponent()),
                env.food_list(),
                &mut move_rng,
            );
            let b = decide(
                opponent,
                env.opponent(),
                Some(env.challenger()),
                env.food_list(),
                &mut move_rng,
            );
            let report = env.step(a.direction(), b.direction());

            if let Some(logger) = self.logger.as_deref_mut() {
                if logger.is_enabled() {
                    let entry = MatchLogEntry::capture(label, game, game_seed, env, (&a, &b), report);
                    logger.log_tick(&entry);
                }
            }
        }

        Ok(judge_game(env.challenger(), env.opponent()))
    }
}
