// Match environment: two snakes, at most one food, advanced one synchronized tick at a time
//
// Tick order is fixed:
// 1. no-op when already over
// 2. bump the step counter
// 3. move challenger then opponent, each from its own pre-tick state
// 4. head-on resolution (shorter dies, equal length both die)
// 5. head-into-body resolution, both directions independently
// 6. food consumption, challenger checked first, then respawn
// 7. terminal check (a death or the step cap)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GauntletError, Result};
use crate::food::{spawn_food, Food};
use crate::grid::Grid;
use crate::snake::{MoveOutcome, Snake};
use crate::types::{Direction, Position, Side};

const RANDOM_PLACEMENT_ATTEMPTS: usize = 1000;

/// Immutable rules shared by every game of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub grid: Grid,
    pub initial_snake_length: usize,
    pub max_snake_length: usize,
    pub max_steps: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Over,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    SelfCollision,
    HeadOn,
    BodyCollision,
}

/// What happened during one call to [`MatchEnvironment::step`]
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub over: bool,
    pub challenger_died: bool,
    pub opponent_died: bool,
    pub challenger_cause: Option<DeathCause>,
    pub opponent_cause: Option<DeathCause>,
    pub eaten_by: Option<Side>,
}

pub struct MatchEnvironment {
    rules: GameRules,
    challenger: Snake,
    opponent: Snake,
    food: Option<Food>,
    steps: u32,
    phase: Phase,
    rng: StdRng,
}

impl MatchEnvironment {
    /// Creates an environment and performs the first reset
    pub fn new(rules: GameRules, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (challenger, opponent) = place_snakes(&rules, &mut rng)?;
        let food = spawn_food(&rules.grid, &[&challenger, &opponent], &mut rng);
        Ok(MatchEnvironment {
            rules,
            challenger,
            opponent,
            food,
            steps: 0,
            phase: Phase::Active,
            rng,
        })
    }

    /// Builds an active environment from a hand-made position
    pub fn with_snakes(
        rules: GameRules,
        challenger: Snake,
        opponent: Snake,
        food: Option<Food>,
        seed: u64,
    ) -> Self {
        MatchEnvironment {
            rules,
            challenger,
            opponent,
            food,
            steps: 0,
            phase: Phase::Active,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restarts the random stream used by `reset` and food spawning
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Discards both snakes, places fresh non-overlapping ones and spawns food
    pub fn reset(&mut self) -> Result<()> {
        let (challenger, opponent) = place_snakes(&self.rules, &mut self.rng)?;
        self.challenger = challenger;
        self.opponent = opponent;
        self.food = None;
        self.steps = 0;
        self.phase = Phase::Active;
        self.respawn_food();
        Ok(())
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn challenger(&self) -> &Snake {
        &self.challenger
    }

    pub fn opponent(&self) -> &Snake {
        &self.opponent
    }

    pub fn snake(&self, side: Side) -> &Snake {
        match side {
            Side::Challenger => &self.challenger,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn food(&self) -> Option<&Food> {
        self.food.as_ref()
    }

    /// Food as a list of zero or one items
    pub fn food_list(&self) -> &[Food] {
        self.food.as_slice()
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    /// Advances one tick with both snakes' chosen actions
    pub fn step(&mut self, challenger_action: Direction, opponent_action: Direction) -> StepReport {
        if self.phase == Phase::Over {
            return StepReport {
                over: true,
                challenger_died: !self.challenger.is_alive(),
                opponent_died: !self.opponent.is_alive(),
                ..StepReport::default()
            };
        }

        self.steps += 1;
        let mut report = StepReport::default();

        if self.challenger.advance(challenger_action) == MoveOutcome::SelfCollision {
            report.challenger_cause = Some(DeathCause::SelfCollision);
        }
        if self.opponent.advance(opponent_action) == MoveOutcome::SelfCollision {
            report.opponent_cause = Some(DeathCause::SelfCollision);
        }

        if self.challenger.is_alive() && self.opponent.is_alive() {
            let challenger_head = self.challenger.head();
            let opponent_head = self.opponent.head();

            if challenger_head == opponent_head {
                let a = self.challenger.target_length();
                let b = self.opponent.target_length();
                if a <= b {
                    self.challenger.kill();
                    report.challenger_cause = Some(DeathCause::HeadOn);
                }
                if b <= a {
                    self.opponent.kill();
                    report.opponent_cause = Some(DeathCause::HeadOn);
                }
            } else {
                // heads differ, so hitting any occupied cell means hitting the body
                let challenger_hit = self.opponent.contains(&challenger_head);
                let opponent_hit = self.challenger.contains(&opponent_head);
                if challenger_hit {
                    self.challenger.kill();
                    report.challenger_cause = Some(DeathCause::BodyCollision);
                }
                if opponent_hit {
                    self.opponent.kill();
                    report.opponent_cause = Some(DeathCause::BodyCollision);
                }
            }
        }

        if let Some(food) = self.food {
            if self.challenger.is_alive() && self.challenger.head() == food.position {
                self.challenger.grow();
                report.eaten_by = Some(Side::Challenger);
            } else if self.opponent.is_alive() && self.opponent.head() == food.position {
                self.opponent.grow();
                report.eaten_by = Some(Side::Opponent);
            }

            if report.eaten_by.is_some() {
                self.food = None;
                self.respawn_food();
            }
        }

        if !self.challenger.is_alive()
            || !self.opponent.is_alive()
            || self.steps >= self.rules.max_steps
        {
            self.phase = Phase::Over;
        }

        report.over = self.phase == Phase::Over;
        report.challenger_died = report.challenger_cause.is_some();
        report.opponent_died = report.opponent_cause.is_some();
        report
    }

    /// Spawns food only while none exists
    fn respawn_food(&mut self) {
        if self.food.is_some() {
            return;
        }
        self.food = spawn_food(
            &self.rules.grid,
            &[&self.challenger, &self.opponent],
            &mut self.rng,
        );
    }
}

fn random_snake<R: Rng + ?Sized>(rules: &GameRules, rng: &mut R) -> Snake {
    let head = Position::new(
        rng.random_range(0..rules.grid.width),
        rng.random_range(0..rules.grid.height),
    );
    let direction = Direction::all()[rng.random_range(0..4usize)];
    Snake::spawn(
        head,
        direction,
        rules.initial_snake_length,
        rules.max_snake_length,
        rules.grid,
    )
}

fn overlaps(a: &Snake, b: &Snake) -> bool {
    b.body().iter().any(|p| a.contains(p))
}

/// Places two non-overlapping snakes, randomly first, then by exhaustive scan
fn place_snakes<R: Rng + ?Sized>(rules: &GameRules, rng: &mut R) -> Result<(Snake, Snake)> {
    for _ in 0..RANDOM_PLACEMENT_ATTEMPTS {
        let challenger = random_snake(rules, rng);
        let opponent = random_snake(rules, rng);
        if !overlaps(&challenger, &opponent) {
            return Ok((challenger, opponent));
        }
    }

    let spawn = |head: Position, direction: Direction| {
        Snake::spawn(
            head,
            direction,
            rules.initial_snake_length,
            rules.max_snake_length,
            rules.grid,
        )
    };
    for a_head in rules.grid.cells() {
        for a_dir in Direction::all() {
            let challenger = spawn(a_head, a_dir);
            for b_head in rules.grid.cells() {
                for b_dir in Direction::all() {
                    let opponent = spawn(b_head, b_dir);
                    if !overlaps(&challenger, &opponent) {
                        return Ok((challenger, opponent));
                    }
                }
            }
        }
    }

    Err(GauntletError::Placement {
        width: rules.grid.width,
        height: rules.grid.height,
        length: rules.initial_snake_length,
    })
}

impl fmt::Display for MatchEnvironment {
    /// `C`/`o` challenger head/body, `O`/`x` opponent head/body, `X` dead head, `F` food
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.rules.grid;
        let mut cells = vec![vec!['.'; grid.width as usize]; grid.height as usize];

        if let Some(food) = self.food {
            cells[food.position.y as usize][food.position.x as usize] = 'F';
        }
        for (snake, head, body) in [(&self.opponent, 'O', 'x'), (&self.challenger, 'C', 'o')] {
            if snake.is_alive() {
                for (i, p) in snake.body().iter().enumerate() {
                    cells[p.y as usize][p.x as usize] = if i == 0 { head } else { body };
                }
            } else if !snake.is_empty() {
                let p = snake.head();
                cells[p.y as usize][p.x as usize] = 'X';
            }
        }

        writeln!(f, "Step: {}/{}", self.steps, self.rules.max_steps)?;
        writeln!(f, "+{}+", "-".repeat(grid.width as usize))?;
        for row in cells {
            writeln!(f, "|{}|", row.into_iter().collect::<String>())?;
        }
        write!(f, "+{}+", "-".repeat(grid.width as usize))
    }
}
