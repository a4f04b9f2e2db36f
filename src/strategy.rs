// Decision functions
//
// A strategy sees its own snake, the opponent (possibly dead or absent), the food list
// and the grid dimensions, and answers with a direction index in 0..=3. The engine
// never trusts the answer: see `invocation`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::food::Food;
use crate::snake::Snake;
use crate::types::{Direction, Position};

/// The fixed-signature decision callback evaluated by the engine
pub trait Strategy {
    /// Returns a direction index; `Err` reports a runtime failure
    fn choose_action(
        &mut self,
        me: &Snake,
        opponent: Option<&Snake>,
        food: &[Food],
        grid_width: i32,
        grid_height: i32,
    ) -> Result<i32, String>;
}

struct FnStrategy<F>(F);

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(&Snake, Option<&Snake>, &[Food], i32, i32) -> Result<i32, String>,
{
    fn choose_action(
        &mut self,
        me: &Snake,
        opponent: Option<&Snake>,
        food: &[Food],
        grid_width: i32,
        grid_height: i32,
    ) -> Result<i32, String> {
        (self.0)(me, opponent, food, grid_width, grid_height)
    }
}

/// Wraps a closure as a strategy
pub fn from_fn<F>(f: F) -> Box<dyn Strategy>
where
    F: FnMut(&Snake, Option<&Snake>, &[Food], i32, i32) -> Result<i32, String> + 'static,
{
    Box::new(FnStrategy(f))
}

/// Always the first valid action in index order
pub struct FirstValid;

impl Strategy for FirstValid {
    fn choose_action(
        &mut self,
        me: &Snake,
        _opponent: Option<&Snake>,
        _food: &[Food],
        _grid_width: i32,
        _grid_height: i32,
    ) -> Result<i32, String> {
        me.valid_actions()
            .first()
            .map(|d| d.index())
            .ok_or_else(|| "no valid actions".to_string())
    }
}

/// Uniformly random valid action
pub struct RandomMove {
    rng: StdRng,
}

impl RandomMove {
    pub fn new(seed: u64) -> Self {
        RandomMove {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomMove {
    fn choose_action(
        &mut self,
        me: &Snake,
        _opponent: Option<&Snake>,
        _food: &[Food],
        _grid_width: i32,
        _grid_height: i32,
    ) -> Result<i32, String> {
        let valid = me.valid_actions();
        if valid.is_empty() {
            return Ok(me.direction().index());
        }
        Ok(valid[self.rng.random_range(0..valid.len())].index())
    }
}

/// Heads for the food by wrapped distance, random when there is none
pub struct FoodSeeker {
    rng: StdRng,
}

impl FoodSeeker {
    pub fn new(seed: u64) -> Self {
        FoodSeeker {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for FoodSeeker {
    fn choose_action(
        &mut self,
        me: &Snake,
        _opponent: Option<&Snake>,
        food: &[Food],
        _grid_width: i32,
        _grid_height: i32,
    ) -> Result<i32, String> {
        let valid = me.valid_actions();
        if valid.is_empty() {
            return Ok(me.direction().index());
        }

        if let Some(target) = food.first() {
            if let Some(best) = closest_to(me, &valid, target.position) {
                return Ok(best.index());
            }
        }

        Ok(valid[self.rng.random_range(0..valid.len())].index())
    }
}

/// Avoids cells that kill next tick, then seeks food
///
/// A cell is unsafe if either body covers it (own tail excepted when not growing) or
/// it touches the head of an opponent at least as long.
pub struct Cautious;

impl Cautious {
    fn is_safe(me: &Snake, opponent: Option<&Snake>, cell: Position) -> bool {
        let grid = me.grid();
        if me.contains(&cell) && (me.is_growing() || cell != me.tail()) {
            return false;
        }
        if let Some(other) = opponent.filter(|o| o.is_alive()) {
            if other.contains(&cell) && (other.is_growing() || cell != other.tail()) {
                return false;
            }
            let contested = Direction::all()
                .into_iter()
                .any(|d| grid.step(other.head(), d) == cell);
            if contested && other.target_length() >= me.target_length() {
                return false;
            }
        }
        true
    }
}

impl Strategy for Cautious {
    fn choose_action(
        &mut self,
        me: &Snake,
        opponent: Option<&Snake>,
        food: &[Food],
        _grid_width: i32,
        _grid_height: i32,
    ) -> Result<i32, String> {
        let valid = me.valid_actions();
        let Some(&fallback) = valid.first() else {
            return Ok(me.direction().index());
        };

        let grid = me.grid();
        let safe: Vec<Direction> = valid
            .iter()
            .copied()
            .filter(|&d| Self::is_safe(me, opponent, grid.step(me.head(), d)))
            .collect();
        let candidates = if safe.is_empty() { &valid } else { &safe };

        let choice = match food.first() {
            Some(target) => closest_to(me, candidates, target.position),
            None => candidates.first().copied(),
        };
        Ok(choice.unwrap_or(fallback).index())
    }
}

/// The candidate whose next cell is nearest `target`; ties keep index order
fn closest_to(me: &Snake, candidates: &[Direction], target: Position) -> Option<Direction> {
    let grid = me.grid();
    candidates
        .iter()
        .copied()
        .min_by_key(|&d| grid.manhattan_wrapped(grid.step(me.head(), d), target))
}
