// Food entity and spawn policy

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::snake::Snake;
use crate::types::Position;

/// A single food item
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
}

/// Picks a cell uniformly among those not covered by any of `snakes`
///
/// Returns `None` when every cell is occupied; food absence is a valid transient state.
pub fn spawn_food<R: Rng + ?Sized>(grid: &Grid, snakes: &[&Snake], rng: &mut R) -> Option<Food> {
    let empty: Vec<Position> = grid
        .cells()
        .filter(|cell| !snakes.iter().any(|snake| snake.contains(cell)))
        .collect();

    if empty.is_empty() {
        return None;
    }

    let position = empty[rng.random_range(0..empty.len())];
    Some(Food { position })
}
