// Toroidal coordinate arithmetic
//
// Every coordinate operation on the board is taken modulo the grid dimensions,
// so moving off one edge re-enters from the opposite edge.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Position};

/// Fixed board dimensions for a run
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Grid { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Brings any coordinate back onto the board
    pub fn wrap_position(&self, p: Position) -> Position {
        Position {
            x: wrap(p.x, self.width),
            y: wrap(p.y, self.height),
        }
    }

    /// The wrapped neighbour of `p` in direction `d`
    pub fn step(&self, p: Position, d: Direction) -> Position {
        let (dx, dy) = d.delta();
        self.wrap_position(Position {
            x: p.x + dx,
            y: p.y + dy,
        })
    }

    /// Wrapped Manhattan distance between two cells
    pub fn manhattan_wrapped(&self, p: Position, q: Position) -> i32 {
        minimal_axis_distance(p.x, q.x, self.width) + minimal_axis_distance(p.y, q.y, self.height)
    }

    /// Every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position { x, y }))
    }
}

/// `x mod dim`, always non-negative
pub fn wrap(x: i32, dim: i32) -> i32 {
    x.rem_euclid(dim)
}

/// Shortest distance between two coordinates on one wrapping axis
pub fn minimal_axis_distance(a: i32, b: i32, dim: i32) -> i32 {
    let direct = (wrap(a, dim) - wrap(b, dim)).abs();
    direct.min(dim - direct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_handles_negative_and_overflow() {
        assert_eq!(wrap(-1, 20), 19);
        assert_eq!(wrap(20, 20), 0);
        assert_eq!(wrap(41, 20), 1);
        assert_eq!(wrap(-21, 20), 19);
    }

    #[test]
    fn test_wrap_is_idempotent_over_full_turns() {
        for dim in 1..8 {
            for p in -30..30 {
                assert_eq!(wrap(wrap(p + dim, dim), dim), wrap(p, dim));
                assert_eq!(wrap(wrap(p, dim), dim), wrap(p, dim));
            }
        }
    }

    #[test]
    fn test_minimal_axis_distance_goes_around_the_edge() {
        assert_eq!(minimal_axis_distance(0, 19, 20), 1);
        assert_eq!(minimal_axis_distance(2, 7, 20), 5);
        assert_eq!(minimal_axis_distance(0, 10, 20), 10);
        assert_eq!(minimal_axis_distance(3, 3, 20), 0);
    }

    #[test]
    fn test_manhattan_wrapped_to_self_is_zero() {
        let grid = Grid::new(20, 10);
        for p in grid.cells() {
            assert_eq!(grid.manhattan_wrapped(p, p), 0);
        }
    }

    #[test]
    fn test_manhattan_wrapped_is_symmetric() {
        let grid = Grid::new(7, 5);
        let a = Position::new(0, 4);
        let b = Position::new(6, 1);
        assert_eq!(grid.manhattan_wrapped(a, b), 1 + 2);
        assert_eq!(grid.manhattan_wrapped(a, b), grid.manhattan_wrapped(b, a));
    }

    #[test]
    fn test_step_wraps_on_every_edge() {
        let grid = Grid::new(20, 10);
        assert_eq!(grid.step(Position::new(0, 0), Direction::Up), Position::new(0, 9));
        assert_eq!(grid.step(Position::new(0, 0), Direction::Left), Position::new(19, 0));
        assert_eq!(grid.step(Position::new(19, 9), Direction::Right), Position::new(0, 9));
        assert_eq!(grid.step(Position::new(19, 9), Direction::Down), Position::new(19, 0));
    }

    #[test]
    fn test_cells_covers_grid_once() {
        let grid = Grid::new(4, 3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), grid.cell_count());
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(cells[11], Position::new(3, 2));
    }
}
