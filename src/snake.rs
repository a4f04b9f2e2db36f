// Snake entity: body, heading, growth and self-collision

use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;
use crate::types::{Direction, Position};

/// Result of asking a snake to move one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Head advanced, tail dropped if the snake is at its target length
    Moved,
    /// The new head landed on the snake's own body; the snake is now dead
    SelfCollision,
    /// The snake was already dead and did nothing
    Inert,
}

/// A snake on a toroidal grid
///
/// `body` is head first. `occupied` mirrors `body` for O(1) membership tests and is
/// rebuilt alongside every mutation of `body`.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    occupied: HashSet<Position>,
    direction: Direction,
    target_length: usize,
    max_length: usize,
    score: u32,
    alive: bool,
    grid: Grid,
}

impl Snake {
    /// Lays out a straight snake of `initial_length` cells trailing behind `head`,
    /// opposite to `direction`. Stops early if the layout would wrap onto itself.
    pub fn spawn(
        head: Position,
        direction: Direction,
        initial_length: usize,
        max_length: usize,
        grid: Grid,
    ) -> Self {
        let head = grid.wrap_position(head);
        let mut body = VecDeque::with_capacity(initial_length);
        let mut occupied = HashSet::with_capacity(initial_length);
        body.push_back(head);
        occupied.insert(head);

        let behind = direction.opposite();
        let mut current = head;
        for _ in 1..initial_length {
            let next = grid.step(current, behind);
            if !occupied.insert(next) {
                break;
            }
            body.push_back(next);
            current = next;
        }

        // the head is always laid, so a zero length still yields one cell
        let target_length = initial_length.min(max_length).max(body.len());
        Snake {
            body,
            occupied,
            direction,
            target_length,
            max_length,
            score: 0,
            alive: true,
            grid,
        }
    }

    /// Builds a snake from an explicit body (head first)
    ///
    /// Returns `None` for an empty body, a body with repeated cells, or a body
    /// longer than `target_length`.
    pub fn from_body(
        body: Vec<Position>,
        direction: Direction,
        target_length: usize,
        max_length: usize,
        grid: Grid,
    ) -> Option<Self> {
        if body.is_empty() || body.len() > target_length {
            return None;
        }
        let body: VecDeque<Position> = body.into_iter().map(|p| grid.wrap_position(p)).collect();
        let occupied: HashSet<Position> = body.iter().copied().collect();
        if occupied.len() != body.len() {
            return None;
        }
        Some(Snake {
            body,
            occupied,
            direction,
            target_length,
            max_length,
            score: 0,
            alive: true,
            grid,
        })
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn contains(&self, p: &Position) -> bool {
        self.occupied.contains(p)
    }

    /// True when the tail cell will stay put on the next move
    pub fn is_growing(&self) -> bool {
        self.body.len() < self.target_length
    }

    /// Every direction except the reversal of the current heading; empty when dead
    pub fn valid_actions(&self) -> Vec<Direction> {
        if !self.alive {
            return vec![];
        }
        let reverse = self.direction.opposite();
        Direction::all()
            .into_iter()
            .filter(|&d| d != reverse)
            .collect()
    }

    pub fn is_valid_action(&self, d: Direction) -> bool {
        self.alive && d != self.direction.opposite()
    }

    /// Advances the head one cell in `action`
    ///
    /// No legality check is done here. The tail cell counts as free only when the
    /// snake is not growing, decided from the length before this move.
    pub fn advance(&mut self, action: Direction) -> MoveOutcome {
        if !self.alive {
            return MoveOutcome::Inert;
        }

        self.direction = action;
        let new_head = self.grid.step(self.head(), action);

        let tail_vacates = self.body.len() >= self.target_length;
        let hits_body = self.occupied.contains(&new_head) && !(tail_vacates && new_head == self.tail());
        if hits_body {
            self.alive = false;
            return MoveOutcome::SelfCollision;
        }

        if self.body.len() >= self.target_length {
            if let Some(old_tail) = self.body.pop_back() {
                self.occupied.remove(&old_tail);
            }
        }
        self.body.push_front(new_head);
        self.occupied.insert(new_head);
        MoveOutcome::Moved
    }

    /// Eats one food: raises the target length (capped) and the score
    pub fn grow(&mut self) {
        if !self.alive {
            return;
        }
        self.target_length = (self.target_length + 1).min(self.max_length);
        self.score += 1;
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(20, 10)
    }

    #[test]
    fn test_spawn_trails_behind_head() {
        let snake = Snake::spawn(Position::new(5, 5), Direction::Right, 5, 100, grid());
        let body: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(
            body,
            vec![
                Position::new(5, 5),
                Position::new(4, 5),
                Position::new(3, 5),
                Position::new(2, 5),
                Position::new(1, 5),
            ]
        );
        assert_eq!(snake.target_length(), 5);
        assert!(snake.is_alive());
    }

    #[test]
    fn test_spawn_wraps_and_truncates_on_self_overlap() {
        // height 3 cannot hold a vertical snake of 5 without overlapping itself
        let snake = Snake::spawn(Position::new(0, 0), Direction::Down, 5, 100, Grid::new(4, 3));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.body()[1], Position::new(0, 2));
        assert_eq!(snake.target_length(), 5);
    }

    #[test]
    fn test_valid_actions_exclude_reversal() {
        let snake = Snake::spawn(Position::new(5, 5), Direction::Up, 3, 100, grid());
        let valid = snake.valid_actions();
        assert_eq!(valid.len(), 3);
        assert!(!valid.contains(&Direction::Down));
        for h in Direction::all() {
            let s = Snake::spawn(Position::new(5, 5), h, 3, 100, grid());
            assert!(!s.valid_actions().contains(&h.opposite()));
        }
    }

    #[test]
    fn test_dead_snake_has_no_valid_actions_and_ignores_moves() {
        let mut snake = Snake::spawn(Position::new(5, 5), Direction::Up, 3, 100, grid());
        snake.kill();
        assert!(snake.valid_actions().is_empty());
        let before: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(snake.advance(Direction::Left), MoveOutcome::Inert);
        let after: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(before, after);
        snake.grow();
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn test_move_drops_tail_at_target_length() {
        let mut snake = Snake::spawn(Position::new(5, 5), Direction::Right, 3, 100, grid());
        assert_eq!(snake.advance(Direction::Right), MoveOutcome::Moved);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));
        assert_eq!(snake.tail(), Position::new(4, 5));
        assert!(!snake.contains(&Position::new(3, 5)));
    }

    #[test]
    fn test_grow_keeps_tail_for_one_move() {
        let mut snake = Snake::spawn(Position::new(5, 5), Direction::Right, 3, 100, grid());
        snake.grow();
        assert_eq!(snake.score(), 1);
        assert_eq!(snake.target_length(), 4);
        snake.advance(Direction::Right);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Position::new(3, 5));
    }

    #[test]
    fn test_grow_is_capped() {
        let mut snake = Snake::spawn(Position::new(5, 5), Direction::Right, 3, 4, grid());
        snake.grow();
        snake.grow();
        assert_eq!(snake.target_length(), 4);
        assert_eq!(snake.score(), 2);
    }

    // A 2x2 loop: head (1,0), then (1,1), (0,1), tail (0,0). Moving left from the head
    // re-enters the current tail cell.
    fn loop_snake(target_length: usize) -> Snake {
        Snake::from_body(
            vec![
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
                Position::new(0, 0),
            ],
            Direction::Up,
            target_length,
            100,
            grid(),
        )
        .unwrap()
    }

    #[test]
    fn test_moving_into_vacating_tail_survives() {
        let mut snake = loop_snake(4);
        assert_eq!(snake.advance(Direction::Left), MoveOutcome::Moved);
        assert!(snake.is_alive());
        assert_eq!(snake.head(), Position::new(0, 0));
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn test_moving_into_tail_while_growing_dies() {
        let mut snake = loop_snake(5);
        assert_eq!(snake.advance(Direction::Left), MoveOutcome::SelfCollision);
        assert!(!snake.is_alive());
        // body shape retained for diagnostics
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.direction(), Direction::Left);
    }

    #[test]
    fn test_zero_length_spawn_keeps_body_within_target() {
        let snake = Snake::spawn(Position::new(5, 5), Direction::Right, 0, 100, grid());
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.target_length(), 1);
        assert!(snake.len() <= snake.target_length());
    }

    #[test]
    fn test_reversal_into_neck_is_fatal() {
        let mut snake = Snake::spawn(Position::new(5, 5), Direction::Right, 3, 100, grid());
        assert_eq!(snake.advance(Direction::Left), MoveOutcome::SelfCollision);
    }

    #[test]
    fn test_from_body_rejects_bad_bodies() {
        assert!(Snake::from_body(vec![], Direction::Up, 3, 100, grid()).is_none());
        let dup = vec![Position::new(1, 1), Position::new(1, 1)];
        assert!(Snake::from_body(dup, Direction::Up, 3, 100, grid()).is_none());
        let long = vec![Position::new(1, 1), Position::new(1, 2)];
        assert!(Snake::from_body(long, Direction::Up, 1, 100, grid()).is_none());
    }

    #[test]
    fn test_single_cell_snake_can_reverse_safely() {
        let mut snake = Snake::from_body(vec![Position::new(3, 3)], Direction::Up, 1, 100, grid()).unwrap();
        assert_eq!(snake.advance(Direction::Down), MoveOutcome::Moved);
        assert_eq!(snake.head(), Position::new(3, 4));
    }
}
