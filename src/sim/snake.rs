//! The snake entity: body segments, turn rules, growth

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::grid::{Cell, Direction, GridBounds};
use crate::consts::INITIAL_SNAKE_LEN;

/// Ordered body segments, head first. Turns are double-buffered: the pending
/// direction is applied at the start of the next step, so rapid key presses
/// between steps each overwrite the pending slot and the last legal one wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
    pending: Direction,
    growing: bool,
}

impl Snake {
    /// Spawn with `INITIAL_SNAKE_LEN` segments, head at `head`, trailing away
    /// from the movement direction.
    pub fn new(head: Cell, direction: Direction) -> Self {
        let back = direction.opposite().vector();
        let body = (0..INITIAL_SNAKE_LEN as i32)
            .map(|i| head + back * i)
            .collect();
        Self {
            body,
            direction,
            pending: direction,
            growing: false,
        }
    }

    /// Rebuild from recorded segments (replay start).
    pub fn from_segments(segments: Vec<Cell>, direction: Direction) -> Self {
        Self {
            body: segments.into(),
            direction,
            pending: direction,
            growing: false,
        }
    }

    pub fn head(&self) -> Cell {
        // Body is never empty by construction
        *self.body.front().unwrap_or(&Cell::ZERO)
    }

    pub fn tail(&self) -> Cell {
        *self.body.back().unwrap_or(&Cell::ZERO)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending(&self) -> Direction {
        self.pending
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Queue a turn. Rejected (returns false, nothing changes) iff `dir`
    /// reverses the *current* heading; a queued-but-unapplied turn can still
    /// be redirected up to 90°.
    pub fn set_direction(&mut self, dir: Direction) -> bool {
        if dir == self.direction.opposite() {
            return false;
        }
        self.pending = dir;
        true
    }

    /// Flag the snake to keep its tail on the next step. Idempotent: calling
    /// it several times before one step still grows by exactly one.
    pub fn grow(&mut self) {
        self.growing = true;
    }

    /// Advance one cell: pending becomes current, head is prepended, tail is
    /// popped unless growth was pending.
    pub fn step(&mut self) {
        self.direction = self.pending;
        let new_head = self.head() + self.direction.vector();
        self.body.push_front(new_head);
        if self.growing {
            self.growing = false;
        } else {
            self.body.pop_back();
        }
    }

    /// Head left the board or landed on another segment.
    pub fn check_collision(&self, bounds: GridBounds) -> bool {
        let head = self.head();
        if !bounds.contains(head) {
            return true;
        }
        self.body.iter().skip(1).any(|&seg| seg == head)
    }

    /// Drop segments from the tail down to `target_len` (Shrink power-up).
    pub fn truncate(&mut self, target_len: usize) {
        let target = target_len.max(INITIAL_SNAKE_LEN);
        while self.body.len() > target {
            self.body.pop_back();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_facing_right() -> Snake {
        Snake::new(Cell::new(10, 10), Direction::Right)
    }

    #[test]
    fn test_initial_layout() {
        let s = snake_facing_right();
        let segs: Vec<Cell> = s.segments().collect();
        assert_eq!(
            segs,
            vec![Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]
        );
        assert_eq!(s.direction(), Direction::Right);
    }

    #[test]
    fn test_reverse_turn_rejected() {
        let mut s = snake_facing_right();
        assert!(!s.set_direction(Direction::Left));
        assert_eq!(s.pending(), Direction::Right);
        assert!(s.set_direction(Direction::Down));
        assert!(s.set_direction(Direction::Up));
        assert_eq!(s.pending(), Direction::Up);
    }

    #[test]
    fn test_opposite_inputs_before_step_keep_first_legal() {
        // Moving right; queue up then down. Down is legal relative to the
        // *current* heading (right), so it overwrites the queued up-turn.
        let mut s = snake_facing_right();
        assert!(s.set_direction(Direction::Up));
        assert!(s.set_direction(Direction::Down));
        assert_eq!(s.pending(), Direction::Down);
        // But moving up, a queued 90° turn does not unlock a reversal.
        let mut s = Snake::new(Cell::new(5, 5), Direction::Up);
        assert!(s.set_direction(Direction::Left));
        assert!(!s.set_direction(Direction::Down));
        assert_eq!(s.pending(), Direction::Left);
    }

    #[test]
    fn test_step_moves_head_and_tail() {
        let mut s = snake_facing_right();
        s.step();
        assert_eq!(s.head(), Cell::new(11, 10));
        assert_eq!(s.len(), 3);
        assert_eq!(s.tail(), Cell::new(9, 10));
    }

    #[test]
    fn test_growth_is_idempotent() {
        let mut s = snake_facing_right();
        s.grow();
        s.grow();
        s.grow();
        s.step();
        assert_eq!(s.len(), 4);
        s.step();
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_wall_collision() {
        let bounds = GridBounds::new(12, 12);
        let mut s = snake_facing_right();
        assert!(!s.check_collision(bounds));
        s.step(); // head at 11
        assert!(!s.check_collision(bounds));
        s.step(); // head at 12, out of bounds
        assert!(s.check_collision(bounds));
    }

    #[test]
    fn test_self_collision() {
        let bounds = GridBounds::new(30, 30);
        let mut s = snake_facing_right();
        // Grow long enough to loop back into the body
        for _ in 0..3 {
            s.grow();
            s.step();
        }
        s.set_direction(Direction::Down);
        s.step();
        s.set_direction(Direction::Left);
        s.step();
        s.set_direction(Direction::Up);
        s.step(); // head re-enters the segment directly behind the old head
        assert!(s.check_collision(bounds));
    }

    #[test]
    fn test_truncate_never_below_start_length() {
        let mut s = snake_facing_right();
        for _ in 0..5 {
            s.grow();
            s.step();
        }
        assert_eq!(s.len(), 8);
        s.truncate(4);
        assert_eq!(s.len(), 4);
        s.truncate(0);
        assert_eq!(s.len(), INITIAL_SNAKE_LEN);
    }
}
