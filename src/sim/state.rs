//! Game state and lifecycle types
//!
//! The simulation is pure: everything the renderer or storage layer needs is
//! read out of `GameState` snapshots and the per-step `GameEvent` stream.
//! Side effects (sound, DOM, persistence) live in the orchestrator adapters.

use serde::{Deserialize, Serialize};

use super::food::{ActiveEffect, Food, SpecialFood};
use super::grid::{Cell, Direction, GridBounds};
use super::obstacle::ObstacleManager;
use super::rng::GameRng;
use super::snake::Snake;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, waiting for the first input
    Ready,
    /// Active gameplay (live or replay-driven)
    Running,
    /// Frozen; stepping and replay cursors hold still
    Paused,
    /// Run ended
    GameOver,
}

/// What happened during one logical step. The orchestrator maps these to
/// sounds, HUD updates and storage writes; the core never performs those
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    AteFood,
    AteSpecialFood(super::food::PowerUpKind),
    ObstaclesSpawned(usize),
    EffectExpired,
    Died,
}

/// Complete simulation state for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed, kept for the replay log
    pub seed: u32,
    pub rng: GameRng,
    pub bounds: GridBounds,
    pub snake: Snake,
    pub food: Food,
    pub special_food: Option<SpecialFood>,
    pub obstacles: ObstacleManager,
    pub effect: Option<ActiveEffect>,
    pub score: u32,
    /// Logical step counter
    pub ticks: u64,
    pub phase: GamePhase,
}

impl GameState {
    /// Fresh session: 3-segment snake at the board center moving right, food
    /// placed from the seeded stream.
    pub fn new(seed: u32, bounds: GridBounds) -> Self {
        let head = Cell::new(bounds.width / 2, bounds.height / 2);
        Self::with_snake(seed, bounds, Snake::new(head, Direction::Right))
    }

    /// Session from recorded initial state (replay start).
    pub fn from_replay_start(
        seed: u32,
        bounds: GridBounds,
        segments: Vec<Cell>,
        direction: Direction,
    ) -> Self {
        Self::with_snake(seed, bounds, Snake::from_segments(segments, direction))
    }

    fn with_snake(seed: u32, bounds: GridBounds, snake: Snake) -> Self {
        let mut rng = GameRng::new(seed);
        let mut food = Food::new(Cell::new(0, 0));
        food.respawn(&mut rng, bounds, |c| snake.contains(c));
        Self {
            seed,
            rng,
            bounds,
            snake,
            food,
            special_food: None,
            obstacles: ObstacleManager::new(),
            effect: None,
            score: 0,
            ticks: 0,
            phase: GamePhase::Ready,
        }
    }

    /// Cells the food/obstacle samplers must avoid.
    pub fn cell_occupied(&self, cell: Cell) -> bool {
        self.snake.contains(cell)
            || self.obstacles.contains(cell)
            || self.food.cell == cell
            || self
                .special_food
                .as_ref()
                .is_some_and(|sf| sf.active && sf.cell == cell)
    }

    /// Interval multiplier from the running power-up effect (1.0 when none).
    pub fn speed_factor(&self) -> f64 {
        self.effect.map(|e| e.speed_factor()).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_deterministic() {
        let bounds = GridBounds::new(30, 30);
        let a = GameState::new(77, bounds);
        let b = GameState::new(77, bounds);
        assert_eq!(a.food.cell, b.food.cell);
        assert_eq!(a.rng, b.rng);
        assert_eq!(a.snake.head(), Cell::new(15, 15));
        assert_eq!(a.phase, GamePhase::Ready);
    }

    #[test]
    fn test_food_not_on_snake_at_start() {
        for seed in 0..50 {
            let state = GameState::new(seed, GridBounds::new(30, 30));
            assert!(!state.snake.contains(state.food.cell));
        }
    }

    #[test]
    fn test_replay_start_uses_recorded_segments() {
        let bounds = GridBounds::new(30, 30);
        let segments = vec![Cell::new(4, 4), Cell::new(3, 4), Cell::new(2, 4)];
        let state = GameState::from_replay_start(9, bounds, segments.clone(), Direction::Right);
        let got: Vec<Cell> = state.snake.segments().collect();
        assert_eq!(got, segments);
        // Playback reconstruction is bit-identical to a second reconstruction
        let again = GameState::from_replay_start(9, bounds, segments, Direction::Right);
        assert_eq!(state.rng, again.rng);
        assert_eq!(state.food.cell, again.food.cell);
    }
}
