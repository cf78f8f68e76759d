//! One logical simulation step
//!
//! `tick` is the only mutation path during play. Identical seed + identical
//! per-step inputs produce an identical trajectory, which is what the replay
//! engine banks on: every random decision in here flows through the session
//! RNG in a fixed order.

use super::food::SpecialFood;
use super::grid::Direction;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::{FOOD_POINTS, SPECIAL_FOOD_POINTS};

/// Special food appears after 1 in this many plain foods (when none is out).
const SPECIAL_FOOD_CHANCE: u32 = 5;
/// Segments removed by the Shrink power-up.
const SHRINK_SEGMENTS: usize = 3;

/// Input intents for a single step. The core does not care whether they came
/// from the keyboard, the autopilot or a replay log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Directional intent already mapped to the closed enum
    pub direction: Option<Direction>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the simulation one step. `now` is the caller's logical clock in
/// ms (ticks × base interval); power-up decay uses it so playback at any
/// wall-clock speed decays identically.
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                return events;
            }
            GamePhase::Paused => state.phase = GamePhase::Running,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Ready | GamePhase::Running => {}
        GamePhase::Paused | GamePhase::GameOver => return events,
    }

    if let Some(dir) = input.direction {
        // 180° reversals are silently rejected inside set_direction
        state.snake.set_direction(dir);
        state.phase = GamePhase::Running;
    } else if state.phase == GamePhase::Ready {
        // Hold position until the session actually starts
        return events;
    }

    state.ticks += 1;

    // Timed decay first so this step sees current occupancy
    if let Some(sf) = &mut state.special_food {
        if !sf.update(now) {
            state.special_food = None;
        }
    }
    if state.effect.is_some_and(|e| e.expired(now)) {
        state.effect = None;
        events.push(GameEvent::EffectExpired);
    }

    state.obstacles.advance(state.bounds);

    state.snake.step();
    let head = state.snake.head();

    if state.snake.check_collision(state.bounds) || state.obstacles.contains(head) {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::Died);
        return events;
    }

    if head == state.food.cell {
        state.snake.grow();
        let double = state
            .effect
            .is_some_and(|e| e.kind == super::food::PowerUpKind::DoubleScore);
        state.score += if double { FOOD_POINTS * 2 } else { FOOD_POINTS };
        events.push(GameEvent::AteFood);

        // Fixed draw order: spawn roll, then special placement, then respawn
        if state.special_food.is_none() && state.rng.draw_int(SPECIAL_FOOD_CHANCE) == 0 {
            let snake = &state.snake;
            let obstacles = &state.obstacles;
            let food_cell = state.food.cell;
            state.special_food = SpecialFood::spawn(&mut state.rng, state.bounds, now, |c| {
                snake.contains(c) || obstacles.contains(c) || c == food_cell
            });
        }

        let snake = &state.snake;
        let obstacles = &state.obstacles;
        let special = state.special_food;
        let mut food = state.food;
        let placed = food.respawn(&mut state.rng, state.bounds, |c| {
            snake.contains(c)
                || obstacles.contains(c)
                || special.is_some_and(|sf| sf.active && sf.cell == c)
        });
        state.food = food;
        if !placed {
            // Nowhere left to put food: the board is full, the run is over
            state.phase = GamePhase::GameOver;
            return events;
        }
    } else if state
        .special_food
        .is_some_and(|sf| sf.active && sf.cell == head)
    {
        let kind = state.special_food.take().map(|sf| sf.kind).unwrap_or(
            super::food::PowerUpKind::DoubleScore,
        );
        state.score += SPECIAL_FOOD_POINTS;
        if kind.is_instant() {
            let target = state.snake.len().saturating_sub(SHRINK_SEGMENTS);
            state.snake.truncate(target);
        } else {
            // At most one effect: a fresh pickup replaces the running one
            state.effect = Some(super::food::ActiveEffect::new(kind, now));
        }
        events.push(GameEvent::AteSpecialFood(kind));
    }

    let spawned = {
        let snake = &state.snake;
        let food_cell = state.food.cell;
        let special = state.special_food;
        let score = state.score;
        let bounds = state.bounds;
        let mut obstacles = std::mem::take(&mut state.obstacles);
        let n = obstacles.maybe_spawn(&mut state.rng, bounds, score, |c| {
            snake.contains(c)
                || c == food_cell
                || special.is_some_and(|sf| sf.active && sf.cell == c)
        });
        state.obstacles = obstacles;
        n
    };
    if spawned > 0 {
        events.push(GameEvent::ObstaclesSpawned(spawned));
    }

    events
}
