//! Food, special food (power-ups) and active effects

use serde::{Deserialize, Serialize};

use super::grid::{Cell, GridBounds};
use super::rng::GameRng;
use crate::consts::{EFFECT_DURATION_MS, FOOD_PLACEMENT_ATTEMPTS, SPECIAL_FOOD_LIFETIME_MS};

/// The regular food pellet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub cell: Cell,
}

impl Food {
    pub fn new(cell: Cell) -> Self {
        Self { cell }
    }

    /// Rejection-sample a free cell and move there. Returns false (leaving
    /// the old cell in place) only if the attempt cap runs out, which means
    /// the board is effectively full.
    pub fn respawn<F>(&mut self, rng: &mut GameRng, bounds: GridBounds, occupied: F) -> bool
    where
        F: Fn(Cell) -> bool,
    {
        if let Some(cell) = sample_free_cell(rng, bounds, FOOD_PLACEMENT_ATTEMPTS, &occupied) {
            self.cell = cell;
            true
        } else {
            false
        }
    }
}

/// Draw uniform candidates until one is unoccupied, up to `attempts`.
pub fn sample_free_cell<F>(
    rng: &mut GameRng,
    bounds: GridBounds,
    attempts: u32,
    occupied: &F,
) -> Option<Cell>
where
    F: Fn(Cell) -> bool,
{
    for _ in 0..attempts {
        let cell = Cell::new(
            rng.draw_int(bounds.width as u32) as i32,
            rng.draw_int(bounds.height as u32) as i32,
        );
        if !occupied(cell) {
            return Some(cell);
        }
    }
    None
}

/// Gameplay modifiers carried by special food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    SlowMotion,
    DoubleScore,
    Shrink,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::SlowMotion,
        PowerUpKind::DoubleScore,
        PowerUpKind::Shrink,
    ];

    /// Uniform pick via the session RNG.
    pub fn roll(rng: &mut GameRng) -> Self {
        Self::ALL[rng.draw_int(Self::ALL.len() as u32) as usize]
    }

    /// Shrink applies instantly; the others run as a timed effect.
    pub fn is_instant(self) -> bool {
        matches!(self, PowerUpKind::Shrink)
    }
}

/// A placed special food. At most one is active at a time; it decays on its
/// own after a fixed lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialFood {
    pub cell: Cell,
    pub kind: PowerUpKind,
    pub active: bool,
    pub spawned_at: f64,
    pub lifetime_ms: f64,
}

impl SpecialFood {
    /// Spawn at a free cell with a uniformly drawn kind. `now` is the
    /// caller's clock (the orchestrator feeds logical time so replays decay
    /// identically).
    pub fn spawn<F>(
        rng: &mut GameRng,
        bounds: GridBounds,
        now: f64,
        occupied: F,
    ) -> Option<Self>
    where
        F: Fn(Cell) -> bool,
    {
        let cell = sample_free_cell(rng, bounds, FOOD_PLACEMENT_ATTEMPTS, &occupied)?;
        Some(Self {
            cell,
            kind: PowerUpKind::roll(rng),
            active: true,
            spawned_at: now,
            lifetime_ms: SPECIAL_FOOD_LIFETIME_MS,
        })
    }

    pub fn remaining_ms(&self, now: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        (self.lifetime_ms - (now - self.spawned_at)).max(0.0)
    }

    /// Expire once the lifetime has elapsed. Call once per logical or render
    /// frame; returns whether the food is still active.
    pub fn update(&mut self, now: f64) -> bool {
        if self.active && now - self.spawned_at >= self.lifetime_ms {
            self.active = false;
        }
        self.active
    }
}

/// The single power-up effect currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub started_at: f64,
    pub duration_ms: f64,
}

impl ActiveEffect {
    pub fn new(kind: PowerUpKind, now: f64) -> Self {
        Self {
            kind,
            started_at: now,
            duration_ms: EFFECT_DURATION_MS,
        }
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.started_at > self.duration_ms
    }

    /// Step-interval multiplier while this effect is running.
    pub fn speed_factor(&self) -> f64 {
        match self.kind {
            PowerUpKind::SpeedBoost => 0.6,
            PowerUpKind::SlowMotion => 1.6,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respawn_avoids_occupied() {
        let bounds = GridBounds::new(10, 10);
        let mut rng = GameRng::new(99);
        let blocked: Vec<Cell> = (0..10)
            .flat_map(|x| (0..5).map(move |y| Cell::new(x, y)))
            .collect();
        let mut food = Food::new(Cell::new(0, 0));
        for _ in 0..50 {
            assert!(food.respawn(&mut rng, bounds, |c| blocked.contains(&c)));
            assert!(!blocked.contains(&food.cell));
            assert!(bounds.contains(food.cell));
        }
    }

    #[test]
    fn test_respawn_full_board_gives_up() {
        let bounds = GridBounds::new(4, 4);
        let mut rng = GameRng::new(1);
        let mut food = Food::new(Cell::new(2, 2));
        assert!(!food.respawn(&mut rng, bounds, |_| true));
        // Old position untouched on failure
        assert_eq!(food.cell, Cell::new(2, 2));
    }

    #[test]
    fn test_special_food_expires() {
        let bounds = GridBounds::new(10, 10);
        let mut rng = GameRng::new(5);
        let mut sf = SpecialFood::spawn(&mut rng, bounds, 1000.0, |_| false).unwrap();
        assert!(sf.update(1000.0));
        assert!(sf.update(1000.0 + SPECIAL_FOOD_LIFETIME_MS - 1.0));
        assert_eq!(sf.remaining_ms(1000.0 + SPECIAL_FOOD_LIFETIME_MS - 1.0), 1.0);
        assert!(!sf.update(1000.0 + SPECIAL_FOOD_LIFETIME_MS));
        assert_eq!(sf.remaining_ms(99_999.0), 0.0);
    }

    #[test]
    fn test_kind_roll_is_seed_deterministic() {
        let mut a = GameRng::new(321);
        let mut b = GameRng::new(321);
        for _ in 0..50 {
            assert_eq!(PowerUpKind::roll(&mut a), PowerUpKind::roll(&mut b));
        }
    }

    #[test]
    fn test_effect_expiry() {
        let fx = ActiveEffect::new(PowerUpKind::DoubleScore, 0.0);
        assert!(!fx.expired(EFFECT_DURATION_MS));
        assert!(fx.expired(EFFECT_DURATION_MS + 1.0));
    }
}
