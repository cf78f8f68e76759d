//! Obstacles: static walls, edge-bouncing movers, decaying temporaries
//!
//! Batches spawn as the score crosses level thresholds; higher levels spawn
//! more obstacles and shift the kind mix toward moving/temporary.

use serde::{Deserialize, Serialize};

use super::food::sample_free_cell;
use super::grid::{Cell, Direction, GridBounds, DIRECTIONS};
use super::rng::GameRng;
use crate::consts::{LEVEL_SCORE_STEP, OBSTACLE_PLACEMENT_ATTEMPTS};

/// Temporary obstacles live this many logical steps.
const TEMPORARY_LIFETIME_TICKS: u32 = 200;
/// Batch size is `2 + level`, capped here.
const MAX_BATCH_SIZE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Static,
    Moving { dir: Direction },
    Temporary { ticks_left: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub cell: Cell,
    pub kind: ObstacleKind,
}

/// Owns all obstacles and the level-threshold spawn bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleManager {
    obstacles: Vec<Obstacle>,
    /// Highest level a batch has already spawned for
    spawned_level: u32,
}

impl ObstacleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.obstacles.iter().any(|o| o.cell == cell)
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.spawned_level = 0;
    }

    /// Place a fixed wall cell directly.
    pub fn push_static(&mut self, cell: Cell) {
        self.obstacles.push(Obstacle {
            cell,
            kind: ObstacleKind::Static,
        });
    }

    /// Difficulty level implied by a cumulative score.
    pub fn level_for_score(score: u32) -> u32 {
        score / LEVEL_SCORE_STEP
    }

    /// Advance movers and age temporaries; one call per logical step.
    /// Movers reflect the direction component that would leave the board.
    pub fn advance(&mut self, bounds: GridBounds) {
        for obstacle in &mut self.obstacles {
            match &mut obstacle.kind {
                ObstacleKind::Static => {}
                ObstacleKind::Moving { dir } => {
                    let mut next = obstacle.cell + dir.vector();
                    if !bounds.contains(next) {
                        *dir = dir.opposite();
                        next = obstacle.cell + dir.vector();
                    }
                    if bounds.contains(next) {
                        obstacle.cell = next;
                    }
                }
                ObstacleKind::Temporary { ticks_left } => {
                    *ticks_left = ticks_left.saturating_sub(1);
                }
            }
        }
        self.obstacles
            .retain(|o| !matches!(o.kind, ObstacleKind::Temporary { ticks_left: 0 }));
    }

    /// Spawn one batch if `score` has crossed a new level threshold since the
    /// last batch. Returns how many obstacles were actually placed.
    pub fn maybe_spawn<F>(
        &mut self,
        rng: &mut GameRng,
        bounds: GridBounds,
        score: u32,
        occupied: F,
    ) -> usize
    where
        F: Fn(Cell) -> bool,
    {
        let level = Self::level_for_score(score);
        if level <= self.spawned_level {
            return 0;
        }
        self.spawned_level = level;

        let count = (2 + level).min(MAX_BATCH_SIZE);
        let mut placed = 0;
        for _ in 0..count {
            let candidate = {
                let existing = &self.obstacles;
                let taken = |c: Cell| occupied(c) || existing.iter().any(|o| o.cell == c);
                sample_free_cell(rng, bounds, OBSTACLE_PLACEMENT_ATTEMPTS, &taken)
            };
            match candidate {
                Some(cell) => {
                    let kind = Self::roll_kind(rng, level);
                    self.obstacles.push(Obstacle { cell, kind });
                    placed += 1;
                }
                None => {
                    log::debug!(
                        "obstacle slot skipped: no free cell in {OBSTACLE_PLACEMENT_ATTEMPTS} attempts"
                    );
                }
            }
        }
        placed
    }

    /// Fixed kind-mix table; movers and temporaries get likelier with level.
    fn roll_kind(rng: &mut GameRng, level: u32) -> ObstacleKind {
        let (moving_pct, temp_pct) = if level < 3 {
            (15, 5)
        } else if level < 6 {
            (25, 15)
        } else {
            (30, 20)
        };
        let roll = rng.draw_int(100);
        if roll < moving_pct {
            let dir = DIRECTIONS[rng.draw_int(4) as usize];
            ObstacleKind::Moving { dir }
        } else if roll < moving_pct + temp_pct {
            ObstacleKind::Temporary {
                ticks_left: TEMPORARY_LIFETIME_TICKS,
            }
        } else {
            ObstacleKind::Static
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(ObstacleManager::level_for_score(0), 0);
        assert_eq!(ObstacleManager::level_for_score(49), 0);
        assert_eq!(ObstacleManager::level_for_score(50), 1);
        assert_eq!(ObstacleManager::level_for_score(175), 3);
    }

    #[test]
    fn test_spawn_once_per_threshold() {
        let bounds = GridBounds::new(30, 30);
        let mut rng = GameRng::new(11);
        let mut mgr = ObstacleManager::new();

        assert_eq!(mgr.maybe_spawn(&mut rng, bounds, 0, |_| false), 0);
        let first = mgr.maybe_spawn(&mut rng, bounds, 50, |_| false);
        assert_eq!(first, 3); // 2 + level 1
        // Same level again: no second batch
        assert_eq!(mgr.maybe_spawn(&mut rng, bounds, 60, |_| false), 0);
        // Next threshold
        assert_eq!(mgr.maybe_spawn(&mut rng, bounds, 100, |_| false), 4);
        assert_eq!(mgr.obstacles().len(), 7);
    }

    #[test]
    fn test_batch_size_caps() {
        let bounds = GridBounds::new(30, 30);
        let mut rng = GameRng::new(2);
        let mut mgr = ObstacleManager::new();
        let placed = mgr.maybe_spawn(&mut rng, bounds, 50 * 20, |_| false);
        assert_eq!(placed, MAX_BATCH_SIZE as usize);
    }

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let bounds = GridBounds::new(30, 30);
        let mut rng = GameRng::new(7);
        let mut mgr = ObstacleManager::new();
        let blocked = Cell::new(15, 15);
        mgr.maybe_spawn(&mut rng, bounds, 500, |c| c == blocked);
        assert!(!mgr.contains(blocked));
    }

    #[test]
    fn test_crowded_board_skips_slots() {
        let bounds = GridBounds::new(30, 30);
        let mut rng = GameRng::new(3);
        let mut mgr = ObstacleManager::new();
        assert_eq!(mgr.maybe_spawn(&mut rng, bounds, 50, |_| true), 0);
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_mover_bounces_off_edge() {
        let bounds = GridBounds::new(5, 5);
        let mut mgr = ObstacleManager::new();
        mgr.obstacles.push(Obstacle {
            cell: Cell::new(4, 2),
            kind: ObstacleKind::Moving {
                dir: Direction::Right,
            },
        });
        mgr.advance(bounds);
        let o = mgr.obstacles()[0];
        assert_eq!(o.cell, Cell::new(3, 2));
        assert_eq!(
            o.kind,
            ObstacleKind::Moving {
                dir: Direction::Left
            }
        );
    }

    #[test]
    fn test_temporary_expires() {
        let bounds = GridBounds::new(5, 5);
        let mut mgr = ObstacleManager::new();
        mgr.obstacles.push(Obstacle {
            cell: Cell::new(1, 1),
            kind: ObstacleKind::Temporary { ticks_left: 2 },
        });
        mgr.advance(bounds);
        assert_eq!(mgr.obstacles().len(), 1);
        mgr.advance(bounds);
        assert!(mgr.is_empty());
    }
}
