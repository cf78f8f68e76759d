//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed logical steps only
//! - Seeded RNG only, drawn in a fixed order
//! - No rendering, storage or platform dependencies
//!
//! Given the same seed and the same per-step inputs, the trajectory is
//! bit-identical; the replay engine is built on that guarantee.

pub mod autopilot;
pub mod food;
pub mod grid;
pub mod obstacle;
pub mod rng;
pub mod snake;
pub mod state;
pub mod tick;

pub use food::{ActiveEffect, Food, PowerUpKind, SpecialFood};
pub use grid::{Cell, Direction, GridBounds, DIRECTIONS};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleManager};
pub use rng::{session_seed, GameRng};
pub use snake::Snake;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{tick, TickInput};
