//! Snake Rewind - a deterministic grid Snake with autopilot and replay
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, snake, food, obstacles, autopilot)
//! - `replay`: Record/playback of sessions plus persistent storage
//! - `session`: Glue that keeps recording and playback in lockstep with `tick`
//! - `audio`: Procedural Web Audio sound cues
//! - `theme`: Named color palettes (cosmetic only)
//! - `settings`: Player preferences

pub mod audio;
pub mod replay;
pub mod session;
pub mod settings;
pub mod sim;
pub mod theme;

pub use settings::Settings;
pub use theme::Theme;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions in pixels (grid size derives from these)
    pub const CANVAS_WIDTH: u32 = 600;
    pub const CANVAS_HEIGHT: u32 = 600;
    /// Side of one grid cell in pixels
    pub const CELL_SIZE: u32 = 20;

    /// Base interval between logical steps at 100% speed, in ms
    pub const BASE_STEP_MS: f64 = 150.0;
    /// Largest wall-clock delta fed to the accumulator per callback tick.
    /// Caps the burst of logical steps after a stall (tab backgrounding).
    pub const MAX_FRAME_DELTA_MS: f64 = 250.0;
    /// Maximum logical steps released per callback tick
    pub const MAX_STEPS_PER_FRAME: u32 = 8;

    /// Snake starts with this many segments
    pub const INITIAL_SNAKE_LEN: usize = 3;

    /// Points per plain food, doubled under the DoubleScore effect
    pub const FOOD_POINTS: u32 = 10;
    /// Bonus points for a special food
    pub const SPECIAL_FOOD_POINTS: u32 = 25;
    /// One obstacle batch spawns each time the score crosses a multiple of this
    pub const LEVEL_SCORE_STEP: u32 = 50;

    /// Special food despawns this long after appearing (logical ms)
    pub const SPECIAL_FOOD_LIFETIME_MS: f64 = 10_000.0;
    /// Power-up effects last this long (logical ms)
    pub const EFFECT_DURATION_MS: f64 = 8_000.0;

    /// Bounded retry counts for rejection sampling
    pub const FOOD_PLACEMENT_ATTEMPTS: u32 = 1000;
    pub const OBSTACLE_PLACEMENT_ATTEMPTS: u32 = 100;
}

/// Grid width in cells for the default canvas
pub fn grid_width() -> i32 {
    (consts::CANVAS_WIDTH / consts::CELL_SIZE) as i32
}

/// Grid height in cells for the default canvas
pub fn grid_height() -> i32 {
    (consts::CANVAS_HEIGHT / consts::CELL_SIZE) as i32
}

/// Step interval in ms for a live speed setting, clamped to the same range
/// `Settings` accepts.
pub fn step_interval_ms(speed_percent: u32) -> f64 {
    let pct = speed_percent
        .clamp(settings::MIN_SPEED_PERCENT, settings::MAX_SPEED_PERCENT) as f64;
    consts::BASE_STEP_MS * 100.0 / pct
}

/// Clamp one frame's wall-clock delta before it feeds the accumulator.
/// Negative deltas (timer anomalies) count as zero.
pub fn clamp_frame_delta(delta_ms: f64) -> f64 {
    delta_ms.clamp(0.0, consts::MAX_FRAME_DELTA_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_derives_from_canvas() {
        assert_eq!(grid_width(), 30);
        assert_eq!(grid_height(), 30);
    }

    #[test]
    fn test_step_interval_scales_with_speed() {
        assert_eq!(step_interval_ms(100), consts::BASE_STEP_MS);
        assert_eq!(step_interval_ms(200), consts::BASE_STEP_MS / 2.0);
        assert_eq!(step_interval_ms(50), consts::BASE_STEP_MS * 2.0);
        // Out-of-range settings clamp to the Settings range rather than error
        assert_eq!(
            step_interval_ms(1000),
            step_interval_ms(settings::MAX_SPEED_PERCENT)
        );
        assert_eq!(
            step_interval_ms(0),
            step_interval_ms(settings::MIN_SPEED_PERCENT)
        );
    }

    #[test]
    fn test_frame_delta_clamped() {
        assert_eq!(clamp_frame_delta(16.7), 16.7);
        // A long stall (backgrounded tab) cannot burst the accumulator
        assert_eq!(clamp_frame_delta(30_000.0), consts::MAX_FRAME_DELTA_MS);
        assert_eq!(clamp_frame_delta(-5.0), 0.0);
        // Even a maximal delta releases fewer steps than the per-frame cap
        let steps = (consts::MAX_FRAME_DELTA_MS / step_interval_ms(200)) as u32;
        assert!(steps <= consts::MAX_STEPS_PER_FRAME);
    }
}
