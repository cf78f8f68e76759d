//! Capture of live sessions into replay logs

use glam::IVec2;

use super::log::{InputEvent, ReplayLog, ThemeEvent, REPLAY_VERSION};
use crate::sim::{Cell, Direction, GridBounds};
use crate::theme::Theme;

/// Records seed, initial state and sparse frame-indexed events during live
/// play. Idle until `start`, frozen back to idle by `stop`.
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    recording: bool,
    frame: u32,
    seed: u32,
    bounds: Option<GridBounds>,
    initial_snake: Vec<Cell>,
    initial_direction: Direction,
    inputs: Vec<InputEvent>,
    theme_events: Vec<ThemeEvent>,
    speed_percent: u32,
    initial_theme: Option<Theme>,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    /// Begin a capture. Buffers are reset and the initial snake is copied by
    /// value, so later mutation of the live snake cannot leak into the log.
    pub fn start(
        &mut self,
        seed: u32,
        bounds: GridBounds,
        initial_snake: impl IntoIterator<Item = Cell>,
        initial_direction: Direction,
        speed_percent: u32,
        initial_theme: Option<Theme>,
    ) {
        self.recording = true;
        self.frame = 0;
        self.seed = seed;
        self.bounds = Some(bounds);
        self.initial_snake = initial_snake.into_iter().collect();
        self.initial_direction = initial_direction;
        self.inputs.clear();
        self.theme_events.clear();
        self.speed_percent = speed_percent;
        self.initial_theme = initial_theme;
    }

    /// Record a directional input at the current frame. No-op when idle.
    pub fn record_input(&mut self, direction: Direction) {
        if !self.recording {
            return;
        }
        self.inputs.push(InputEvent {
            frame: self.frame,
            direction,
        });
    }

    /// Record a raw vector input; anything that is not one of the four unit
    /// vectors is silently dropped.
    pub fn record_input_vector(&mut self, v: IVec2) {
        if let Some(direction) = Direction::from_vector(v) {
            self.record_input(direction);
        }
    }

    /// Record a cosmetic theme switch at the current frame. No-op when idle.
    pub fn record_theme_change(&mut self, theme: Theme) {
        if !self.recording {
            return;
        }
        self.theme_events.push(ThemeEvent {
            frame: self.frame,
            theme,
        });
    }

    /// Advance the frame counter after each logical step. No-op when idle.
    pub fn advance_frame(&mut self) {
        if self.recording {
            self.frame += 1;
        }
    }

    /// Freeze the capture into an immutable log and return to idle.
    /// `None` when no recording was in progress.
    pub fn stop(&mut self, final_score: u32) -> Option<ReplayLog> {
        if !self.recording {
            return None;
        }
        self.recording = false;
        let bounds = self.bounds.take()?;
        Some(ReplayLog {
            version: REPLAY_VERSION,
            seed: self.seed,
            width: bounds.width,
            height: bounds.height,
            initial_snake: std::mem::take(&mut self.initial_snake),
            initial_direction: self.initial_direction,
            inputs: std::mem::take(&mut self.inputs),
            theme_events: std::mem::take(&mut self.theme_events),
            final_score,
            timestamp_ms: wall_clock_ms(),
            speed_percent: self.speed_percent,
            initial_theme: self.initial_theme,
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn wall_clock_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}
