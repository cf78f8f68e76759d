//! Deterministic playback of replay logs
//!
//! The player owns only cursors over the event streams; it re-drives the
//! same simulation the recorder watched. Wall-clock pacing (the 0.5×/1×/2×
//! speed) is the orchestrator's business — the player never changes frame
//! granularity.

use super::log::ReplayLog;
use crate::sim::Direction;
use crate::theme::Theme;

/// Playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Completed,
}

type InputCallback = Box<dyn FnMut(Direction)>;
type ThemeCallback = Box<dyn FnMut(Theme)>;
type CompleteCallback = Box<dyn FnOnce()>;

/// Replays a captured log input-for-input at recorded frame indices.
pub struct ReplayPlayer {
    log: Option<ReplayLog>,
    state: PlaybackState,
    frame: u32,
    input_cursor: usize,
    theme_cursor: usize,
    speed: f64,
    on_input: Option<InputCallback>,
    on_theme: Option<ThemeCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Default for ReplayPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayPlayer {
    pub fn new() -> Self {
        Self {
            log: None,
            state: PlaybackState::Idle,
            frame: 0,
            input_cursor: 0,
            theme_cursor: 0,
            speed: 1.0,
            on_input: None,
            on_theme: None,
            on_complete: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    pub fn log(&self) -> Option<&ReplayLog> {
        self.log.as_ref()
    }

    /// Load a log and rewind all cursors. Playback does not start yet.
    pub fn load(&mut self, log: ReplayLog) {
        self.log = Some(log);
        self.frame = 0;
        self.input_cursor = 0;
        self.theme_cursor = 0;
        self.state = PlaybackState::Idle;
    }

    /// Begin applying events through the given callbacks.
    pub fn start(
        &mut self,
        on_input: impl FnMut(Direction) + 'static,
        on_complete: impl FnOnce() + 'static,
        on_theme: Option<ThemeCallback>,
    ) -> bool {
        if self.log.is_none() {
            log::warn!("startPlayback without a loaded replay");
            return false;
        }
        self.on_input = Some(Box::new(on_input));
        self.on_complete = Some(Box::new(on_complete));
        self.on_theme = on_theme;
        self.state = PlaybackState::Playing;
        true
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Discard playback entirely (new game, back to menu).
    pub fn stop(&mut self) {
        self.log = None;
        self.state = PlaybackState::Idle;
        self.frame = 0;
        self.input_cursor = 0;
        self.theme_cursor = 0;
        self.on_input = None;
        self.on_theme = None;
        self.on_complete = None;
    }

    /// Fire every input and theme event recorded for the current frame, in
    /// recorded order. Same-frame runs all apply; at the pending-direction
    /// level the last one wins, exactly like rapid live key presses.
    /// No-op while paused.
    pub fn process_frame(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if self.log.is_none() {
            return;
        }

        while let Some(dir) = self.due_input() {
            self.input_cursor += 1;
            if let Some(cb) = &mut self.on_input {
                cb(dir);
            }
        }
        while let Some(theme) = self.due_theme() {
            self.theme_cursor += 1;
            if let Some(cb) = &mut self.on_theme {
                cb(theme);
            }
        }

        if self.check_complete() {
            self.finish();
        }
    }

    /// Next input event if it is due on the current frame.
    fn due_input(&self) -> Option<Direction> {
        let log = self.log.as_ref()?;
        let ev = log.inputs.get(self.input_cursor)?;
        (ev.frame == self.frame).then_some(ev.direction)
    }

    /// Next theme event if it is due on the current frame.
    fn due_theme(&self) -> Option<Theme> {
        let log = self.log.as_ref()?;
        let ev = log.theme_events.get(self.theme_cursor)?;
        (ev.frame == self.frame).then_some(ev.theme)
    }

    /// Move the frame cursor forward; held still while paused.
    pub fn advance_frame(&mut self) {
        if self.state == PlaybackState::Playing {
            self.frame += 1;
        }
    }

    /// Every recorded input has been applied. The theme stream does not have
    /// to be exhausted.
    pub fn check_complete(&self) -> bool {
        self.log
            .as_ref()
            .is_some_and(|log| self.input_cursor >= log.inputs.len())
    }

    /// Flush all remaining input and theme events in one call, then signal
    /// completion.
    pub fn skip_to_end(&mut self) {
        if self.log.is_none() {
            return;
        }
        loop {
            let dir = self
                .log
                .as_ref()
                .and_then(|log| log.inputs.get(self.input_cursor))
                .map(|ev| ev.direction);
            let Some(dir) = dir else { break };
            self.input_cursor += 1;
            if let Some(cb) = &mut self.on_input {
                cb(dir);
            }
        }
        loop {
            let theme = self
                .log
                .as_ref()
                .and_then(|log| log.theme_events.get(self.theme_cursor))
                .map(|ev| ev.theme);
            let Some(theme) = theme else { break };
            self.theme_cursor += 1;
            if let Some(cb) = &mut self.on_theme {
                cb(theme);
            }
        }
        if let Some(log) = &self.log {
            self.frame = log.inputs.last().map(|e| e.frame + 1).unwrap_or(self.frame);
        }
        self.finish();
    }

    /// Playback pacing multiplier (0.5, 1.0 or 2.0). Consumed by the
    /// orchestrator when it scales the step interval.
    pub fn set_speed(&mut self, speed: f64) {
        const ALLOWED: [f64; 3] = [0.5, 1.0, 2.0];
        if ALLOWED.contains(&speed) {
            self.speed = speed;
        } else {
            log::warn!("ignoring unsupported playback speed {speed}");
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn finish(&mut self) {
        if self.state == PlaybackState::Completed {
            return;
        }
        self.state = PlaybackState::Completed;
        if let Some(cb) = self.on_complete.take() {
            cb();
        }
    }
}
