//! Glue between the simulation and the replay engine
//!
//! The browser loop and the headless runner both drive sessions through
//! these helpers so recording and playback agree on one rule: an input goes
//! into the log only if the step that consumed it actually ran. A paused
//! session records nothing, and a replayed log is always fed through `tick`
//! frame by frame, never applied wholesale.

use std::cell::RefCell;
use std::rc::Rc;

use crate::replay::{PlaybackState, ReplayLog, ReplayPlayer, ReplayRecorder};
use crate::sim::{tick, Direction, GameEvent, GamePhase, GameState, GridBounds, TickInput};
use crate::theme::Theme;

/// Keyboard intake for the single pending-turn slot. A press that would
/// reverse the current heading is dropped instead of overwriting the slot,
/// so an earlier legal press is not displaced by an illegal one. Returns
/// whether the press registered.
pub fn register_turn(
    pending: &mut Option<Direction>,
    heading: Direction,
    press: Direction,
) -> bool {
    if press == heading.opposite() {
        return false;
    }
    *pending = Some(press);
    true
}

/// One recorded live step. The direction intent is dropped while the
/// session is paused, and nothing is written to the log unless the
/// simulation actually advanced, so a replay never contains turns the live
/// session did not make.
pub fn step_recorded(
    state: &mut GameState,
    recorder: &mut ReplayRecorder,
    input: &TickInput,
    now: f64,
) -> Vec<GameEvent> {
    let direction = if state.phase == GamePhase::Paused {
        None
    } else {
        input.direction
    };
    let input = TickInput {
        direction,
        pause: input.pause,
    };
    let ticks_before = state.ticks;
    let events = tick(state, &input, now);
    if state.ticks > ticks_before {
        if let Some(dir) = direction {
            recorder.record_input(dir);
        }
        recorder.advance_frame();
    }
    events
}

/// Drives a loaded replay through the same simulation the recorder watched.
/// Owns the player and the single-frame sinks its callbacks fill; every
/// recorded input flows through `tick`, one frame per logical step.
pub struct PlaybackSession {
    player: ReplayPlayer,
    pending_input: Rc<RefCell<Option<Direction>>>,
    pending_theme: Rc<RefCell<Option<Theme>>>,
    completed: Rc<RefCell<bool>>,
}

impl PlaybackSession {
    /// Reconstruct the recorded start state and arm the player.
    pub fn new(log: ReplayLog) -> (Self, GameState) {
        let bounds = GridBounds::new(log.width, log.height);
        let state = GameState::from_replay_start(
            log.seed,
            bounds,
            log.initial_snake.clone(),
            log.initial_direction,
        );
        let mut session = Self {
            player: ReplayPlayer::new(),
            pending_input: Rc::default(),
            pending_theme: Rc::default(),
            completed: Rc::default(),
        };
        session.player.load(log);
        let input_sink = session.pending_input.clone();
        let theme_sink = session.pending_theme.clone();
        let done = session.completed.clone();
        session.player.start(
            move |dir| *input_sink.borrow_mut() = Some(dir),
            move || *done.borrow_mut() = true,
            Some(Box::new(move |theme| {
                *theme_sink.borrow_mut() = Some(theme)
            })),
        );
        (session, state)
    }

    pub fn player(&self) -> &ReplayPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut ReplayPlayer {
        &mut self.player
    }

    pub fn log(&self) -> Option<&ReplayLog> {
        self.player.log()
    }

    /// Every recorded input has been applied.
    pub fn is_complete(&self) -> bool {
        *self.completed.borrow()
    }

    /// One logical step: fire the events recorded for the current frame,
    /// feed them through `tick`, then move the frame cursor. Same-frame
    /// input runs collapse to the last one, exactly like rapid live
    /// presses. No-op while the player is paused.
    pub fn step(
        &mut self,
        state: &mut GameState,
        logical_step_ms: f64,
    ) -> (Vec<GameEvent>, Option<Theme>) {
        if self.player.state() == PlaybackState::Paused {
            return (Vec::new(), None);
        }
        self.player.process_frame();
        let direction = self.pending_input.borrow_mut().take();
        let theme = self.pending_theme.borrow_mut().take();
        let input = TickInput {
            direction,
            pause: false,
        };
        let ticks_before = state.ticks;
        let now = state.ticks as f64 * logical_step_ms;
        let events = tick(state, &input, now);
        if state.ticks > ticks_before {
            self.player.advance_frame();
        }
        (events, theme)
    }

    /// Run the rest of the replay at maximum pace, one recorded frame per
    /// step, so the end state equals the recorded end state. Returns the
    /// collected events and the last recorded theme switch, if any.
    pub fn fast_forward(
        &mut self,
        state: &mut GameState,
        logical_step_ms: f64,
    ) -> (Vec<GameEvent>, Option<Theme>) {
        self.player.resume();
        let mut all_events = Vec::new();
        let mut last_theme = None;
        while state.phase != GamePhase::GameOver {
            let ticks_before = state.ticks;
            let (events, theme) = self.step(state, logical_step_ms);
            all_events.extend(events);
            if theme.is_some() {
                last_theme = theme;
            }
            if state.ticks == ticks_before {
                // A log with no startable input; nothing more can run
                break;
            }
        }
        // Finalize the player; a malformed log can leave events past the
        // death tick, and those can no longer affect the simulation
        self.player.skip_to_end();
        self.pending_input.borrow_mut().take();
        if let Some(theme) = self.pending_theme.borrow_mut().take() {
            last_theme = Some(theme);
        }
        (all_events, last_theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Cell;

    const STEP_MS: f64 = 150.0;

    fn start_session(seed: u32) -> (GameState, ReplayRecorder) {
        let bounds = GridBounds::new(30, 30);
        let state = GameState::new(seed, bounds);
        let mut rec = ReplayRecorder::new();
        rec.start(
            seed,
            bounds,
            state.snake.segments(),
            state.snake.direction(),
            100,
            None,
        );
        (state, rec)
    }

    fn live_step(
        state: &mut GameState,
        rec: &mut ReplayRecorder,
        dir: Option<Direction>,
        pause: bool,
    ) -> Vec<GameEvent> {
        let input = TickInput {
            direction: dir,
            pause,
        };
        let now = state.ticks as f64 * STEP_MS;
        step_recorded(state, rec, &input, now)
    }

    fn snapshot(state: &GameState) -> (Vec<Cell>, Cell, u32, u64) {
        (
            state.snake.segments().collect(),
            state.food.cell,
            state.score,
            state.ticks,
        )
    }

    #[test]
    fn test_paused_turns_stay_out_of_the_log() {
        let (mut state, mut rec) = start_session(11);
        live_step(&mut state, &mut rec, Some(Direction::Right), false);
        live_step(&mut state, &mut rec, None, false);
        live_step(&mut state, &mut rec, None, false);
        live_step(&mut state, &mut rec, None, true);
        assert_eq!(state.phase, GamePhase::Paused);

        // Held key (or autopilot intent) arriving every released step while
        // paused: the snake holds still and nothing may reach the log
        let head = state.snake.head();
        for _ in 0..3 {
            live_step(&mut state, &mut rec, Some(Direction::Up), false);
        }
        assert_eq!(state.snake.head(), head);

        live_step(&mut state, &mut rec, None, true); // resume
        live_step(&mut state, &mut rec, Some(Direction::Down), false);

        let log = rec.stop(state.score).unwrap();
        let got: Vec<(u32, Direction)> =
            log.inputs.iter().map(|e| (e.frame, e.direction)).collect();
        assert_eq!(got, vec![(0, Direction::Right), (4, Direction::Down)]);
    }

    #[test]
    fn test_replay_reproduces_live_run_with_pauses() {
        let (mut state, mut rec) = start_session(42);
        live_step(&mut state, &mut rec, Some(Direction::Right), false);
        live_step(&mut state, &mut rec, None, false);
        live_step(&mut state, &mut rec, Some(Direction::Down), false);
        live_step(&mut state, &mut rec, None, true); // pause
        live_step(&mut state, &mut rec, Some(Direction::Up), false); // dropped
        live_step(&mut state, &mut rec, None, true); // resume
        live_step(&mut state, &mut rec, Some(Direction::Left), false);
        for _ in 0..4 {
            live_step(&mut state, &mut rec, None, false);
        }
        let live = snapshot(&state);
        let log = rec.stop(state.score).unwrap();

        let (mut session, mut replayed) = PlaybackSession::new(log);
        while replayed.ticks < live.3 {
            let before = replayed.ticks;
            session.step(&mut replayed, STEP_MS);
            assert!(replayed.ticks > before, "playback stalled");
        }
        assert_eq!(snapshot(&replayed), live);
    }

    #[test]
    fn test_fast_forward_matches_stepped_playback() {
        // A scripted run that turns a few times and then dies on the wall
        let (mut state, mut rec) = start_session(5);
        let script = [
            (0u64, Direction::Right),
            (2, Direction::Down),
            (5, Direction::Left),
            (9, Direction::Up),
        ];
        let mut guard = 0;
        while state.phase != GamePhase::GameOver {
            let dir = script
                .iter()
                .find(|(frame, _)| *frame == state.ticks)
                .map(|(_, d)| *d);
            live_step(&mut state, &mut rec, dir, false);
            guard += 1;
            assert!(guard < 200, "scripted run failed to end");
        }
        let log = rec.stop(state.score).unwrap();

        let (mut stepped_session, mut stepped) = PlaybackSession::new(log.clone());
        let mut guard = 0;
        while stepped.phase != GamePhase::GameOver {
            stepped_session.step(&mut stepped, STEP_MS);
            guard += 1;
            assert!(guard < 200, "stepped playback failed to end");
        }

        let (mut flushed_session, mut flushed) = PlaybackSession::new(log);
        flushed_session.fast_forward(&mut flushed, STEP_MS);

        assert_eq!(flushed.phase, GamePhase::GameOver);
        assert_eq!(snapshot(&flushed), snapshot(&stepped));
        assert_eq!(
            flushed.score,
            flushed_session.log().unwrap().final_score
        );
        // The last recorded turn was applied, not just the last flushed event
        assert_eq!(flushed.snake.direction(), Direction::Up);
        assert!(flushed_session.is_complete());
    }

    #[test]
    fn test_fast_forward_without_inputs_terminates() {
        let (state, mut rec) = start_session(3);
        let _ = state;
        let log = rec.stop(0).unwrap();
        let (mut session, mut replayed) = PlaybackSession::new(log);
        session.fast_forward(&mut replayed, STEP_MS);
        // Never started, so it holds at Ready instead of spinning
        assert_eq!(replayed.phase, GamePhase::Ready);
        assert!(session.is_complete());
    }

    #[test]
    fn test_register_turn_keeps_first_legal_press() {
        let mut pending = None;
        // Moving right: Up registers, a following reversal is dropped
        assert!(register_turn(&mut pending, Direction::Right, Direction::Up));
        assert!(!register_turn(&mut pending, Direction::Right, Direction::Left));
        assert_eq!(pending, Some(Direction::Up));
        // A later legal press still wins the slot
        assert!(register_turn(&mut pending, Direction::Right, Direction::Down));
        assert_eq!(pending, Some(Direction::Down));
    }
}
