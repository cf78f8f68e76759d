//! Snake Rewind entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement};

    use snake_rewind::audio::{AudioManager, SoundEffect};
    use snake_rewind::consts::*;
    use snake_rewind::replay::{LocalStore, PlaybackState, ReplayLog, ReplayRecorder, ReplayStore};
    use snake_rewind::session::{self, PlaybackSession};
    use snake_rewind::settings::Settings;
    use snake_rewind::sim::{
        autopilot, session_seed, Direction, GameEvent, GamePhase, GameState, GridBounds, TickInput,
    };
    use snake_rewind::theme::Theme;
    use snake_rewind::{grid_height, grid_width, step_interval_ms};

    /// What is driving the simulation right now.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Live,
        Playback,
    }

    /// Game instance holding all state
    struct Game {
        ctx: CanvasRenderingContext2d,
        settings: Settings,
        theme: Theme,
        audio: AudioManager,
        state: GameState,
        recorder: ReplayRecorder,
        playback: Option<PlaybackSession>,
        store: ReplayStore<LocalStore>,
        mode: Mode,
        autopilot_on: bool,
        accumulator: f64,
        last_time: f64,
        /// Logical ms per step for the current session. Live sessions derive
        /// it from settings; playback uses the speed recorded in the log so
        /// power-up decay reproduces exactly.
        logical_step_ms: f64,
        pending_direction: Option<Direction>,
        pending_pause: bool,
        /// Replay already persisted for the current run
        finalized: bool,
    }

    impl Game {
        fn new(ctx: CanvasRenderingContext2d) -> Self {
            let settings = Settings::load();
            let theme = settings.theme;
            let autopilot_on = settings.autopilot;
            let bounds = GridBounds::new(grid_width(), grid_height());
            let seed = session_seed();
            let logical_step_ms = step_interval_ms(settings.speed_percent);

            let mut game = Self {
                ctx,
                settings,
                theme,
                audio: AudioManager::new(),
                state: GameState::new(seed, bounds),
                recorder: ReplayRecorder::new(),
                playback: None,
                store: ReplayStore::new(LocalStore::new()),
                mode: Mode::Live,
                autopilot_on,
                accumulator: 0.0,
                last_time: 0.0,
                logical_step_ms,
                pending_direction: None,
                pending_pause: false,
                finalized: false,
            };
            game.start_recording();
            game
        }

        fn start_recording(&mut self) {
            self.recorder.start(
                self.state.seed,
                self.state.bounds,
                self.state.snake.segments(),
                self.state.snake.direction(),
                self.settings.speed_percent,
                Some(self.theme),
            );
        }

        /// Fresh live session with a new seed.
        fn restart(&mut self) {
            let bounds = GridBounds::new(grid_width(), grid_height());
            self.state = GameState::new(session_seed(), bounds);
            self.playback = None;
            self.mode = Mode::Live;
            self.accumulator = 0.0;
            self.logical_step_ms = step_interval_ms(self.settings.speed_percent);
            self.pending_direction = None;
            self.pending_pause = false;
            self.finalized = false;
            self.start_recording();
            log::info!("New session with seed {}", self.state.seed);
        }

        /// Reconstruct the recorded start state and let the player drive.
        fn start_playback(&mut self, log: ReplayLog) {
            if let Some(theme) = log.initial_theme {
                self.theme = theme;
            }
            self.logical_step_ms = step_interval_ms(log.speed_percent);
            self.recorder.stop(0);
            self.mode = Mode::Playback;
            self.accumulator = 0.0;
            self.pending_direction = None;
            self.pending_pause = false;
            self.finalized = true;

            let seed = log.seed;
            let (session, state) = PlaybackSession::new(log);
            self.state = state;
            self.playback = Some(session);
            log::info!("Replaying session with seed {seed}");
        }

        /// Run simulation steps released by the accumulator.
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                snake_rewind::clamp_frame_delta(time - self.last_time)
            } else {
                0.0
            };
            self.last_time = time;
            self.accumulator += dt;

            let mut steps = 0;
            loop {
                let interval = self.step_interval();
                if self.accumulator < interval || steps >= MAX_STEPS_PER_FRAME {
                    break;
                }
                self.accumulator -= interval;
                steps += 1;
                match self.mode {
                    Mode::Live => self.step_live(),
                    Mode::Playback => self.step_playback(),
                }
            }
            // Drop backlog the step cap refused to run
            if steps >= MAX_STEPS_PER_FRAME {
                self.accumulator = 0.0;
            }
        }

        /// Wall-clock ms between steps: session interval scaled by the
        /// running power-up and, during playback, the review speed.
        fn step_interval(&self) -> f64 {
            let mut interval = self.logical_step_ms * self.state.speed_factor();
            if let Some(session) = &self.playback {
                interval /= session.player().speed();
            }
            interval
        }

        /// Logical clock fed to the simulation, in ms.
        fn logical_now(&self) -> f64 {
            self.state.ticks as f64 * self.logical_step_ms
        }

        fn step_live(&mut self) {
            // No direction intake while paused; a replay must never contain
            // a turn the paused session did not make
            let direction = if self.state.phase == GamePhase::Paused {
                None
            } else if self.autopilot_on && self.state.phase != GamePhase::GameOver {
                autopilot::next_move(
                    &self.state.snake,
                    self.state.food.cell,
                    &self.state.obstacles,
                    self.state.bounds,
                )
            } else {
                self.pending_direction.take()
            };
            let input = TickInput {
                direction,
                pause: std::mem::take(&mut self.pending_pause),
            };
            let now = self.logical_now();
            let events = session::step_recorded(&mut self.state, &mut self.recorder, &input, now);
            self.handle_events(&events);
        }

        fn step_playback(&mut self) {
            let Some(session) = self.playback.as_mut() else {
                return;
            };
            if std::mem::take(&mut self.pending_pause) {
                match session.player().state() {
                    PlaybackState::Playing => session.player_mut().pause(),
                    PlaybackState::Paused => session.player_mut().resume(),
                    _ => {}
                }
            }
            let (events, theme) = session.step(&mut self.state, self.logical_step_ms);
            if let Some(theme) = theme {
                self.theme = theme;
            }
            self.handle_events(&events);
        }

        /// Flush the rest of the replay through the simulation at once,
        /// one recorded frame per step.
        fn fast_forward(&mut self) {
            let Some(session) = self.playback.as_mut() else {
                return;
            };
            let (_, theme) = session.fast_forward(&mut self.state, self.logical_step_ms);
            if let Some(theme) = theme {
                self.theme = theme;
            }
            if self.state.phase == GamePhase::GameOver {
                self.audio.play(SoundEffect::GameOver);
            }
            self.accumulator = 0.0;
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            for event in events {
                match event {
                    GameEvent::AteFood => self.audio.play(SoundEffect::Eat),
                    GameEvent::AteSpecialFood(_) => self.audio.play(SoundEffect::PowerUp),
                    GameEvent::ObstaclesSpawned(_) => self.audio.play(SoundEffect::LevelUp),
                    GameEvent::EffectExpired => {}
                    GameEvent::Died => {
                        self.audio.play(SoundEffect::Die);
                        self.finalize_run();
                    }
                }
            }
        }

        /// Persist the finished run: last-played slot, history, and the
        /// high-score slot when beaten.
        fn finalize_run(&mut self) {
            if self.finalized {
                return;
            }
            self.finalized = true;
            let Some(log) = self.recorder.stop(self.state.score) else {
                return;
            };
            self.store.save_last(&log);
            self.store.push_history(&log);
            if self.store.save_high_score(&log) {
                self.audio.play(SoundEffect::HighScore);
                log::info!("New high score: {}", log.final_score);
            } else {
                self.audio.play(SoundEffect::GameOver);
            }
        }

        /// Export the last finished run as a copy-paste token.
        fn export_last(&self) -> Option<String> {
            self.store.load_last().and_then(|log| log.export())
        }

        fn cycle_theme(&mut self) {
            self.theme = self.theme.next();
            if self.mode == Mode::Live {
                self.recorder.record_theme_change(self.theme);
                self.settings.theme = self.theme;
                self.settings.save();
            }
        }

        fn toggle_autopilot(&mut self) {
            self.autopilot_on = !self.autopilot_on;
            log::info!(
                "Autopilot {}",
                if self.autopilot_on { "on" } else { "off" }
            );
        }

        /// Render the current frame with the active palette.
        fn render(&self) {
            let p = self.theme.palette();
            let cell = CELL_SIZE as f64;
            let ctx = &self.ctx;

            ctx.set_fill_style_str(p.background);
            ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);

            ctx.set_stroke_style_str(p.grid_line);
            for x in 0..=grid_width() {
                ctx.begin_path();
                ctx.move_to(x as f64 * cell, 0.0);
                ctx.line_to(x as f64 * cell, CANVAS_HEIGHT as f64);
                ctx.stroke();
            }
            for y in 0..=grid_height() {
                ctx.begin_path();
                ctx.move_to(0.0, y as f64 * cell);
                ctx.line_to(CANVAS_WIDTH as f64, y as f64 * cell);
                ctx.stroke();
            }

            ctx.set_fill_style_str(p.obstacle);
            for ob in self.state.obstacles.iter() {
                ctx.fill_rect(ob.cell.x as f64 * cell, ob.cell.y as f64 * cell, cell, cell);
            }

            ctx.set_fill_style_str(p.food);
            let food = self.state.food.cell;
            ctx.fill_rect(food.x as f64 * cell, food.y as f64 * cell, cell, cell);

            if let Some(sf) = &self.state.special_food {
                if sf.active {
                    ctx.set_fill_style_str(p.special_food);
                    ctx.fill_rect(sf.cell.x as f64 * cell, sf.cell.y as f64 * cell, cell, cell);
                }
            }

            let head = self.state.snake.head();
            for seg in self.state.snake.segments() {
                let color = if seg == head { p.snake_head } else { p.snake };
                ctx.set_fill_style_str(color);
                ctx.fill_rect(seg.x as f64 * cell, seg.y as f64 * cell, cell, cell);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-best") {
                el.set_text_content(Some(&self.store.high_score().to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-mode") {
                let label = match (self.mode, self.autopilot_on) {
                    (Mode::Playback, _) => "replay",
                    (Mode::Live, true) => "autopilot",
                    (Mode::Live, false) => "manual",
                };
                el.set_text_content(Some(label));
            }
            if let Some(el) = document.get_element_by_id("hud-status") {
                let label = match self.state.phase {
                    GamePhase::Ready => "press an arrow key to start".to_string(),
                    GamePhase::Running => String::new(),
                    GamePhase::Paused => "paused".to_string(),
                    GamePhase::GameOver => {
                        match self.playback.as_ref().and_then(|s| s.log()) {
                            Some(log) => format!("replay finished - score {}", log.final_score),
                            None => "game over - R to restart".to_string(),
                        }
                    }
                };
                el.set_text_content(Some(&label));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Snake Rewind starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(CANVAS_WIDTH);
        canvas.set_height(CANVAS_HEIGHT);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("context lookup failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = Rc::new(RefCell::new(Game::new(ctx)));
        log::info!("Session seed: {}", game.borrow().state.seed);

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Snake Rewind running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            g.audio.resume();
            let key = event.key();
            let direction = match key.as_str() {
                "ArrowUp" | "w" | "W" => Some(Direction::Up),
                "ArrowDown" | "s" | "S" => Some(Direction::Down),
                "ArrowLeft" | "a" | "A" => Some(Direction::Left),
                "ArrowRight" | "d" | "D" => Some(Direction::Right),
                _ => None,
            };
            if let Some(dir) = direction {
                event.prevent_default();
                // Replays are input-driven from the log, not the keyboard
                if g.mode == Mode::Live && !g.autopilot_on {
                    let heading = g.state.snake.direction();
                    session::register_turn(&mut g.pending_direction, heading, dir);
                }
                return;
            }
            match key.as_str() {
                " " => {
                    event.prevent_default();
                    g.pending_pause = true;
                }
                "p" | "P" => g.toggle_autopilot(),
                "t" | "T" => g.cycle_theme(),
                "r" | "R" => g.restart(),
                "l" | "L" => {
                    if let Some(log) = g.store.load_last() {
                        g.start_playback(log);
                    } else {
                        log::info!("No stored replay to play");
                    }
                }
                "h" | "H" => {
                    if let Some(log) = g.store.load_high_score_replay() {
                        g.start_playback(log);
                    } else {
                        log::info!("No high-score replay stored");
                    }
                }
                "e" | "E" => g.fast_forward(),
                "1" => {
                    if let Some(session) = g.playback.as_mut() {
                        session.player_mut().set_speed(0.5);
                    }
                }
                "2" => {
                    if let Some(session) = g.playback.as_mut() {
                        session.player_mut().set_speed(1.0);
                    }
                }
                "3" => {
                    if let Some(session) = g.playback.as_mut() {
                        session.player_mut().set_speed(2.0);
                    }
                }
                "+" | "=" => {
                    let pct = g.settings.speed_percent + 10;
                    g.settings.set_speed_percent(pct);
                    g.settings.save();
                }
                "-" => {
                    let pct = g.settings.speed_percent.saturating_sub(10);
                    g.settings.set_speed_percent(pct);
                    g.settings.save();
                }
                "m" | "M" => {
                    let muted = !g.audio.is_muted();
                    g.audio.set_muted(muted);
                    g.settings.sound = !muted;
                    g.settings.save();
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Export the last finished run into the token field
        if let Some(btn) = document.get_element_by_id("export-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                let token = game.borrow().export_last();
                if let Some(field) = document
                    .get_element_by_id("replay-token")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    match token {
                        Some(token) => field.set_value(&token),
                        None => field.set_value(""),
                    }
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Import a token and play it back
        if let Some(btn) = document.get_element_by_id("import-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                let Some(field) = document
                    .get_element_by_id("replay-token")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                match ReplayLog::import(&field.value()) {
                    Some(log) => game.borrow_mut().start_playback(log),
                    None => log::warn!("Invalid replay token, ignoring"),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Running {
                        g.pending_pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Running {
                    g.pending_pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot session: exercises the full sim and replay pipeline
/// without a browser.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use snake_rewind::replay::{ReplayLog, ReplayRecorder};
    use snake_rewind::session::step_recorded;
    use snake_rewind::sim::{
        autopilot, session_seed, GameEvent, GamePhase, GameState, GridBounds, TickInput,
    };
    use snake_rewind::{grid_height, grid_width, step_interval_ms};

    env_logger::init();

    let bounds = GridBounds::new(grid_width(), grid_height());
    let seed = session_seed();
    let interval = step_interval_ms(100);
    let mut state = GameState::new(seed, bounds);
    let mut recorder = ReplayRecorder::new();
    recorder.start(
        seed,
        bounds,
        state.snake.segments(),
        state.snake.direction(),
        100,
        None,
    );

    log::info!("Headless autopilot session, seed {seed}");

    let mut foods = 0u32;
    let max_ticks = 20_000u64;
    while state.phase != GamePhase::GameOver && state.ticks < max_ticks {
        let direction = autopilot::next_move(&state.snake, state.food.cell, &state.obstacles, bounds);
        let input = TickInput {
            direction,
            pause: false,
        };
        let now = state.ticks as f64 * interval;
        for event in step_recorded(&mut state, &mut recorder, &input, now) {
            if event == GameEvent::AteFood {
                foods += 1;
            }
        }
    }

    println!(
        "seed {seed}: score {} after {} ticks, {} foods, snake length {}",
        state.score,
        state.ticks,
        foods,
        state.snake.len()
    );

    if let Some(log) = recorder.stop(state.score) {
        if let Some(token) = log.export() {
            match ReplayLog::import(&token) {
                Some(back) if back == log => {
                    println!("replay token round-trips ({} chars)", token.len());
                }
                _ => eprintln!("replay token failed to round-trip"),
            }
        }
    }
}
