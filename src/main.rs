//! Envelope Chase entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Result, anyhow};
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::PointerEvent;

    use envelope_chase::Settings;
    use envelope_chase::platform::{self, Stage};
    use envelope_chase::sim::{GamePhase, GameState, pointer_up, resize, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        stage: Stage,
        /// Last phase seen by the frame loop, for logging
        last_phase: GamePhase,
        /// Sync errors are logged once, not every frame
        sync_failed: bool,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Result<Self> {
            let state = GameState::new(settings, seed, platform::viewport()?);
            let stage = Stage::lookup(&state)?;
            Ok(Self {
                state,
                stage,
                last_phase: GamePhase::Phase1,
                sync_failed: false,
            })
        }

        /// Advance the simulation and push the frame to the page
        fn frame(&mut self, time: f64) {
            tick(&mut self.state, time);

            if self.state.phase != self.last_phase {
                log::info!("Now in {}", self.state.phase.as_str());
                self.last_phase = self.state.phase;
            }

            match self.stage.sync(&self.state) {
                Ok(()) => self.sync_failed = false,
                Err(e) if !self.sync_failed => {
                    log::warn!("Frame sync failed: {e:#}");
                    self.sync_failed = true;
                }
                Err(_) => {}
            }
        }
    }

    pub fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow!("Failed to init logger: {e}"))?;

        log::info!("Envelope Chase starting...");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(settings, seed)?));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone())?;
        request_animation_frame(game)?;

        log::info!("Envelope Chase running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<()> {
        let window = platform::dom::window()?;

        // Pointer up anywhere; the sim decides what was hit
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let point = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let mut g = game.borrow_mut();
                let outcome = pointer_up(&mut g.state, point, platform::now_ms());
                if outcome.is_ignored() {
                    log::debug!("Pointer up at ({}, {}): {:?}", point.x, point.y, outcome);
                } else {
                    log::info!("{:?}", outcome);
                }
            });
            window
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())
                .map_err(|e| anyhow!("Error adding pointerup listener: {e:?}"))?;
            closure.forget();
        }

        // Resize re-lays out the envelopes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                match platform::viewport() {
                    Ok(viewport) => resize(&mut game.borrow_mut().state, viewport),
                    Err(e) => log::warn!("Resize ignored: {e:#}"),
                }
            });
            window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
                .map_err(|e| anyhow!("Error adding resize listener: {e:?}"))?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) -> Result<()> {
        let window = platform::dom::window()?;
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("Error requesting animation frame: {e:?}"))?;
        closure.forget();
        Ok(())
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);

        if let Err(e) = request_animation_frame(game) {
            log::error!("Game loop stopped: {e:#}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {e:#}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Envelope Chase (native) starting...");
    log::info!("Native mode has no DOM - run with `trunk serve` for the web version");

    println!("\nRunning a headless playthrough...");
    headless::playthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run of the whole game without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use envelope_chase::Settings;
    use envelope_chase::sim::{
        EnvelopeId, GamePhase, GameState, Viewport, dismiss, envelope_pointer_up, tick,
    };

    const FRAME_MS: f64 = 1000.0 / 60.0;

    struct Clock {
        now: f64,
    }

    impl Clock {
        /// Tick frames for `ms` of host time
        fn run(&mut self, state: &mut GameState, ms: f64) {
            let until = self.now + ms;
            while self.now < until {
                self.now += FRAME_MS;
                tick(state, self.now);
            }
        }
    }

    fn catch_and_read(state: &mut GameState, clock: &mut Clock, id: EnvelopeId) {
        let opened = [
            envelope_pointer_up(state, id, clock.now),
            envelope_pointer_up(state, id, clock.now),
        ];
        log::info!("{id}: {opened:?}");
        clock.run(state, 500.0);
        log::info!("{id}: {:?}", dismiss(state));
        // Close animation plus the pause grace period
        let t = state.settings.timings;
        clock.run(state, t.close_animation_ms + t.pause_grace_ms + 2.0 * FRAME_MS);
    }

    pub fn playthrough() {
        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(42);
        let mut state = GameState::new(settings, seed, Viewport::new(1280.0, 720.0));
        let mut clock = Clock { now: 0.0 };

        clock.run(&mut state, 1000.0);
        for i in 0..state.envelopes.len() as u8 {
            catch_and_read(&mut state, &mut clock, EnvelopeId::Ordinary(i));
        }
        println!("Letters read: {} (phase {})", state.read_count, state.phase.as_str());

        let t = state.settings.timings;
        clock.run(&mut state, t.intro_hold_ms + t.intro_fade_ms + FRAME_MS);
        clock.run(&mut state, 1000.0);

        for _ in 0..2 {
            let outcome = envelope_pointer_up(&mut state, EnvelopeId::Gold, clock.now);
            log::info!("gold: {outcome:?}");
        }
        clock.run(&mut state, t.finale_delay_ms + 1000.0);

        if state.phase == GamePhase::Finale {
            println!("✓ Finale reached with {} confetti pieces", state.confetti.len());
        } else {
            println!("✗ Stuck in phase {}", state.phase.as_str());
        }
    }
}
