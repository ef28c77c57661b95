//! Quickdraw entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, PointerEvent, TouchEvent};

    use quickdraw::audio::{AudioGate, AudioManager};
    use quickdraw::platform::{FireLatch, FrameClock, InputSource, KeyAction, key_action};
    use quickdraw::sim::{GameEvent, RoundEngine, SeededRng, TickInput, tick};
    use quickdraw::{BestScore, HudView, Settings};

    /// Game instance holding all state
    struct Game {
        engine: RoundEngine<SeededRng>,
        best: BestScore,
        audio: AudioManager,
        gate: AudioGate,
        clock: FrameClock,
        latch: FireLatch,
        input: TickInput,
        last_hud: Option<HudView>,
    }

    impl Game {
        fn new(settings: &Settings, best: BestScore) -> Self {
            Self {
                engine: settings.build_engine(best.best),
                best,
                audio: AudioManager::new(),
                gate: AudioGate::new(settings.sound_enabled),
                clock: FrameClock::new(),
                latch: FireLatch::new(),
                input: TickInput::default(),
                last_hud: None,
            }
        }

        /// Queue a debounced fire for the next frame
        fn press(&mut self, source: InputSource) {
            if self.latch.press(source) {
                self.input.fire = true;
                // Browsers only unlock audio inside a user gesture
                self.audio.resume();
            }
        }

        /// Resume button pressed; never counts as a shot
        fn resume_from_menu(&mut self) {
            let paused = self.engine.state().is_paused();
            self.input.request_resume(paused);
            self.audio.resume();
        }

        /// Freeze the duel and drop held inputs (tab hidden, focus lost)
        fn suspend(&mut self, reason: &str) {
            self.latch.release_all();
            self.clock.reset();
            if !self.engine.state().is_paused() {
                self.engine.pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        /// Run one frame of the duel
        fn update(&mut self, time: f64) {
            let dt = self.clock.delta(time);
            let input = std::mem::take(&mut self.input);
            tick(&mut self.engine, &input, dt);

            let events = self.engine.drain_events();
            for effect in self.gate.effects(&events) {
                self.audio.play(effect);
            }
            for event in &events {
                match event {
                    GameEvent::NewBest(best) => {
                        if self.best.record(*best) {
                            self.best.save();
                        }
                    }
                    GameEvent::RoundResolved { outcome, streak, score, .. } => {
                        log::info!("{:?} (streak {}, score {})", outcome, streak, score);
                    }
                    _ => log::debug!("{:?}", event),
                }
            }
        }

        /// Push the HUD into the DOM when it changed
        fn update_hud(&mut self, document: &Document) {
            let hud = HudView::from_engine(&self.engine);
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            set_text(document, "status", &hud.status);
            set_text(document, "cue", &hud.cue);
            set_text(document, "opponent", &hud.opponent);
            set_text(document, "score", &hud.score_line);

            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if hud.paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(body) = document.body() {
                let class = format!("state-{}", self.engine.round().as_str());
                let _ = body.set_attribute("class", &class);
            }

            self.last_hud = Some(hud);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Quickdraw starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let best = BestScore::load();
        let game = Rc::new(RefCell::new(Game::new(&settings, best)));

        setup_input_handlers(game.clone());
        setup_pause_menu(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Quickdraw running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Keyboard: Space/Enter fire, Escape pauses
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match key_action(&event.key()) {
                    Some(KeyAction::Fire) => {
                        event.prevent_default();
                        if g.latch.press_key(&event.code(), event.repeat()) {
                            g.input.fire = true;
                            g.audio.resume();
                        }
                    }
                    Some(KeyAction::Pause) if !event.repeat() => g.input.pause = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut()
                    .latch
                    .release(&InputSource::Key(event.code()));
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse/pen; touch is handled by the touch listeners below
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if event.pointer_type() == "touch" {
                    return;
                }
                game.borrow_mut()
                    .press(InputSource::Pointer(event.pointer_id()));
            });
            let _ = document
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for name in ["pointerup", "pointercancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut()
                    .latch
                    .release(&InputSource::Pointer(event.pointer_id()));
            });
            let _ = document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start fires once per new finger
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        g.press(InputSource::Touch(touch.identifier()));
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        g.latch.release(&InputSource::Touch(touch.identifier()));
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pause_menu(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        let Some(btn) = document.get_element_by_id("resume-btn") else {
            log::warn!("No resume button on the page");
            return;
        };

        // Presses stop here so the document fire handlers never see them
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.stop_propagation();
                if event.pointer_type() == "touch" {
                    return;
                }
                game.borrow_mut().resume_from_menu();
            });
            let _ = btn.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                event.stop_propagation();
                game.borrow_mut().resume_from_menu();
            });
            let _ = btn.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
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
            let document = web_sys::window().and_then(|w| w.document());
            let mut g = game.borrow_mut();
            g.update(time);
            if let Some(document) = document {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
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
                    game.borrow_mut().suspend("tab hidden");
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
                game.borrow_mut().suspend("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use quickdraw::audio::AudioGate;
    use quickdraw::consts::{DEMO_MAX_LOSSES, DEMO_MAX_ROUNDS, FRAME_MS};
    use quickdraw::sim::{AutoPlayer, GameEvent, tick};
    use quickdraw::{BestScore, Settings};

    env_logger::init();
    log::info!("Quickdraw (native) starting...");
    log::info!("Native mode runs an auto-played duel - use `trunk serve` for the web version");

    let settings = Settings::load();
    let best_path = std::env::temp_dir().join("quickdraw_best.json");
    let mut best = BestScore::load_from(&best_path).unwrap_or_else(|e| {
        log::warn!("Could not read {}: {}", best_path.display(), e);
        BestScore::default()
    });

    let mut engine = settings.build_engine(best.best);
    let mut bot = AutoPlayer::new(settings.seed.unwrap_or_default().wrapping_add(1));
    let gate = AudioGate::new(settings.sound_enabled);
    let mut losses = 0;

    // Ten simulated minutes is plenty for the demo limits
    for _ in 0..(60 * 60 * 10) {
        let input = bot.input_for(&engine, FRAME_MS);
        tick(&mut engine, &input, FRAME_MS);

        for event in engine.drain_events() {
            for effect in gate.effects(&[event]) {
                log::debug!("sound: {:?}", effect);
            }
            match event {
                GameEvent::CueOpened(kind) => {
                    println!(
                        "round {:>2} vs {:<10} cue: {}",
                        engine.state().generation,
                        engine.state().opponent.name(),
                        kind.as_str()
                    );
                }
                GameEvent::RoundResolved { outcome, streak, score, best: top } => {
                    println!("         {:?} - streak {} score {} best {}", outcome, streak, score, top);
                    if !outcome.is_win() {
                        losses += 1;
                    }
                }
                GameEvent::NewBest(value) => {
                    if best.record(value) {
                        if let Err(e) = best.save_to(&best_path) {
                            log::warn!("Could not save best score: {}", e);
                        }
                    }
                }
                GameEvent::Restart => println!("--- restart ---"),
                GameEvent::StateChanged(_) => {}
            }
        }

        if losses >= DEMO_MAX_LOSSES || engine.state().generation > DEMO_MAX_ROUNDS {
            break;
        }
    }

    let score = engine.state().score;
    println!(
        "\nDone: {} rounds, {} losses, best {}",
        engine.state().generation,
        losses,
        score.best
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
