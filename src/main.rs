//! Shadow Runner entry point
//!
//! In the browser this boots Phaser and drives the gameplay rules from the
//! scene's update hook. Natively it runs a headless lifecycle demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use shadow_runner::consts::*;
    use shadow_runner::platform::backdrop::{BACKDROP_PARALLAX, BACKDROP_TILES};
    use shadow_runner::platform::phaser::{self, PhaserHost};
    use shadow_runner::sim::{AbilityKind, Contact, GameEvent, GamePhase, GameState, TickInput, tick};
    use shadow_runner::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: Option<GameState>,
        host: PhaserHost,
        tuning: Tuning,
        /// Contacts reported since the last update
        pending: Vec<Contact>,
        /// Pause requested from outside the scene (window blur)
        pause_requested: bool,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(tuning: Tuning, settings: Settings) -> Self {
            Self {
                state: None,
                host: PhaserHost::new(settings, &tuning),
                tuning,
                pending: Vec::new(),
                pause_requested: false,
                last_phase: GamePhase::Loading,
            }
        }

        /// Scene (re)created: fresh session on a fresh seed
        fn start(&mut self) {
            let seed = js_sys::Date::now() as u64;
            let mut state = GameState::new(self.tuning.clone(), seed);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                state.status.subscribe(hud_listener(document));
            }
            self.pending.clear();
            self.pause_requested = false;
            state.start(&mut self.host);
            self.last_phase = state.phase;
            self.state = Some(state);
            log::info!("Game started with seed: {}", seed);
        }

        /// Destroy the session's entities before the scene restarts
        fn teardown(&mut self) {
            if let Some(mut state) = self.state.take() {
                state.teardown(&mut self.host);
            }
            self.pending.clear();
        }

        fn update(&mut self, delta_ms: f32, flags: u32) {
            let Some(state) = self.state.as_mut() else {
                return;
            };

            let mut input = TickInput::from_flags(flags, std::mem::take(&mut self.pending));
            input.pause |= std::mem::take(&mut self.pause_requested);
            tick(state, &mut self.host, &input, delta_ms / 1000.0);

            if state.phase != self.last_phase {
                show_pause_menu(state.phase == GamePhase::Paused);
                self.last_phase = state.phase;
            }
        }
    }

    /// Mirror simulation events into the DOM HUD
    fn hud_listener(document: web_sys::Document) -> impl FnMut(&GameEvent) {
        move |event: &GameEvent| match *event {
            GameEvent::SceneReady => {
                set_class(&document, "game-over", "hidden");
                set_class(&document, "hud", "");
            }
            GameEvent::ScoreChanged { score } => {
                if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                    el.set_text_content(Some(&score.to_string()));
                }
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&score.to_string()));
                }
            }
            GameEvent::AbilityTimeChanged {
                ability,
                remaining_ms,
            } => {
                let id = match ability {
                    AbilityKind::Shooting => "hud-shooting",
                    AbilityKind::Speed => "hud-speed",
                };
                if remaining_ms == 0 {
                    set_class(&document, id, "hud-item hidden");
                } else {
                    set_class(&document, id, "hud-item");
                    let selector = format!("#{} .hud-value", id);
                    if let Some(el) = document.query_selector(&selector).ok().flatten() {
                        el.set_text_content(Some(&format!("{}s", remaining_ms.div_ceil(1000))));
                    }
                }
            }
            GameEvent::GameOver => {
                set_class(&document, "game-over", "");
                log::info!("Game over");
            }
        }
    }

    fn set_class(document: &web_sys::Document, id: &str, class: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn show_pause_menu(visible: bool) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            set_class(&document, "pause-menu", if visible { "" } else { "hidden" });
        }
    }

    /// Balance overrides a page can provide as `window.SHADOW_RUNNER_TUNING`
    fn load_tuning(window: &web_sys::Window) -> Tuning {
        let value = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str("SHADOW_RUNNER_TUNING"))
            .ok()
            .and_then(|v| v.as_string());
        match value {
            Some(json) => Tuning::from_json_or_default(&json),
            None => Tuning::default(),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Shadow Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let tuning = load_tuning(&window);
        let game = Rc::new(RefCell::new(Game::new(tuning.clone(), Settings::load())));

        let on_create = {
            let game = game.clone();
            Closure::<dyn FnMut()>::new(move || game.borrow_mut().start())
        };
        let on_update = {
            let game = game.clone();
            Closure::<dyn FnMut(f32, u32)>::new(move |delta_ms: f32, flags: u32| {
                game.borrow_mut().update(delta_ms, flags);
            })
        };
        let on_contact = {
            let game = game.clone();
            Closure::<dyn FnMut(u32, u32, u32)>::new(move |kind: u32, a: u32, b: u32| {
                if let Some(contact) = Contact::decode(kind, a, b) {
                    game.borrow_mut().pending.push(contact);
                }
            })
        };

        phaser::create_game(
            "game-container",
            tuning.screen_width as u32,
            tuning.screen_height as u32,
            TARGET_FPS,
            WORLD_GRAVITY,
            PLAYER_GRAVITY,
            MAX_FALL_SPEED,
            BACKDROP_TILES as u32,
            BACKDROP_PARALLAX,
            &on_create,
            &on_update,
            &on_contact,
        );
        on_create.forget();
        on_update.forget();
        on_contact.forget();

        setup_restart_button(&document, game.clone());
        setup_pause_menu(&document, game.clone());
        setup_settings_toggles(&document, game.clone());
        setup_auto_pause(&window, game);

        log::info!("Shadow Runner running!");
        Ok(())
    }

    fn setup_restart_button(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                log::info!("Restarting scene");
                game.borrow_mut().teardown();
                phaser::restart_scene();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pause_menu(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().pause_requested = true; // Toggle back to playing
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Buttons in the pause menu that flip a preference and persist it
    fn setup_settings_toggles(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        fn shake(s: &mut Settings) -> &mut bool {
            &mut s.screen_shake
        }
        fn particles(s: &mut Settings) -> &mut bool {
            &mut s.particles
        }
        fn reduced_motion(s: &mut Settings) -> &mut bool {
            &mut s.reduced_motion
        }
        let toggles: [(&str, fn(&mut Settings) -> &mut bool); 3] = [
            ("toggle-shake", shake),
            ("toggle-particles", particles),
            ("toggle-reduced-motion", reduced_motion),
        ];

        for (id, field) in toggles {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let _ = btn.set_attribute("data-on", &field(&mut game.borrow_mut().host.settings).to_string());

            let game = game.clone();
            let btn_clone = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let value = field(&mut g.host.settings);
                *value = !*value;
                let _ = btn_clone.set_attribute("data-on", &value.to_string());
                g.host.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            let playing = g.state.as_ref().is_some_and(|s| s.phase == GamePhase::Playing);
            if playing {
                g.pause_requested = true;
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shadow Runner (native) starting...");
    log::info!("Native mode has no renderer - serve the wasm build for the game");

    println!("\nRunning headless lifecycle demo...");
    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Carry the player right for a minute of frames and watch the track scroll
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use glam::Vec2;
    use shadow_runner::Tuning;
    use shadow_runner::consts::FRAME_DT;
    use shadow_runner::platform::{HeadlessHost, Host};
    use shadow_runner::sim::{GameEvent, GameState, TickInput, tick};

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut host = HeadlessHost::new();
    let mut state = GameState::new(Tuning::default(), seed);
    state
        .status
        .subscribe(|event: &GameEvent| log::debug!("Event: {:?}", event));
    state.start(&mut host);

    let input = TickInput {
        right: true,
        ..Default::default()
    };
    let player = state.player.id;
    let mut most_segments = state.track.len();

    for _ in 0..3600 {
        // Stand-in for engine physics: move at the commanded velocity, no gravity
        if let (Some(pos), Some(vel)) = (host.position(player), host.velocity(player)) {
            host.set_position(player, Vec2::new(pos.x + vel.x * FRAME_DT, pos.y));
        }
        tick(&mut state, &mut host, &input, FRAME_DT);
        most_segments = most_segments.max(state.track.len());
    }

    let x = host.position(player).map_or(0.0, |p| p.x);
    println!("Seed {}: player reached x = {:.0}", seed, x);
    println!(
        "Segments live: {} (peak {}), entities spawned: {}, destroyed: {}",
        state.track.len(),
        most_segments,
        host.spawned,
        host.destroyed
    );
    assert!(most_segments <= state.tuning.max_live_segments + 1, "Track should stay bounded");
    println!("✓ Segment lifecycle stayed bounded");
}
