//! Moonward entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent,
        TouchEvent,
    };

    use moonward::audio::AudioManager;
    use moonward::consts::*;
    use moonward::renderer::CanvasRenderer;
    use moonward::sim::{GameEvent, GamePhase, GameState, SoundCue, TickInput, Viewport, tick};
    use moonward::ui::{self, EscapeAction, Screen, Tutorial};
    use moonward::{Settings, Tuning, platform};

    const MUSIC_BUTTONS: [&str; 2] = ["toggleMusicBtn", "pauseToggleMusicBtn"];
    const MUSIC_SLIDERS: [&str; 2] = ["volumeSlider", "pauseVolumeSlider"];
    const MUSIC_DISPLAYS: [&str; 2] = ["volumeDisplay", "pauseVolumeDisplay"];
    const SFX_SLIDERS: [&str; 2] = ["sfxVolumeSlider", "pauseSfxVolumeSlider"];
    const SFX_DISPLAYS: [&str; 2] = ["sfxVolumeDisplay", "pauseSfxVolumeDisplay"];

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Option<CanvasRenderer>,
        audio: AudioManager,
        settings: Settings,
        document: Document,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Options panel open over the title screen
        options_open: bool,
        /// Overlay currently applied to the DOM
        shown_screen: Option<Screen>,
        /// Music state the toggle buttons currently show
        shown_music_playing: Option<bool>,
        tutorial: Tutorial,
        shown_tutorial: Option<bool>,
        mobile: bool,
    }

    impl Game {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                if self.state.phase == GamePhase::Playing && !self.state.paused {
                    self.tutorial.advance(self.input.thrust);
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.step(&self.state);
                    }
                }

                // Clear one-shot commands after processing
                self.input.start = false;
                self.input.toggle_pause = false;
                self.input.return_to_menu = false;
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Started => {
                    self.input.thrust = false;
                    self.options_open = false;
                    self.set_text("tutorialText", Tutorial::text(self.mobile));
                    self.tutorial.show();
                }
                GameEvent::Sound(cue) => self.audio.play(cue),
                GameEvent::GameOver { reason } => {
                    self.set_text("failReason", &reason.to_string());
                    self.set_text("finalScore", &self.state.score.to_string());
                    self.set_text("finalDistance", &ui::meters(self.state.max_distance));
                    self.input.thrust = false;
                }
                GameEvent::Victory { score, .. } => {
                    self.set_text("victoryScore", &score.to_string());
                    let fuel = self.state.player.fuel.floor() as u32;
                    self.set_text("victoryFuel", &format!("{fuel}%"));
                    self.input.thrust = false;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.render(&self.state, time);
            }
        }

        /// Show the overlay for the current phase
        fn update_screens(&mut self) {
            let screen = ui::visible_screen(self.state.phase, self.state.paused, self.options_open);
            if self.shown_screen == Some(screen) {
                return;
            }
            for candidate in Screen::ALL {
                if let Some(id) = candidate.element_id() {
                    self.set_display(id, candidate == screen);
                }
            }
            self.set_display("gameHUD", screen.shows_hud());
            self.set_display("mobilePauseBtn", screen.shows_pause_button());
            log::debug!("Screen: {screen:?}");
            self.shown_screen = Some(screen);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            if self.state.phase != GamePhase::Playing {
                return;
            }
            let hud = &self.state.hud;
            self.set_text("score", &hud.score.to_string());
            self.set_text("distance", &ui::meters(hud.distance));
            self.set_text("moonDistance", &ui::meters(hud.remaining));

            if let Some(gauge) = self.html_element("fuelLevel") {
                let style = gauge.style();
                let _ = style.set_property("width", &format!("{}%", hud.fuel_percent));
                let _ = style.set_property("background", hud.fuel_tier.color());
            }
        }

        fn update_tutorial(&mut self) {
            let visible = self.tutorial.is_visible()
                && self.state.phase == GamePhase::Playing
                && !self.state.paused;
            if self.shown_tutorial != Some(visible) {
                self.set_display("tutorialIndicator", visible);
                self.shown_tutorial = Some(visible);
            }
        }

        /// Keep both music toggle buttons in step with playback
        fn update_music_buttons(&mut self) {
            let playing = self.audio.is_music_playing();
            if self.shown_music_playing == Some(playing) {
                return;
            }
            for id in MUSIC_BUTTONS {
                if let Some(button) = self.html_element(id) {
                    button.set_text_content(Some(ui::music_button_label(playing)));
                    let _ = button
                        .style()
                        .set_property("background", ui::music_button_background(playing));
                }
            }
            self.shown_music_playing = Some(playing);
        }

        /// Escape key and mobile pause button
        fn escape(&mut self) {
            match ui::escape_action(self.state.phase, self.options_open) {
                EscapeAction::TogglePause => {
                    self.input.toggle_pause = true;
                    self.input.thrust = false;
                }
                EscapeAction::CloseOptions => self.options_open = false,
                EscapeAction::OpenOptions => self.options_open = true,
                EscapeAction::ReturnToMenu => self.input.return_to_menu = true,
            }
        }

        /// Start / retry / play again
        fn start(&mut self) {
            self.input.start = true;
            self.input.thrust = false;
            self.audio.resume();
            // Autoplay may have been blocked before the first click
            if self.settings.music_enabled && !self.audio.is_music_playing() {
                self.audio.start_music();
            }
        }

        /// Saves the request; whether it plays shows up via `update_music_buttons`
        fn toggle_music(&mut self) {
            self.audio.resume();
            if self.settings.toggle_music(self.audio.is_music_playing()) {
                self.audio.start_music();
            } else {
                self.audio.stop_music();
            }
            self.settings.save();
        }

        fn set_music_volume(&mut self, volume: u8) {
            self.settings.set_music_volume(volume);
            self.audio.set_music_gain(self.settings.music_gain());
            self.sync_volume_controls();
            self.settings.save();
        }

        fn set_sfx_volume(&mut self, volume: u8) {
            self.settings.set_sfx_volume(volume);
            self.audio.set_sfx_gain(self.settings.sfx_gain());
            self.sync_volume_controls();
            self.settings.save();
        }

        /// Mirror settings into both slider pairs and their readouts
        fn sync_volume_controls(&self) {
            let music = self.settings.music_volume.to_string();
            let sfx = self.settings.sfx_volume.to_string();
            for (sliders, displays, value) in [
                (MUSIC_SLIDERS, MUSIC_DISPLAYS, &music),
                (SFX_SLIDERS, SFX_DISPLAYS, &sfx),
            ] {
                for id in sliders {
                    if let Some(slider) = self
                        .document
                        .get_element_by_id(id)
                        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    {
                        slider.set_value(value);
                    }
                }
                for id in displays {
                    self.set_text(id, value);
                }
            }
        }

        fn resize(&mut self, width: f32, height: f32, dpr: f64) {
            self.state.set_viewport(width, height);
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.resize(width, height, dpr);
            }
        }

        fn html_element(&self, id: &str) -> Option<HtmlElement> {
            self.document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_display(&self, id: &str, visible: bool) {
            if let Some(el) = self.html_element(id) {
                let _ = el
                    .style()
                    .set_property("display", if visible { "flex" } else { "none" });
            }
        }
    }

    /// Viewport size in CSS pixels and the device pixel ratio
    fn window_size(window: &web_sys::Window) -> (f32, f32, f64) {
        let width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(800.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(600.0);
        (width as f32, height as f32, window.device_pixel_ratio())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Moonward starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let (width, height, dpr) = window_size(&window);
        let mobile = platform::detect_mobile();
        let tuning = Tuning::for_platform(mobile);
        let seed = platform::clock_seed();
        let settings = Settings::load();

        let renderer = match CanvasRenderer::new(canvas.clone(), seed, mobile) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("Canvas unavailable: {e:?}");
                None
            }
        };

        let state = GameState::new(seed, Viewport::new(width, height), tuning)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let audio = AudioManager::new(&settings);
        if settings.music_enabled {
            audio.start_music();
        }

        let game = Rc::new(RefCell::new(Game {
            state,
            renderer,
            audio,
            settings,
            document: document.clone(),
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput {
                pointer_x: Some(width / 2.0),
                ..TickInput::default()
            },
            options_open: false,
            shown_screen: None,
            shown_music_playing: None,
            tutorial: Tutorial::default(),
            shown_tutorial: None,
            mobile,
        }));

        {
            let mut g = game.borrow_mut();
            g.resize(width, height, dpr);
            g.sync_volume_controls();
            g.update_screens();
        }

        log::info!(
            "Game initialized: seed {seed}, {}",
            if mobile { "mobile" } else { "desktop" }
        );

        setup_keyboard(&window, game.clone());
        setup_pointer(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_sliders(&document, game.clone());
        setup_resize(&window, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Moonward running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let flying = g.state.phase == GamePhase::Playing && !g.state.paused;
                match event.code().as_str() {
                    "Escape" => {
                        event.prevent_default();
                        g.escape();
                    }
                    "Space" if flying => {
                        event.prevent_default();
                        g.input.thrust = true;
                    }
                    "ArrowLeft" if flying => {
                        event.prevent_default();
                        g.input.move_left = true;
                    }
                    "ArrowRight" if flying => {
                        event.prevent_default();
                        g.input.move_right = true;
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" => g.input.thrust = false,
                    "ArrowLeft" => g.input.move_left = false,
                    "ArrowRight" => g.input.move_right = false,
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - steer toward the cursor
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                game.borrow_mut().input.pointer_x = Some(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - thrust
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing && !g.state.paused {
                    g.input.thrust = true;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    game.borrow_mut().input.pointer_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - thrust and steer
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing && !g.state.paused {
                    g.input.thrust = true;
                }
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    g.input.pointer_x = Some(touch.client_x() as f32 - rect.left() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up / touch end - cut thrust
        for event_name in ["mouseup", "touchend"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.thrust = false;
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Wire a button that clicks, then runs `action`
    fn on_click(document: &Document, id: &str, game: &Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(button) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{id}");
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.audio.play(SoundCue::MenuClick);
            action(&mut g);
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["startBtn", "retryBtn", "playAgainBtn"] {
            on_click(document, id, &game, Game::start);
        }
        on_click(document, "optionsBtn", &game, |g| g.options_open = true);
        on_click(document, "backBtn", &game, |g| g.options_open = false);
        for id in MUSIC_BUTTONS {
            on_click(document, id, &game, Game::toggle_music);
        }
        on_click(document, "resumeBtn", &game, |g| {
            if g.state.paused {
                g.input.toggle_pause = true;
            }
        });
        on_click(document, "mainMenuBtn", &game, |g| {
            g.input.return_to_menu = true;
            g.input.thrust = false;
        });
        on_click(document, "mobilePauseBtn", &game, Game::escape);
    }

    /// Wire a 0-100 range input
    fn on_slider(document: &Document, id: &str, game: &Rc<RefCell<Game>>, apply: fn(&mut Game, u8)) {
        let Some(slider) = document.get_element_by_id(id) else {
            log::warn!("Missing slider #{id}");
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            match input.value().parse::<f64>() {
                Ok(value) => apply(&mut game.borrow_mut(), value.clamp(0.0, 100.0) as u8),
                Err(_) => log::warn!("Bad slider value {:?}", input.value()),
            }
        });
        let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_sliders(document: &Document, game: Rc<RefCell<Game>>) {
        for id in MUSIC_SLIDERS {
            on_slider(document, id, &game, Game::set_music_volume);
        }
        for id in SFX_SLIDERS {
            on_slider(document, id, &game, Game::set_sfx_volume);
        }
    }

    fn setup_resize(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height, dpr) = window_size(&window_clone);
            game.borrow_mut().resize(width, height, dpr);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render(time);
            g.update_screens();
            g.update_hud();
            g.update_tutorial();
            g.update_music_buttons();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Moonward (native) starting...");
    log::info!("Native mode runs a headless autopilot - use `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => moonward::Tuning::desktop(),
    };

    if let Err(e) = headless::run(moonward::platform::clock_seed(), tuning) {
        log::error!("Cannot start run: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<moonward::Tuning, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {path}: {e}"))?;
    moonward::Tuning::from_json(&json).map_err(|e| format!("Bad tuning in {path}: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use moonward::consts::TICKS_PER_SECOND;
    use moonward::sim::{GameEvent, GamePhase, GameState, TickInput, Viewport, tick};
    use moonward::{Tuning, TuningError};

    /// Give up after five simulated minutes
    const MAX_TICKS: u32 = 5 * 60 * TICKS_PER_SECOND;
    /// Climb rate the autopilot tries to hold (px/tick, negative is up)
    const CRUISE_VELOCITY: f32 = -5.0;

    /// Fly one run on a simple autopilot and log how it ended
    pub fn run(seed: u64, tuning: Tuning) -> Result<(), TuningError> {
        let mut state = GameState::new(seed, Viewport::new(1280.0, 720.0), tuning)?;
        let mut input = TickInput {
            start: true,
            ..TickInput::default()
        };

        for _ in 0..MAX_TICKS {
            input.thrust = state.player.vel.y > CRUISE_VELOCITY;
            input.pointer_x = nearest_fuel_x(&state);
            tick(&mut state, &input);
            input.start = false;

            for event in state.drain_events() {
                match event {
                    GameEvent::Victory { score, fuel_bonus } => {
                        log::info!("Autopilot reached the Moon: score {score} (fuel bonus {fuel_bonus})");
                    }
                    GameEvent::GameOver { reason } => {
                        log::info!(
                            "Autopilot run ended: {reason} at {}m, score {}",
                            state.max_distance,
                            state.score
                        );
                    }
                    other => log::debug!("{other:?}"),
                }
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }

        if state.phase == GamePhase::Playing {
            log::info!(
                "Autopilot still flying after {} ticks at {}m",
                state.frame_count,
                state.distance
            );
        }
        Ok(())
    }

    /// Steer toward the closest fuel canister above the player
    fn nearest_fuel_x(state: &GameState) -> Option<f32> {
        let player = state.player_center();
        state
            .collectibles
            .iter()
            .filter(|c| c.kind == moonward::sim::CollectibleKind::Fuel && c.center().y < player.y)
            .min_by(|a, b| {
                let da = a.center().distance_squared(player);
                let db = b.center().distance_squared(player);
                da.total_cmp(&db)
            })
            .map(|c| c.center().x)
    }
}
