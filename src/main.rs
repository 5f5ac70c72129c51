//! Kings Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, EventTarget, HtmlButtonElement, HtmlCanvasElement, KeyboardEvent, PointerEvent,
    };

    use kings_dash::audio::WebAudio;
    use kings_dash::persistence::ProgressStore;
    use kings_dash::platform::{Key, LocalStorage, now_ms};
    use kings_dash::renderer::{RenderState, SceneOptions, build_scene};
    use kings_dash::sim::{GameMode, LEVEL_COUNT};
    use kings_dash::{AppState, Session, Settings};

    type FrameCallback = Closure<dyn FnMut(f64)>;
    type EventCallback = Closure<dyn FnMut(web_sys::Event)>;

    /// Play-view listener; removed when the run is torn down
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        callback: EventCallback,
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        scene: SceneOptions,
        render_state: Option<RenderState>,
        /// Pending `requestAnimationFrame` handle
        frame_handle: Option<i32>,
        /// Run generation the scheduled frames belong to
        loop_generation: u64,
        listeners: Vec<Listener>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(session: Session, settings: Settings) -> Self {
            Self {
                session,
                scene: SceneOptions::from_settings(&settings),
                settings,
                render_state: None,
                frame_handle: None,
                loop_generation: 0,
                listeners: Vec::new(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = build_scene(self.session.sim(), &self.scene);
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let hud = self.session.snapshot();

            set_text(&document, "#hud-level .hud-value", hud.level_name);
            set_text(
                &document,
                "#hud-distance .hud-value",
                &format!("{}/{}", hud.distance, hud.level_distance),
            );
            set_text(&document, "#hud-score .hud-value", &hud.score.to_string());
            set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            set_visible(&document, "hud-fps", self.settings.show_fps);

            if let Some(bar) = document.get_element_by_id("hud-progress") {
                let _ = bar.set_attribute("style", &format!("width: {:.1}%", hud.progress * 100.0));
            }
        }

        /// Sync menu screens and buttons with the session
        fn update_menu(&self) {
            let Some(document) = document() else { return };
            let view = self.session.menu_view();

            set_visible(&document, "menu", view.state == AppState::Menu);
            set_visible(&document, "hud", view.state != AppState::Menu);
            set_visible(&document, "game-over", view.state == AppState::GameOver);
            set_visible(&document, "level-complete", view.state == AppState::LevelComplete);
            set_visible(&document, "next-btn", self.session.next_level().is_some());

            for level in 1..=LEVEL_COUNT {
                let Some(el) = document.get_element_by_id(&format!("level-{level}")) else {
                    continue;
                };
                let _ = el
                    .class_list()
                    .toggle_with_force("cleared", view.unlocked_levels.contains(&level));
                if let Ok(btn) = el.dyn_into::<HtmlButtonElement>() {
                    btn.set_disabled(!self.session.is_playable(level));
                }
            }

            if let Some(el) = document.get_element_by_id("clues") {
                el.set_text_content(Some(&view.clues.join("\n")));
            }
            for id in ["final-score", "clear-score"] {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&view.score.to_string()));
                }
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Shared handle used by every callback
    #[derive(Clone)]
    struct Driver {
        game: Rc<RefCell<Game>>,
        /// One reusable frame callback; rescheduled each frame
        frame_cb: Rc<RefCell<Option<FrameCallback>>>,
    }

    impl Driver {
        fn new(game: Game) -> Self {
            let driver = Self {
                game: Rc::new(RefCell::new(game)),
                frame_cb: Rc::new(RefCell::new(None)),
            };
            let d = driver.clone();
            *driver.frame_cb.borrow_mut() = Some(Closure::new(move |time: f64| d.on_frame(time)));
            driver
        }

        fn schedule(&self) {
            let Some(window) = web_sys::window() else { return };
            let handle = {
                let cb = self.frame_cb.borrow();
                let Some(cb) = cb.as_ref() else { return };
                window.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
            };
            self.game.borrow_mut().frame_handle = handle;
        }

        fn cancel_frame(&self) {
            let handle = self.game.borrow_mut().frame_handle.take();
            if let (Some(handle), Some(window)) = (handle, web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
        }

        fn on_frame(&self, time: f64) {
            let (keep_going, current) = {
                let mut g = self.game.borrow_mut();
                g.frame_handle = None;
                let generation = g.loop_generation;
                let keep_going = g.session.frame(generation, time);
                g.track_fps(time);
                g.render();
                g.update_hud();
                (keep_going, generation == g.session.generation())
            };

            if keep_going {
                self.schedule();
            } else if current {
                // Run ended on its own (fail or clear)
                self.detach_input();
                self.game.borrow().update_menu();
            }
        }

        fn start(&self, mode: GameMode) {
            self.cancel_frame();
            self.detach_input();
            {
                let mut g = self.game.borrow_mut();
                if let Err(err) = g.session.start_mode(mode, now_ms()) {
                    log::warn!("Cannot start {}: {err}", mode.name());
                    return;
                }
                g.loop_generation = g.session.generation();
                g.update_menu();
            }
            self.attach_input();
            self.schedule();
        }

        fn return_to_menu(&self) {
            self.cancel_frame();
            self.detach_input();
            let mut g = self.game.borrow_mut();
            g.session.return_to_menu();
            g.update_menu();
            g.render();
        }

        fn reset_progress(&self) {
            self.cancel_frame();
            self.detach_input();
            let mut g = self.game.borrow_mut();
            g.session.reset_progress();
            g.update_menu();
            log::info!("Progress reset");
        }

        fn listen(
            &self,
            target: EventTarget,
            kind: &'static str,
            handler: impl FnMut(web_sys::Event) + 'static,
        ) {
            let callback = EventCallback::new(handler);
            if target
                .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
                .is_ok()
            {
                self.game.borrow_mut().listeners.push(Listener {
                    target,
                    kind,
                    callback,
                });
            }
        }

        fn attach_input(&self) {
            let Some(window) = web_sys::window() else { return };
            let Some(canvas) = document().and_then(|d| d.get_element_by_id("canvas")) else {
                return;
            };

            // Keyboard
            {
                let game = self.game.clone();
                self.listen(window.clone().into(), "keydown", move |event| {
                    let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                    let key = Key::from_code(&event.code());
                    if game.borrow_mut().session.input().key_down(key) {
                        event.prevent_default();
                    }
                });
            }
            {
                let game = self.game.clone();
                self.listen(window.into(), "keyup", move |event| {
                    let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                    let key = Key::from_code(&event.code());
                    if game.borrow_mut().session.input().key_up(key) {
                        event.prevent_default();
                    }
                });
            }

            // Pointer press-and-hold
            {
                let game = self.game.clone();
                let target = canvas.clone();
                self.listen(canvas.clone().into(), "pointerdown", move |event| {
                    let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                    if !event.is_primary() {
                        return;
                    }
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    g.session.audio().resume();

                    // Presses on the letterbox bars are not game input
                    let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                    let point = Vec2::new(
                        (event.offset_x() as f64 * dpr) as f32,
                        (event.offset_y() as f64 * dpr) as f32,
                    );
                    if let Some(render_state) = g.render_state.as_ref()
                        && !render_state.transform.contains_screen(point)
                    {
                        return;
                    }

                    // Keep receiving the release even if it lands off the canvas
                    let _ = target.set_pointer_capture(event.pointer_id());
                    g.session.input().pointer_down(now_ms());
                });
            }
            {
                let game = self.game.clone();
                self.listen(canvas.clone().into(), "pointerup", move |event| {
                    let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                    if !event.is_primary() {
                        return;
                    }
                    event.prevent_default();
                    game.borrow_mut().session.input().pointer_up(now_ms());
                });
            }
            {
                let game = self.game.clone();
                self.listen(canvas.clone().into(), "pointercancel", move |_event| {
                    game.borrow_mut().session.input().pointer_cancel();
                });
            }
            {
                // Fires after pointerup too; cancel is a no-op once the gesture ended
                let game = self.game.clone();
                self.listen(canvas.clone().into(), "lostpointercapture", move |_event| {
                    game.borrow_mut().session.input().pointer_cancel();
                });
            }

            // Keep touches from scrolling or zooming the page
            self.listen(canvas.clone().into(), "touchstart", |event| event.prevent_default());
            self.listen(canvas.into(), "contextmenu", |event| event.prevent_default());
        }

        fn detach_input(&self) {
            let listeners = std::mem::take(&mut self.game.borrow_mut().listeners);
            for listener in listeners {
                let _ = listener.target.remove_event_listener_with_callback(
                    listener.kind,
                    listener.callback.as_ref().unchecked_ref(),
                );
            }
            self.game.borrow_mut().session.input().reset();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Kings Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = fit_canvas(&window, &canvas);

        let settings = Settings::load(&LocalStorage);
        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(
            ProgressStore::new(Box::new(LocalStorage)),
            Box::new(WebAudio::new()),
            seed,
        );
        session.apply_settings(&settings);
        log::info!("Session initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut game = Game::new(session, settings);
        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.render_state = Some(render_state),
            Err(err) => log::error!("Failed to create device: {err}"),
        }

        let driver = Driver::new(game);
        setup_menu_buttons(&driver);
        setup_resize(&driver, canvas);

        {
            let mut g = driver.game.borrow_mut();
            g.update_menu();
            g.render();
        }

        log::info!("Kings Dash ready!");
    }

    /// Size the canvas backing store to its CSS box at device pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                handler();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(driver: &Driver) {
        let Some(document) = document() else { return };

        for level in 1..=LEVEL_COUNT {
            let d = driver.clone();
            on_click(&document, &format!("level-{level}"), move || {
                d.start(GameMode::Story(level));
            });
        }

        let d = driver.clone();
        on_click(&document, "marathon-btn", move || d.start(GameMode::Marathon));

        let d = driver.clone();
        on_click(&document, "rhythm-btn", move || d.start(GameMode::Rhythm));

        let d = driver.clone();
        on_click(&document, "reset-btn", move || d.reset_progress());

        let d = driver.clone();
        on_click(&document, "retry-btn", move || {
            let mode = d.game.borrow().session.mode();
            d.start(mode);
        });

        let d = driver.clone();
        on_click(&document, "next-btn", move || {
            let next = d.game.borrow().session.next_level();
            if let Some(level) = next {
                d.start(GameMode::Story(level));
            }
        });

        // Every screen has its own way back
        if let Ok(buttons) = document.query_selector_all(".menu-btn") {
            for i in 0..buttons.length() {
                let Some(btn) = buttons.get(i) else { continue };
                let d = driver.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    d.return_to_menu();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_resize(driver: &Driver, canvas: HtmlCanvasElement) {
        let Some(window) = web_sys::window() else { return };
        let d = driver.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let (width, height) = fit_canvas(&window, &canvas);
            let mut g = d.game.borrow_mut();
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.resize(width, height);
            }
            if g.session.state() != AppState::Playing {
                g.render();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Kings Dash (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    autopilot::run_story();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run of the story levels with a simple bot at the keyboard
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use kings_dash::audio::SilentAudio;
    use kings_dash::consts::FRAME_MS;
    use kings_dash::persistence::ProgressStore;
    use kings_dash::platform::{Key, MemoryStore};
    use kings_dash::sim::{
        Character, LEVEL_COUNT, Obstacle, SimulationState, check_collision,
    };
    use kings_dash::{AppState, Session};

    /// Frames of lead time before an obstacle reaches the character
    const JUMP_LEAD_FRAMES: f32 = 9.0;
    const DUCK_LEAD: f32 = 60.0;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Move {
        None,
        Jump,
        Duck,
    }

    /// What the obstacle demands if it were on top of the character
    fn required_move(obstacle: &Obstacle) -> Move {
        let mut at_character = obstacle.clone();
        at_character.x = Character::default().x;

        let standing = Character::default();
        let mut ducked = Character::default();
        ducked.set_ducking(true);

        if !check_collision(&standing, &at_character) {
            Move::None
        } else if !check_collision(&ducked, &at_character) {
            Move::Duck
        } else {
            Move::Jump
        }
    }

    fn decide(sim: &SimulationState) -> Move {
        let character = &sim.character;
        let front = character.x + character.width;
        let Some(next) = sim
            .obstacles
            .iter()
            .find(|o| o.trailing_edge() >= character.x)
        else {
            return Move::None;
        };
        let gap = next.x - front;
        match required_move(next) {
            Move::Jump if gap <= sim.current_speed * JUMP_LEAD_FRAMES => Move::Jump,
            Move::Duck if gap <= DUCK_LEAD => Move::Duck,
            _ => Move::None,
        }
    }

    pub fn run_story() {
        let mut session = Session::new(
            ProgressStore::new(Box::new(MemoryStore::new())),
            Box::new(SilentAudio),
            42,
        );

        let mut now = 0.0;
        for level in 1..=LEVEL_COUNT {
            if let Err(err) = session.start_level(level, now) {
                log::warn!("Stopping demo: {err}");
                break;
            }
            let generation = session.generation();
            let mut ducking = false;

            loop {
                now += FRAME_MS;
                match decide(session.sim()) {
                    Move::Jump => {
                        session.input().key_down(Key::Space);
                    }
                    Move::Duck if !ducking => {
                        session.input().key_down(Key::ArrowDown);
                        ducking = true;
                    }
                    Move::None if ducking => {
                        session.input().key_up(Key::ArrowDown);
                        ducking = false;
                    }
                    _ => {}
                }
                if !session.frame(generation, now) {
                    break;
                }
            }

            let hud = session.snapshot();
            log::info!(
                "Level {level} ({}): {:?} at {}/{} with score {}",
                hud.level_name,
                session.state(),
                hud.distance,
                hud.level_distance,
                hud.score
            );
            if session.state() != AppState::LevelComplete {
                break;
            }
        }

        let view = session.menu_view();
        log::info!("Cleared levels: {:?}", view.unlocked_levels);
        for clue in view.clues {
            log::info!("{clue}");
        }
    }
}
