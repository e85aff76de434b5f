//! Trash Wars entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::Cell;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use trash_wars::audio::AudioManager;
    use trash_wars::effects::Effects;
    use trash_wars::renderer::{Label, LabelKind, RenderState, SceneContext, View, labels, scene};
    use trash_wars::sim::Termination;
    use trash_wars::sound::SoundEffect;
    use trash_wars::{GameConfig, Session, SessionHooks, Settings, Tuning};

    /// HUD refresh interval (ms)
    const HUD_INTERVAL_MS: f64 = 100.0;
    const LEADERBOARD_ROWS: usize = 5;

    /// Pending animation frame plus a stop flag
    #[derive(Default)]
    struct FrameLoop {
        handle: Cell<Option<i32>>,
        stopped: Cell<bool>,
    }

    impl FrameLoop {
        fn stop(&self) {
            self.stopped.set(true);
            if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    /// 2D canvas stacked over the WebGPU one for skins, names and mass
    struct Overlay {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        images: HashMap<String, HtmlImageElement>,
    }

    impl Overlay {
        fn attach(window: &web_sys::Window, document: &Document, below: &HtmlCanvasElement) -> Option<Self> {
            let canvas = match document.get_element_by_id("labels") {
                Some(el) => el.dyn_into::<HtmlCanvasElement>().ok()?,
                None => {
                    let el: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
                    el.set_id("labels");
                    let _ = el.set_attribute(
                        "style",
                        "position:fixed;inset:0;width:100%;height:100%;pointer-events:none",
                    );
                    below.parent_node()?.append_child(&el).ok()?;
                    el
                }
            };
            let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
            let overlay = Self {
                canvas,
                ctx,
                images: HashMap::new(),
            };
            overlay.fit(window);
            Some(overlay)
        }

        fn fit(&self, window: &web_sys::Window) {
            fit_canvas(window, &self.canvas);
            // resizing resets the transform
            let dpr = window.device_pixel_ratio();
            let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        }

        /// Cached image for `src`; `None` until it has finished loading
        fn image(&mut self, src: &str) -> Option<&HtmlImageElement> {
            if !self.images.contains_key(src) {
                let img = HtmlImageElement::new().ok()?;
                img.set_src(src);
                self.images.insert(src.to_string(), img);
                return None;
            }
            self.images.get(src).filter(|img| img.complete())
        }

        fn paint(&mut self, labels: &[Label], (w, h): (f32, f32)) {
            let ctx = self.ctx.clone();
            ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            ctx.set_fill_style_str("white");
            ctx.set_shadow_color("black");

            for label in labels {
                let (x, y) = (label.pos.x as f64, label.pos.y as f64);
                let size = label.size as f64;
                let font = match label.kind {
                    LabelKind::Image => {
                        if let Some(img) = self.image(&label.text) {
                            ctx.save();
                            ctx.begin_path();
                            if ctx.arc(x, y, size * 0.95, 0.0, std::f64::consts::TAU).is_ok() {
                                ctx.clip();
                                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                                    img,
                                    x - size,
                                    y - size,
                                    size * 2.0,
                                    size * 2.0,
                                );
                            }
                            ctx.restore();
                        }
                        continue;
                    }
                    LabelKind::Icon => format!("{size}px Arial"),
                    LabelKind::Mass => format!("{size}px Rubik"),
                    LabelKind::Skin | LabelKind::Name => format!("bold {size}px Rubik"),
                };
                ctx.set_shadow_blur(if label.kind == LabelKind::Icon { 0.0 } else { 4.0 });
                ctx.set_font(&font);
                let _ = ctx.fill_text(&label.text, x, y);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        overlay: Option<Overlay>,
        /// Canvas size in CSS pixels
        view_size: (f32, f32),
        hud_last_ms: f64,
    }

    impl Game {
        fn render(&mut self) {
            let world = self.session.world();
            let (w, h) = self.view_size;
            let view = View::from_camera(&world.camera, w, h);

            if let Some(rs) = self.render_state.as_mut() {
                let ctx = SceneContext::new(world, view, self.session.effects().settings());
                let vertices = scene::build(world, &ctx);
                match rs.render(&vertices, &view) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => rs.reconfigure(),
                    Err(e) => log::warn!("Frame dropped: {:?}", e),
                }
            }

            if let Some(overlay) = self.overlay.as_mut() {
                overlay.paint(&labels::collect(world, &view), self.view_size);
            }
        }

        fn update_hud(&mut self, now: f64) {
            if now - self.hud_last_ms < HUD_INTERVAL_MS {
                return;
            }
            self.hud_last_ms = now;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let world = self.session.world();

            if let Some(el) = document.get_element_by_id("hud-mass") {
                el.set_text_content(Some(&world.hero_score().to_string()));
            }

            if self.session.effects().settings().show_leaderboard {
                if let Some(list) = document.get_element_by_id("leaderboard") {
                    list.set_inner_html("");
                    for (rank, entry) in world.leaderboard(LEADERBOARD_ROWS).iter().enumerate() {
                        let Ok(row) = document.create_element("li") else {
                            continue;
                        };
                        if entry.owner.is_hero() {
                            let _ = row.set_attribute("class", "hero");
                        }
                        row.set_text_content(Some(&format!(
                            "{}. {} {}",
                            rank + 1,
                            entry.name,
                            entry.mass.floor()
                        )));
                        let _ = list.append_child(&row);
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("portal-alert") {
                let class = if world.portals.is_empty() { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn show_end_screen(title: &str, score: u32, earnings: f64) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        set_text(&document, "end-title", title);
        set_text(&document, "end-mass", &score.to_string());
        set_text(&document, "end-earnings", &format!("{:.2} SOL", earnings));
        if let Some(el) = document.get_element_by_id("end-screen") {
            let _ = el.set_attribute("class", "");
        }
        if let Some(el) = document.get_element_by_id("hud") {
            let _ = el.set_attribute("class", "hidden");
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn new_session(config: &GameConfig, tuning: &Tuning, settings: &Settings, frames: &Rc<FrameLoop>) -> Session {
        let seed = js_sys::Date::now() as u64;
        log::info!("New session with seed: {}", seed);

        let effects = Effects::new(settings.clone(), Box::new(AudioManager::from_settings(settings)));

        let over_frames = frames.clone();
        let over_config = config.clone();
        let cash_frames = frames.clone();
        let cash_config = config.clone();
        let hooks = SessionHooks::new(
            move |score| {
                over_frames.stop();
                show_end_screen("ELIMINATED", score, over_config.estimated_earnings(score));
            },
            move |score| {
                cash_frames.stop();
                show_end_screen("EXTRACTION SUCCESS", score, cash_config.estimated_earnings(score));
            },
        );

        Session::new(config.clone(), tuning.clone(), seed, effects, hooks)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Trash Wars starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        let (client_w, client_h) = fit_canvas(&window, &canvas);

        let config = GameConfig::load();
        let tuning = Tuning::load();
        let settings = Settings::load();
        log::info!("Playing as {} (wager {} SOL)", config.nickname, config.wager);

        let frames = Rc::new(FrameLoop::default());
        let session = new_session(&config, &tuning, &settings, &frames);

        let mut overlay = Overlay::attach(&window, &document, &canvas);
        match overlay.as_mut() {
            Some(overlay) if config.avatar_is_image() => {
                // start loading now so the skin is ready by the first frames
                let _ = overlay.image(&config.avatar);
            }
            Some(_) => {}
            None => log::warn!("No 2D context, cell labels disabled"),
        }

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: None,
            overlay,
            view_size: (client_w as f32, client_h as f32),
            hud_last_ms: 0.0,
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        match init_renderer(&instance, &canvas).await {
            Ok(rs) => game.borrow_mut().render_state = Some(rs),
            Err(e) => log::error!("Rendering disabled: {e}"),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_window_handlers(&canvas, game.clone(), frames.clone());
        setup_menu_buttons(game.clone(), frames.clone(), config, tuning);

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game, frames);

        log::info!("Trash Wars running!");
    }

    async fn init_renderer(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
    ) -> Result<RenderState, trash_wars::renderer::RenderError> {
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, canvas.width(), canvas.height()).await
    }

    /// Size the canvas backing store to the device pixel ratio; returns CSS size
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (i32, i32) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        canvas.set_width((client_w as f64 * dpr) as u32);
        canvas.set_height((client_h as f64 * dpr) as u32);
        (client_w, client_h)
    }

    fn viewport(window: &web_sys::Window) -> (f32, f32) {
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        (w as f32, h as f32)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse steering
        {
            let game = game.clone();
            let win = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (w, h) = viewport(&win);
                game.borrow_mut().session.input_mut().pointer_moved(
                    event.client_x() as f32,
                    event.client_y() as f32,
                    w,
                    h,
                );
            });
            let _ = window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch steering
        for name in ["touchstart", "touchmove"] {
            let game = game.clone();
            let win = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let (w, h) = viewport(&win);
                let mut g = game.borrow_mut();
                g.session.effects().resume_audio();
                g.session
                    .input_mut()
                    .pointer_moved(touch.client_x() as f32, touch.client_y() as f32, w, h);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Split / eject
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.session.effects().resume_audio();
                if g.session.input_mut().key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.input_mut().key_up(&event.code());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // First click unlocks audio
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow().session.effects().resume_audio();
            });
            let _ = window.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>, frames: Rc<FrameLoop>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Resize
        {
            let game = game.clone();
            let win = window.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (w, h) = fit_canvas(&win, &canvas);
                let mut g = game.borrow_mut();
                g.view_size = (w as f32, h as f32);
                if let Some(rs) = g.render_state.as_mut() {
                    rs.resize(canvas.width(), canvas.height());
                }
                if let Some(overlay) = g.overlay.as_ref() {
                    overlay.fit(&win);
                }
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Lost focus: drop held keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.input_mut().release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hidden tab: silence audio and restart frame timing on return
        if let Some(document) = window.document() {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = doc.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut g = game.borrow_mut();
                g.session.effects_mut().set_suspended(hidden);
                g.session.clock_mut().reset();
                if hidden {
                    g.session.input_mut().release_all();
                }
                log::debug!("Visibility changed (hidden: {})", hidden);
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Leaving the page
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                frames.stop();
                log::info!("Page hidden for good, loop stopped");
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(
        game: Rc<RefCell<Game>>,
        frames: Rc<FrameLoop>,
        config: GameConfig,
        tuning: Tuning,
    ) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Ok(buttons) = document.query_selector_all(".menu-btn") {
            for i in 0..buttons.length() {
                let Some(btn) = buttons.item(i) else {
                    continue;
                };
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow().session.effects().play(SoundEffect::Hover);
                });
                let _ = btn.add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let restarted = {
                    let mut g = game.borrow_mut();
                    g.session.effects().play(SoundEffect::Click);
                    if !g.session.is_over() {
                        false
                    } else {
                        // settings may have changed since the last round
                        let settings = Settings::load();
                        g.session = new_session(&config, &tuning, &settings, &frames);
                        g.hud_last_ms = 0.0;
                        true
                    }
                };
                if !restarted {
                    return;
                }
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    if let Some(el) = document.get_element_by_id("end-screen") {
                        let _ = el.set_attribute("class", "hidden");
                    }
                    if let Some(el) = document.get_element_by_id("hud") {
                        let _ = el.set_attribute("class", "");
                    }
                }
                frames.stopped.set(false);
                request_animation_frame(game.clone(), frames.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, frames: Rc<FrameLoop>) {
        if frames.stopped.get() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let pending = frames.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, frames, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => pending.handle.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, frames: Rc<FrameLoop>, time: f64) {
        frames.handle.set(None);
        let ended = {
            let mut g = game.borrow_mut();
            let ended = g.session.frame(time);
            g.render();
            g.update_hud(time);
            ended
        };

        if let Some(termination) = ended {
            match termination {
                Termination::GameOver => log::info!("Eliminated"),
                Termination::CashOut(score) => log::info!("Extracted with {}", score),
            }
            return;
        }

        request_animation_frame(game, frames);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use trash_wars::effects::Effects;
    use trash_wars::sim::{PortalState, TickInput, World};
    use trash_wars::{GameConfig, Session, SessionHooks, Tuning};

    /// Ten minutes of frames
    const MAX_FRAMES: u32 = 36_000;
    /// Autopilot heads for an open portal once this heavy
    const EXTRACT_MASS: f32 = 150.0;

    /// Mass-weighted center of the hero's cells
    fn hero_center(world: &World) -> Option<Vec2> {
        let (sum, mass) = world
            .hero_cells()
            .fold((Vec2::ZERO, 0.0), |(s, m), c| (s + c.body.pos * c.body.mass, m + c.body.mass));
        (mass > 0.0).then(|| sum / mass)
    }

    /// Chase the nearest trash, or the portal when heavy enough
    fn autopilot(world: &World) -> TickInput {
        let Some(center) = hero_center(world) else {
            return TickInput::default();
        };

        let portal = world
            .portals
            .iter()
            .find(|p| p.state == PortalState::Open)
            .filter(|_| world.hero_mass() >= EXTRACT_MASS)
            .map(|p| p.body.pos);

        let target = portal.or_else(|| {
            world
                .trash
                .iter()
                .map(|t| t.body.pos)
                .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)))
        });

        TickInput {
            pointer: target.map(|t| t - center).unwrap_or(Vec2::X),
            ..Default::default()
        }
    }

    pub fn run(seed: u64) {
        let config = GameConfig::default();
        let hooks = SessionHooks::new(
            |score| log::info!("Eliminated with mass {}", score),
            |score| log::info!("Extracted with mass {}", score),
        );
        let mut session = Session::new(config, Tuning::load(), seed, Effects::default(), hooks);

        let mut frames = 0;
        while frames < MAX_FRAMES && !session.is_over() {
            let input = autopilot(session.world());
            session.advance(&input, 1.0);
            frames += 1;
        }

        let world = session.world();
        log::info!(
            "Stopped after {} frames ({:.1}s): {:?}, earnings {:.2} SOL",
            frames,
            world.clock_ms / 1000.0,
            session.outcome(),
            session.estimated_earnings()
        );
        for (rank, entry) in world.leaderboard(5).iter().enumerate() {
            log::info!("{}. {} {:.0}", rank + 1, entry.name, entry.mass);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Trash Wars (native) starting...");
    log::info!("Native mode runs a headless autopilot match - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    log::info!("Seed: {}", seed);

    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
