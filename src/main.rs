//! Ball Toss entry point
//!
//! Handles platform-specific initialization and runs the session loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Document, HtmlCanvasElement, HtmlImageElement, MouseEvent};

    use ball_toss::assets::{AssetError, AssetManifest, LoadTracker};
    use ball_toss::consts::*;
    use ball_toss::renderer::{CanvasRenderer, SpriteSheet, redraw};
    use ball_toss::settings::Settings;
    use ball_toss::sim::{GameEvent, Session, TickInput, tick};

    const GAME_OVER_STYLE: &str = "position: fixed; top: 50%; left: 50%; \
        transform: translate(-50%, -50%); font-size: 80px; font-weight: bold; \
        text-align: center; color: black; z-index: 9999;";

    /// Game instance holding all state
    struct Game {
        session: Session,
        rng: Pcg32,
        input: TickInput,
        renderer: CanvasRenderer,
        document: Document,
    }

    impl Game {
        /// Advance the session and repaint if anything changed
        fn frame(&mut self, time: f64) {
            let events = tick(&mut self.session, &self.input, time, &mut self.rng);
            // Clear one-shot inputs after processing
            self.input.click = None;

            for event in &events {
                match event {
                    GameEvent::GameScreenShown => {
                        set_hidden(&self.document, "loading-screen", true);
                        set_hidden(&self.document, "game-screen", false);
                    }
                    GameEvent::GameOver => {
                        if let Err(e) = show_game_over(&self.document) {
                            log::error!("Failed to show game over: {:?}", e);
                        }
                    }
                    _ => {}
                }
            }

            if !events.is_empty() && self.session.phase.is_live() {
                redraw(&mut self.renderer, &self.session);
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let result = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
            if let Err(e) = result {
                log::warn!("Failed to toggle hidden on #{}: {:?}", id, e);
            }
        }
    }

    fn show_game_over(document: &Document) -> Result<(), JsValue> {
        set_hidden(document, "game-screen", true);
        let overlay = document.create_element("div")?;
        overlay.set_id("game-over");
        overlay.set_text_content(Some("Game Over"));
        overlay.set_attribute("style", GAME_OVER_STYLE)?;
        document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&overlay)?;
        Ok(())
    }

    fn asset_error(e: AssetError) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Start loading one image; the promise settles on load or error
    fn start_image_load(src: &str) -> Result<(HtmlImageElement, js_sys::Promise), JsValue> {
        let img = HtmlImageElement::new()?;
        let target = img.clone();
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            target.set_onload(Some(&resolve));
            target.set_onerror(Some(&reject));
        });
        img.set_src(src);
        Ok((img, promise))
    }

    /// Load every sprite in the manifest. All requests start before any await.
    async fn load_sprites(manifest: &AssetManifest) -> Result<SpriteSheet, JsValue> {
        let mut avatars: [[Vec<HtmlImageElement>; 4]; 3] = Default::default();
        let mut pending = Vec::new();

        for (a, sets) in manifest.avatars.iter().enumerate() {
            for (s, set) in sets.iter().enumerate() {
                for path in set.paths() {
                    let (img, promise) = start_image_load(path)?;
                    avatars[a][s].push(img);
                    pending.push((path.clone(), promise));
                }
            }
        }
        let (ball, promise) = start_image_load(&manifest.ball)?;
        pending.push((manifest.ball.clone(), promise));

        // Every promise is awaited so no request is left unobserved; the first
        // failure is reported once all have settled.
        let mut tracker = LoadTracker::for_manifest(manifest);
        let mut failure = None;
        for (path, promise) in pending {
            if JsFuture::from(promise).await.is_err() {
                let error = tracker.mark_failed(&path);
                failure.get_or_insert(error);
                continue;
            }
            if tracker.mark_loaded() {
                log::info!("All assets loaded");
            } else {
                log::debug!("Loaded {} ({:.0}%)", path, tracker.progress() * 100.0);
            }
        }

        match failure {
            Some(error) => Err(asset_error(error)),
            None => Ok(SpriteSheet { avatars, ball }),
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }

        log::info!("Ball Toss starting...");

        let settings = Settings::load();
        let manifest = AssetManifest::default();
        let session = manifest.new_session(settings.condition).map_err(asset_error)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        canvas.set_width(CANVAS_WIDTH);
        canvas.set_height(CANVAS_HEIGHT);

        let sprites = load_sprites(&manifest).await?;
        let renderer = CanvasRenderer::new(&canvas, sprites)?;

        let seed = js_sys::Date::now() as u64;
        log::info!("Session seeded with: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            rng: Pcg32::seed_from_u64(seed),
            input: TickInput {
                assets_loaded: true,
                click: None,
            },
            renderer,
            document,
        }));

        setup_input_handlers(&canvas, game.clone());

        // Start session loop
        request_animation_frame(game);

        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let rect = canvas_clone.get_bounding_client_rect();
            let x = event.client_x() as f32 - rect.left() as f32;
            let y = event.client_y() as f32 - rect.top() as f32;
            game.borrow_mut().input.click = Some(Vec2::new(x, y));
        });
        let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
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
        let over = {
            let mut g = game.borrow_mut();
            g.frame(time);
            g.session.is_over()
        };

        // Terminal state: nothing left to schedule
        if !over {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Ball Toss failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ball Toss (native) starting...");
    log::info!("The browser build runs with `trunk serve`; running a headless session");

    let settings = ball_toss::Settings::load();
    let seed = settings.seed.unwrap_or_else(rand::random);
    match headless::run(&settings, seed) {
        Ok(summary) => summary.print(),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session with a scripted participant who clicks a random computer
/// avatar as soon as a pick is accepted
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use ball_toss::assets::{AssetError, AssetManifest};
    use ball_toss::input::accepts_selection;
    use ball_toss::settings::{Condition, Settings};
    use ball_toss::sim::{AvatarId, GameEvent, Session, TickInput, tick};

    /// Simulated frame length (ms)
    const FRAME_MS: f64 = 16.0;

    pub struct Summary {
        pub condition: Condition,
        pub seed: u64,
        pub received: [u32; 3],
        pub elapsed_ms: f64,
        pub session: Session,
    }

    impl Summary {
        pub fn print(&self) {
            let total: u32 = self.received.iter().sum();
            println!("Condition: {} (seed {})", self.condition.as_str(), self.seed);
            for id in AvatarId::ALL {
                println!("  {:>3} received {:>2} of {}", id.name(), self.received[id.index()], total);
            }
            println!("Session length: {:.1}s", self.elapsed_ms / 1000.0);
            match serde_json::to_string(&self.session) {
                Ok(json) => log::debug!("Final session: {}", json),
                Err(e) => log::warn!("Could not serialize session: {}", e),
            }
        }
    }

    pub fn run(settings: &Settings, seed: u64) -> Result<Summary, AssetError> {
        let mut session = AssetManifest::default().new_session(settings.condition)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut participant = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let mut received = [0u32; 3];
        let mut now = 0.0;

        while !session.is_over() {
            let click = accepts_selection(&session).then(|| {
                let pick = if participant.random_bool(0.5) {
                    AvatarId::Computer1
                } else {
                    AvatarId::Computer2
                };
                session.avatar(pick).pos
            });
            let input = TickInput {
                assets_loaded: true,
                click,
            };

            for event in tick(&mut session, &input, now, &mut rng) {
                if let GameEvent::Dispatched(dispatch) = event {
                    received[dispatch.to.index()] += 1;
                }
            }
            now += FRAME_MS;
        }

        Ok(Summary {
            condition: settings.condition,
            seed,
            received,
            elapsed_ms: now,
            session,
        })
    }
}
