//! Geocoin Carrier entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use geocoin::platform::{LocalStorage, MemoryStorage, Storage};
    use geocoin::renderer::{MapView, RenderState, SceneOptions, build};
    use geocoin::sim::{Command, Direction, GameState, LatLng, apply};
    use geocoin::{SaveSlot, Settings};

    /// Browser storage, or memory when LocalStorage is blocked
    enum AnyStorage {
        Local(LocalStorage),
        Memory(MemoryStorage),
    }

    impl Storage for AnyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, geocoin::platform::StorageError> {
            match self {
                AnyStorage::Local(s) => s.get(key),
                AnyStorage::Memory(s) => s.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), geocoin::platform::StorageError> {
            match self {
                AnyStorage::Local(s) => s.set(key, value),
                AnyStorage::Memory(s) => s.set(key, value),
            }
        }

        fn remove(&mut self, key: &str) -> Result<(), geocoin::platform::StorageError> {
            match self {
                AnyStorage::Local(s) => s.remove(key),
                AnyStorage::Memory(s) => s.remove(key),
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        slot: SaveSlot<AnyStorage>,
        render_state: Option<RenderState>,
        /// Canvas size in CSS pixels
        view_size: Vec2,
        /// Active geolocation watch
        watch_id: Option<i32>,
        /// Last command message for the status line
        status: String,
    }

    impl Game {
        fn new(settings: Settings, mut slot: SaveSlot<AnyStorage>) -> Self {
            let state = slot.load_or_new(&settings.rules);
            Self {
                state,
                settings,
                slot,
                render_state: None,
                view_size: Vec2::ZERO,
                watch_id: None,
                status: String::new(),
            }
        }

        fn view(&self) -> MapView {
            MapView::new(
                self.state.position,
                self.settings.pixels_per_cell,
                self.state.rules.tile_degrees,
                self.view_size,
            )
        }

        /// Apply a command, persist, and report
        fn run(&mut self, command: Command) {
            match apply(&mut self.state, &command) {
                Ok(outcome) => {
                    log::debug!("{:?} -> {:?}", command, outcome);
                    self.status.clear();
                    if outcome.needs_save() && self.settings.auto_save {
                        if let Err(e) = self.slot.save(&self.state) {
                            log::warn!("Save failed: {}", e);
                        }
                    }
                }
                Err(e) => {
                    log::info!("{:?} refused: {}", command, e);
                    self.status = e.to_string();
                }
            }
            self.update_hud();
        }

        /// Render the current frame
        fn render(&mut self) {
            let view = self.view();
            let options = SceneOptions {
                show_trail: self.settings.show_trail,
            };
            let vertices = build(&mut self.state, &view, options);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices, &view) {
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
        }

        /// Update inventory, popup and status elements
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("inventory") {
                let text = if self.state.inventory.is_empty() {
                    "No coins yet...".to_string()
                } else {
                    let labels: Vec<&str> =
                        self.state.inventory.iter().map(|c| c.label()).collect();
                    format!("Carrying {}: {}", labels.len(), labels.join(" "))
                };
                el.set_text_content(Some(&text));
            }

            if let Some(el) = document.get_element_by_id("popup") {
                match self.state.opened_cache() {
                    Some(cache) => {
                        let labels: Vec<&str> = cache.coins.iter().map(|c| c.label()).collect();
                        let text = format!(
                            "Cache {} holds {}: {}",
                            cache.cell,
                            labels.len(),
                            labels.join(" ")
                        );
                        el.set_text_content(Some(&text));
                        let _ = el.set_attribute("class", "");
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&self.status));
            }
        }

        fn set_follow_geolocation(&mut self, game: Rc<RefCell<Game>>, follow: bool) {
            self.settings.follow_geolocation = follow;
            self.settings.save(self.slot.storage_mut());

            let Some(geolocation) = web_sys::window().and_then(|w| w.navigator().geolocation().ok())
            else {
                log::warn!("Geolocation unavailable");
                return;
            };

            if let Some(id) = self.watch_id.take() {
                geolocation.clear_watch(id);
                log::info!("Geolocation stopped");
            }
            if follow {
                let closure = Closure::<dyn FnMut(_)>::new(
                    move |position: web_sys::GeolocationPosition| {
                        let coords = position.coords();
                        let target = LatLng::new(coords.latitude(), coords.longitude());
                        game.borrow_mut().run(Command::SetPosition(target));
                    },
                );
                match geolocation.watch_position(closure.as_ref().unchecked_ref()) {
                    Ok(id) => {
                        self.watch_id = Some(id);
                        log::info!("Geolocation started");
                    }
                    Err(e) => log::warn!("watchPosition failed: {:?}", e),
                }
                closure.forget();
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Geocoin Carrier starting...");

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

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let storage = match LocalStorage::open() {
            Ok(storage) => AnyStorage::Local(storage),
            Err(e) => {
                log::warn!("{}; progress will not persist", e);
                AnyStorage::Memory(MemoryStorage::default())
            }
        };
        let settings = Settings::load(&storage);
        let follow = settings.follow_geolocation;
        let game = Rc::new(RefCell::new(Game::new(settings, SaveSlot::new(storage))));
        game.borrow_mut().view_size = Vec2::new(client_w as f32, client_h as f32);

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
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        setup_buttons(game.clone());
        setup_keyboard(game.clone());
        setup_canvas_click(&canvas, game.clone());

        if follow {
            let g = game.clone();
            game.borrow_mut().set_follow_geolocation(g, true);
        }

        game.borrow_mut().update_hud();
        request_animation_frame(game);

        log::info!("Geocoin Carrier running!");
    }

    fn on_click(id: &str, game: Rc<RefCell<Game>>, command: Command) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().run(command.clone());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("north", game.clone(), Command::Move(Direction::North));
        on_click("south", game.clone(), Command::Move(Direction::South));
        on_click("east", game.clone(), Command::Move(Direction::East));
        on_click("west", game.clone(), Command::Move(Direction::West));
        on_click("take", game.clone(), Command::Take);
        on_click("leave", game.clone(), Command::Leave);
        on_click("take-all", game.clone(), Command::TakeAll);
        on_click("leave-all", game.clone(), Command::LeaveAll);
        on_click("close", game.clone(), Command::Close);

        let document = web_sys::window().unwrap().document().unwrap();

        // Reset asks first
        if let Some(btn) = document.get_element_by_id("reset") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let confirmed = web_sys::window()
                    .and_then(|w| w.confirm_with_message("Erase all progress?").ok())
                    .unwrap_or(false);
                if confirmed {
                    game.borrow_mut().run(Command::Reset);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Sensor toggle
        if let Some(btn) = document.get_element_by_id("sensor") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let follow = !game.borrow().settings.follow_geolocation;
                let g = game.clone();
                game.borrow_mut().set_follow_geolocation(g, follow);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            let command = match key.as_str() {
                "t" | "T" => Some(Command::Take),
                "l" | "L" => Some(Command::Leave),
                "Escape" => Some(Command::Close),
                other => other.parse::<Direction>().ok().map(Command::Move),
            };
            if let Some(command) = command {
                event.prevent_default();
                game.borrow_mut().run(command);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_canvas_click(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut g = game.borrow_mut();
            let click = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            let cell = g.view().pick(click, g.state.rules.tile_degrees);
            g.run(Command::Open(cell));
        });
        let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().render();
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};

    use geocoin::platform::FileStorage;
    use geocoin::sim::{Cell, Coin, Command, Direction, GameState, apply};
    use geocoin::{SaveSlot, Settings};

    const HELP: &str = "commands: n s e w | look | open <i,j> | close | take | leave | \
                        take-all | leave-all | grab <coin> | inv | reset | help | quit";

    fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        let command = match head {
            "open" => {
                let key = arg.ok_or("open needs a cell, e.g. open 369894,-1220628")?;
                let cell = key.parse::<Cell>().map_err(|e| format!("{}", e))?;
                Command::Open(cell)
            }
            "close" => Command::Close,
            "take" => Command::Take,
            "leave" => Command::Leave,
            "take-all" => Command::TakeAll,
            "leave-all" => Command::LeaveAll,
            "grab" => Command::TakeCoin(Coin::from_label(arg.ok_or("grab needs a coin label")?)),
            "reset" => Command::Reset,
            other => match other.parse::<Direction>() {
                Ok(direction) => Command::Move(direction),
                Err(_) => return Err(format!("unknown command {:?}", other)),
            },
        };
        Ok(Some(command))
    }

    fn look(state: &mut GameState, out: &mut impl Write) -> io::Result<()> {
        let here = state.player_cell();
        writeln!(out, "You are at {:.6},{:.6} (cell {})", state.position.lat, state.position.lng, here)?;
        let caches = state.visible_caches();
        if caches.is_empty() {
            writeln!(out, "No caches in range.")?;
        }
        for cell in caches {
            let coins = state.board.get(cell).map_or(0, |c| c.coins.len());
            let marker = if state.opened == Some(cell) { "*" } else { " " };
            writeln!(out, "{} cache {} ({} coins, {} away)", marker, cell, coins, cell.distance(here))?;
        }
        Ok(())
    }

    fn show_inventory(state: &GameState, out: &mut impl Write) -> io::Result<()> {
        if state.inventory.is_empty() {
            return writeln!(out, "No coins yet...");
        }
        let labels: Vec<&str> = state.inventory.iter().map(|c| c.label()).collect();
        writeln!(out, "Carrying {}: {}", labels.len(), labels.join(" "))
    }

    pub fn run() -> io::Result<()> {
        let path = std::env::var("GEOCOIN_SAVE").unwrap_or_else(|_| "geocoin_save.json".into());
        let storage = FileStorage::new(&path);
        let settings = Settings::load(&storage);
        let mut slot = SaveSlot::new(storage);
        let mut state = slot.load_or_new(&settings.rules);
        log::info!("Save file: {}", path);

        let stdin = io::stdin();
        let mut out = io::stdout();
        writeln!(out, "{}", HELP)?;
        look(&mut state, &mut out)?;

        for line in stdin.lock().lines() {
            let line = line?;
            match line.trim() {
                "quit" | "exit" => break,
                "help" => writeln!(out, "{}", HELP)?,
                "look" => look(&mut state, &mut out)?,
                "inv" => show_inventory(&state, &mut out)?,
                text => match parse(text) {
                    Ok(Some(command)) => match apply(&mut state, &command) {
                        Ok(outcome) => {
                            writeln!(out, "{:?}", outcome)?;
                            if outcome.needs_save() && settings.auto_save {
                                if let Err(e) = slot.save(&state) {
                                    log::warn!("Save failed: {}", e);
                                }
                            }
                            if let Some(cache) = state.opened_cache() {
                                let labels: Vec<&str> = cache.coins.iter().map(|c| c.label()).collect();
                                writeln!(out, "Cache {}: {}", cache.cell, labels.join(" "))?;
                            }
                        }
                        Err(e) => writeln!(out, "Can't: {}", e)?,
                    },
                    Ok(None) => {}
                    Err(e) => writeln!(out, "{}", e)?,
                },
            }
            out.flush()?;
        }

        if settings.auto_save {
            if let Err(e) = slot.save(&state) {
                log::warn!("Save failed: {}", e);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_commands() {
            assert_eq!(parse("n"), Ok(Some(Command::Move(Direction::North))));
            assert_eq!(parse("  "), Ok(None));
            assert_eq!(parse("take-all"), Ok(Some(Command::TakeAll)));
            assert_eq!(parse("open 1,-2"), Ok(Some(Command::Open(Cell::new(1, -2)))));
            assert_eq!(
                parse("grab #1@1,-2"),
                Ok(Some(Command::TakeCoin(Coin::from_label("#1@1,-2"))))
            );
            assert!(parse("open").is_err());
            assert!(parse("open nowhere").is_err());
            assert!(parse("dance").is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Geocoin Carrier (terminal) starting...");
    log::info!("The map view needs the web build - run with `trunk serve`");

    if let Err(e) = terminal::run() {
        log::error!("Terminal session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
