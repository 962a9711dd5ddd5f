//! Tone Recall entry point
//!
//! Wasm builds wire the game into the page (pads, start button, HUD,
//! audio unlock); native builds run a logged self-play demo of the core.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::Document;

    use tone_recall::audio::WebAudio;
    use tone_recall::game::{GameConfig, GameSession, InputOutcome, Symbol, ToneSink};
    use tone_recall::pads::PadBoard;

    /// Everything the page callbacks share
    struct App {
        session: GameSession,
        /// Second handle on the audio context, for gesture unlock
        audio: Option<WebAudio>,
        unlocked: bool,
    }

    impl App {
        /// Unlock/resume audio on the first user gesture
        fn unlock(&mut self) {
            if let Some(audio) = &self.audio {
                audio.resume();
            }
            self.unlocked = true;
        }

        fn update_hud(&self, document: &Document) {
            let stats = self.session.stats();
            if let Some(el) = document.get_element_by_id("level-display") {
                el.set_text_content(Some(&format!("Level: {}", stats.level)));
            }
            if let Some(el) = document.get_element_by_id("combo-display") {
                el.set_text_content(Some(&format!("Combo: {}", stats.combo)));
            }
        }
    }

    fn now_ms() -> u64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now() as u64)
            .unwrap_or(0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Audio may be unavailable; the game still runs visual-only
        let audio = match WebAudio::new() {
            Ok(audio) => Some(audio),
            Err(_) => {
                if let Some(modal) = document.get_element_by_id("modal") {
                    let _ = modal.class_list().remove_1("hidden");
                }
                None
            }
        };

        let board = PadBoard::from_document(&document);
        let seed = js_sys::Date::now() as u64;
        log::info!("seed: {seed}");

        let session = GameSession::new(
            GameConfig::default(),
            seed,
            audio
                .clone()
                .map(|a| Box::new(a) as Box<dyn ToneSink>),
            Box::new(board),
        );
        let app = Rc::new(RefCell::new(App {
            session,
            audio,
            unlocked: false,
        }));

        setup_unlock_listeners(app.clone(), &document);
        setup_pad_listeners(app.clone(), &document);
        setup_start_button(app.clone(), &document);
        start_frame_loop(app, document);
    }

    /// Unlock on touch (mobile) or click (desktop)
    fn setup_unlock_listeners(app: Rc<RefCell<App>>, document: &Document) {
        for event in ["touchstart", "click"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().unlock();
            });
            let _ = document
                .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pad clicks feed the state machine; taps before unlock are swallowed
    fn setup_pad_listeners(app: Rc<RefCell<App>>, document: &Document) {
        let Ok(pads) = document.query_selector_all(".pad") else {
            return;
        };
        for i in 0..pads.length() {
            let Some(pad) = pads.get(i) else { continue };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut app = app.borrow_mut();
                if !app.unlocked {
                    return;
                }
                match app.session.submit_input(Symbol(i as u8), now_ms()) {
                    Ok(InputOutcome::RoundFailed) => {
                        if let Some(window) = web_sys::window() {
                            let _ = window.alert_with_message("Wrong tone! Try again.");
                        }
                    }
                    Ok(_) => {}
                    Err(err) => log::error!("rejected input: {err}"),
                }
            });
            let _ = pad.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(app: Rc<RefCell<App>>, document: &Document) {
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut app = app.borrow_mut();
                app.unlock();
                app.session.start_game(now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// requestAnimationFrame loop pumping the session timers and the HUD
    fn start_frame_loop(app: Rc<RefCell<App>>, document: Document) {
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();

        *g.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            {
                let mut app = app.borrow_mut();
                app.session.advance(timestamp as u64);
                app.update_hud(&document);
            }
            request_frame(&f);
        }));
        request_frame(&g);
    }

    fn request_frame(f: &Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>) {
        let slot = f.borrow();
        if let (Some(window), Some(closure)) = (web_sys::window(), slot.as_ref()) {
            let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native_demo {
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use tone_recall::consts::PAD_TONES_HZ;
    use tone_recall::game::{
        GameConfig, GameSession, InputOutcome, PadDisplay, RoundState, Symbol,
    };

    struct ConsolePads;

    impl PadDisplay for ConsolePads {
        fn flash(&mut self, symbol: Symbol) {
            log::info!("pad {} lights up ({} Hz)", symbol.0, PAD_TONES_HZ[symbol.index()]);
        }
    }

    /// Self-play a few rounds, then deliberately miss once to show the
    /// failure path, all against the real timing constants.
    pub fn run() {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0x5EED);
        let config = GameConfig::default();
        let mut session = GameSession::new(config, seed, None, Box::new(ConsolePads));

        let epoch = Instant::now();
        let now_ms = || epoch.elapsed().as_millis() as u64;

        session.start_game(now_ms());
        let mut cleared = 0u32;

        loop {
            let t = now_ms();
            session.advance(t);

            if session.state() == RoundState::AwaitingInput {
                let next = session.sequence()[session.progress()];
                let symbol = if cleared == 3 && session.progress() == 0 {
                    Symbol((next.0 + 1) % config.pad_count)
                } else {
                    next
                };
                match session.submit_input(symbol, t) {
                    Ok(InputOutcome::RoundComplete { combo }) => {
                        cleared += 1;
                        log::info!("cleared round, combo now {combo}");
                    }
                    Ok(InputOutcome::RoundFailed) => {
                        log::info!("missed on purpose - combo back to {}", session.stats().combo);
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        log::error!("demo submitted a bad symbol: {err}");
                        break;
                    }
                }
            }

            std::thread::sleep(Duration::from_millis(10));
        }

        let stats = session.stats();
        log::info!("demo over at level {} after {} cleared rounds", stats.level, cleared);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tone Recall (native) starting self-play demo...");
    native_demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
