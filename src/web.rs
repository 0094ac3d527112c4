//! Browser bindings
//!
//! `WebRunner` wraps a [`Game`] for a JavaScript host. The host forwards DOM
//! input events and either drives frames itself (`frame`) or lets the runner
//! own a requestAnimationFrame loop (`start_loop` / `stop_loop`). Snapshots
//! cross the boundary as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::audio::WebAudio;
use crate::game::{Game, RunConfig};
use crate::persistence::{LocalStorage, SessionStore};
use crate::sim::Difficulty;

struct Shared {
    game: Game,
    raf_id: Option<i32>,
    on_frame: Option<js_sys::Function>,
}

#[wasm_bindgen]
pub struct WebRunner {
    inner: Rc<RefCell<Shared>>,
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Snapshot encoding failed: {e}");
        String::from("null")
    })
}

fn fresh_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[wasm_bindgen]
impl WebRunner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebRunner {
        console_error_panic_hook::set_once();
        // Ignore "already initialised" when several runners are created
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Chef Runner starting...");

        let store = SessionStore::new(Box::new(LocalStorage));
        let game = Game::new(store, Box::new(WebAudio::new()));
        WebRunner {
            inner: Rc::new(RefCell::new(Shared {
                game,
                raf_id: None,
                on_frame: None,
            })),
        }
    }

    /// Start a run. Unknown difficulty names fall back to medium.
    pub fn start(&self, difficulty: &str, level: u32) -> bool {
        let seed = fresh_seed();
        let config = RunConfig {
            difficulty: Difficulty::from_str(difficulty).unwrap_or_default(),
            start_level: level,
            seed,
        };
        let started = self.inner.borrow_mut().game.start(config);
        if started {
            log::info!("Game initialized with seed: {}", seed);
        }
        started
    }

    pub fn restart(&self) -> bool {
        self.inner.borrow_mut().game.restart(fresh_seed())
    }

    pub fn to_menu(&self) {
        self.inner.borrow_mut().game.to_menu();
    }

    pub fn set_autopilot(&self, enabled: bool) {
        self.inner.borrow_mut().game.set_autopilot(enabled);
    }

    /// Returns true when the key mapped to an intent (host may preventDefault)
    pub fn key_down(&self, key: &str) -> bool {
        self.inner.borrow_mut().game.key_down(key).is_some()
    }

    pub fn key_up(&self, key: &str) {
        self.inner.borrow_mut().game.key_up(key);
    }

    pub fn touch_start(&self, x: f32, y: f32) {
        self.inner.borrow_mut().game.touch_start(x, y);
    }

    pub fn touch_end(&self, x: f32, y: f32) -> bool {
        self.inner.borrow_mut().game.touch_end(x, y).is_some()
    }

    /// Advance to an animation-frame timestamp and return the frame as JSON
    pub fn frame(&self, now_ms: f64) -> String {
        let mut shared = self.inner.borrow_mut();
        shared.game.advance_to(now_ms);
        to_json(&shared.game.frame())
    }

    /// Events raised by the last frame, as JSON
    pub fn events(&self) -> String {
        to_json(&self.inner.borrow().game.recent_events())
    }

    pub fn session(&self) -> String {
        to_json(self.inner.borrow().game.session())
    }

    pub fn update_profile(&self, name: &str, email: Option<String>) {
        self.inner
            .borrow_mut()
            .game
            .update_profile(name, email.as_deref());
    }

    pub fn set_muted(&self, muted: bool) {
        let mut shared = self.inner.borrow_mut();
        let settings = crate::Settings {
            muted,
            ..shared.game.settings().clone()
        };
        shared.game.update_settings(settings);
    }

    /// Run frames on requestAnimationFrame, calling `on_frame(json)` each time
    pub fn start_loop(&self, on_frame: js_sys::Function) {
        {
            let mut shared = self.inner.borrow_mut();
            shared.on_frame = Some(on_frame);
            if shared.raf_id.is_some() {
                return;
            }
            // Placeholder id marks the loop live until the first request lands
            shared.raf_id = Some(0);
        }
        request_animation_frame(self.inner.clone());
    }

    /// Detach the frame loop (unmount, tab hidden)
    pub fn stop_loop(&self) {
        let mut shared = self.inner.borrow_mut();
        if let Some(id) = shared.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        shared.on_frame = None;
        shared.game.reset_clock();
    }
}

impl Default for WebRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn request_animation_frame(inner: Rc<RefCell<Shared>>) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; frame loop not started");
        return;
    };
    let next = inner.clone();
    let closure = Closure::once(move |time: f64| {
        game_loop(next, time);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => inner.borrow_mut().raf_id = Some(id),
        Err(_) => {
            log::error!("requestAnimationFrame failed");
            inner.borrow_mut().raf_id = None;
        }
    }
    closure.forget();
}

fn game_loop(inner: Rc<RefCell<Shared>>, time: f64) {
    let (callback, json) = {
        let mut shared = inner.borrow_mut();
        if shared.raf_id.is_none() {
            // Stopped while this frame was queued
            return;
        }
        shared.game.advance_to(time);
        let json = to_json(&shared.game.frame());
        (shared.on_frame.clone(), json)
    };
    // Borrow released: the callback may call back into the runner
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log::warn!("Frame callback threw: {:?}", e);
        }
    }
    if inner.borrow().raf_id.is_some() {
        request_animation_frame(inner);
    }
}
