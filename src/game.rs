//! Host-side game driver
//!
//! Owns the simulation state and everything around it: frame clock, input
//! queue, session store, settings and the audio sink. The host calls
//! [`Game::advance`] once per animation frame and reads [`Game::frame`] for
//! rendering.

use crate::audio::{AudioSink, SoundEffect};
use crate::consts::SIM_DT;
use crate::persistence::{SessionStore, UserSession};
use crate::platform::{FrameClock, InputQueue, Intent};
use crate::settings::Settings;
use crate::sim::{Difficulty, GameEvent, GameState, RunStatus, SimFault, tick};
use crate::view::FrameView;

/// Parameters for a new run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub start_level: u32,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            start_level: 1,
            seed: 0,
        }
    }
}

/// Game instance holding all state
pub struct Game {
    state: GameState,
    clock: FrameClock,
    input: InputQueue,
    store: SessionStore,
    session: UserSession,
    settings: Settings,
    audio: Box<dyn AudioSink>,
    config: RunConfig,
    /// Demo mode - the simulation steers itself
    autopilot: bool,
    /// Events from the last `advance`, for HUD collaborators
    recent_events: Vec<GameEvent>,
    last_fault: Option<SimFault>,
}

impl Game {
    pub fn new(store: SessionStore, mut audio: Box<dyn AudioSink>) -> Self {
        let settings = Settings::load(store.backend());
        let session = store.load();
        audio.set_volume(settings.effective_volume(), settings.muted);

        let mut state = GameState::new(0);
        state.max_particles = settings.max_particles();

        Self {
            state,
            clock: FrameClock::new(),
            input: InputQueue::new(),
            store,
            session,
            settings,
            audio,
            config: RunConfig::default(),
            autopilot: false,
            recent_events: Vec::new(),
            last_fault: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> RunConfig {
        self.config
    }

    pub fn last_fault(&self) -> Option<&SimFault> {
        self.last_fault.as_ref()
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.autopilot != enabled {
            log::info!("Autopilot: {}", enabled);
        }
        self.autopilot = enabled;
    }

    /// Start a run from MENU or GAME_OVER. Ignored mid-run.
    pub fn start(&mut self, config: RunConfig) -> bool {
        if self.state.status == RunStatus::Playing {
            log::debug!("Start ignored: run in progress");
            return false;
        }
        self.config = config;
        self.state = GameState::new(config.seed);
        self.state.max_particles = self.settings.max_particles();
        self.state.start_run(config.difficulty, config.start_level);
        self.clock.reset();
        self.input.clear();
        self.last_fault = None;
        self.recent_events.clear();
        self.route_events();
        true
    }

    /// Replay the last configuration with a new seed (GAME_OVER only)
    pub fn restart(&mut self, seed: u64) -> bool {
        if self.state.status != RunStatus::GameOver {
            return false;
        }
        self.start(RunConfig {
            seed,
            ..self.config
        })
    }

    /// Abandon the run and go back to the menu
    pub fn to_menu(&mut self) {
        self.state.return_to_menu();
        self.clock.reset();
        self.input.clear();
        self.recent_events.clear();
    }

    /// Drop accumulated frame time and pending input (tab hidden, loop stopped)
    pub fn reset_clock(&mut self) {
        self.clock.reset();
        self.input.clear();
    }

    // === Input ===

    fn accepts_input(&self) -> bool {
        self.state.status == RunStatus::Playing && !self.autopilot
    }

    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        if !self.accepts_input() {
            return None;
        }
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        if self.accepts_input() {
            self.input.touch_start(x, y);
        }
    }

    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<Intent> {
        if !self.accepts_input() {
            return None;
        }
        self.input.touch_end(x, y)
    }

    pub fn push_intent(&mut self, intent: Intent) {
        if self.accepts_input() {
            self.input.push(intent);
        }
    }

    // === Frame loop ===

    /// Advance by an animation-frame timestamp (ms)
    pub fn advance_to(&mut self, now_ms: f64) -> u32 {
        let dt = self.clock.delta_from_timestamp(now_ms);
        self.advance(dt)
    }

    /// Advance by a frame delta (seconds). Returns the number of ticks run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.recent_events.clear();
        let steps = self.clock.steps(frame_dt);

        let mut ran = 0;
        for _ in 0..steps {
            if self.state.status != RunStatus::Playing {
                break;
            }
            let input = self.input.take_tick_input(self.autopilot);
            tick(&mut self.state, &input, SIM_DT);
            ran += 1;
            self.route_events();

            if let Err(fault) = self.state.check_invariants() {
                log::error!("Simulation fault, abandoning run: {fault}");
                self.last_fault = Some(fault);
                self.to_menu();
                break;
            }
        }
        ran
    }

    /// Forward drained simulation events to audio and persistence
    fn route_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(effect) = SoundEffect::from_event(&event) {
                self.audio.play(effect);
            }
            if let GameEvent::RunEnded { final_score } = event {
                self.session = self.store.add_score(&self.session, final_score as f64);
                log::info!(
                    "Run recorded: {} (best {})",
                    final_score,
                    self.session.high_score
                );
            }
            self.recent_events.push(event);
        }
    }

    /// Events raised during the most recent `advance` or `start`
    pub fn recent_events(&self) -> &[GameEvent] {
        &self.recent_events
    }

    pub fn frame(&self) -> FrameView {
        let mut view = FrameView::capture(&self.state, &self.settings);
        view.alpha = self.clock.alpha();
        view
    }

    // === Preferences ===

    pub fn update_settings(&mut self, settings: Settings) {
        self.audio.set_volume(settings.effective_volume(), settings.muted);
        self.state.max_particles = settings.max_particles();
        settings.save(self.store.backend_mut());
        self.settings = settings;
    }

    pub fn update_profile(&mut self, name: &str, email: Option<&str>) {
        self.session = self.store.update_profile(&self.session, name, email);
    }
}
