//! Game state and core simulation types
//!
//! All mutable per-run state lives in [`GameState`], owned by the tick.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{Behavior, EntityKind, IngredientKind, PowerUpKind, lane_point};
use super::difficulty::{Difficulty, DifficultySettings};
use crate::consts::*;

/// Run-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Waiting for a start intent
    Menu,
    /// Active run
    Playing,
    /// Run ended by an obstacle hit
    GameOver,
}

/// One of the three discrete lateral positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Middle,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Middle, Lane::Right];

    /// One step left, clamped at the edge
    pub fn shifted_left(self) -> Self {
        match self {
            Lane::Right => Lane::Middle,
            Lane::Middle | Lane::Left => Lane::Left,
        }
    }

    /// One step right, clamped at the edge
    pub fn shifted_right(self) -> Self {
        match self {
            Lane::Left => Lane::Middle,
            Lane::Middle | Lane::Right => Lane::Right,
        }
    }

    /// Lateral centre of the lane
    pub fn x(self) -> f32 {
        match self {
            Lane::Left => -LANE_SPACING,
            Lane::Middle => 0.0,
            Lane::Right => LANE_SPACING,
        }
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lane: Lane,
    /// Actual lateral offset (eases toward `lane.x()`, drifts while slipping)
    pub x: f32,
    /// Longitudinal position; decreases as the player advances
    pub z: f32,
    pub height: f32,
    pub vertical_vel: f32,
    pub airborne: bool,
    pub speed: f32,
    /// Body roll from lateral motion (radians)
    pub tilt: f32,
    /// Body yaw, spins while slipping (radians)
    pub spin: f32,
    pub fury_timer: f32,
    pub power_up_timer: f32,
    pub power_up: Option<PowerUpKind>,
    pub slip_timer: f32,
    /// Most recent ingredients, oldest first, at most [`INGREDIENT_SLOTS`]
    pub ingredients: Vec<IngredientKind>,
    /// Letters collected toward [`TARGET_WORD`]
    pub letters: Vec<char>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: Lane::Middle,
            x: 0.0,
            z: 0.0,
            height: 0.0,
            vertical_vel: 0.0,
            airborne: false,
            speed: BASE_SPEED,
            tilt: 0.0,
            spin: 0.0,
            fury_timer: 0.0,
            power_up_timer: 0.0,
            power_up: None,
            slip_timer: 0.0,
            ingredients: Vec::with_capacity(INGREDIENT_SLOTS),
            letters: Vec::with_capacity(TARGET_WORD.len()),
        }
    }
}

impl Player {
    pub fn fury_active(&self) -> bool {
        self.fury_timer > 0.0
    }

    pub fn slipping(&self) -> bool {
        self.slip_timer > 0.0
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.power_up == Some(kind)
    }

    /// Distance covered since the run started
    pub fn distance(&self) -> f32 {
        -self.z
    }

    /// Next letter needed to complete the target word, if any
    pub fn next_letter(&self) -> Option<char> {
        TARGET_WORD.chars().nth(self.letters.len())
    }
}

/// A spawned corridor entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Lane at spawn; `pos.x` may drift from it under the magnet
    pub lane: Lane,
    pub pos: Vec3,
    pub active: bool,
    pub behavior: Behavior,
}

impl Entity {
    /// A static entity resting in `lane`; id 0 until pushed into the state
    pub fn in_lane(kind: EntityKind, lane: Lane, z: f32) -> Self {
        Self {
            id: 0,
            kind,
            lane,
            pos: lane_point(lane, kind.spawn_height(), z),
            active: true,
            behavior: Behavior::Static,
        }
    }
}

/// Particle colour category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleColor {
    Steam,
    Gold,
    Purple,
    Gray,
    Blue,
}

/// A cosmetic particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Seconds remaining
    pub life: f32,
    pub color: ParticleColor,
}

/// Camera-follow parameters for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRig {
    pub fov: f32,
    /// Distance behind the player
    pub distance: f32,
    pub height: f32,
    /// Shake intensity, decays toward zero
    pub shake: f32,
    pub shake_offset: Vec2,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            distance: 7.0,
            height: 3.5,
            shake: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }
}

/// Discrete events for audio and HUD collaborators, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Jump,
    CollectItem(IngredientKind),
    CollectLetter(char),
    LevelUp { level: u32 },
    FuryStart,
    FuryEnd,
    PowerUpAcquired(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    Slip,
    SlipEnd,
    Clank,
    /// Shield absorbed an obstacle
    ShieldBroken,
    /// Fury or turbo smashed through an obstacle
    Smash,
    Crash,
    RunEnded { final_score: u64 },
}

/// Internal consistency breach; fatal to the current run only
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimFault {
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("ingredient sequence holds {0} entries")]
    IngredientOverflow(usize),
    #[error("letter sequence holds {0} entries")]
    LetterOverflow(usize),
    #[error("player height {0} below floor")]
    BelowFloor(f32),
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub difficulty: Difficulty,
    pub level: u32,
    /// Derived from (difficulty, level); refreshed whenever either changes
    pub settings: DifficultySettings,
    pub status: RunStatus,
    pub score: f32,
    /// Run clock in seconds
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Active entities (in spawn order, which is id order)
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    pub camera: CameraRig,
    /// Player z at the most recent spawn event
    pub last_spawn_z: f32,
    /// Gameplay RNG (spawn selection)
    pub rng: Pcg32,
    /// Cosmetic RNG (particles, camera shake); never consulted by gameplay
    pub fx_rng: Pcg32,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh state sitting in the menu
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            difficulty: Difficulty::default(),
            level: 1,
            settings: DifficultySettings::for_level(Difficulty::default(), 1),
            status: RunStatus::Menu,
            score: 0.0,
            time: 0.0,
            time_ticks: 0,
            player: Player::default(),
            entities: Vec::new(),
            particles: Vec::new(),
            max_particles: MAX_PARTICLES,
            camera: CameraRig::default(),
            last_spawn_z: INITIAL_SPAWN_Z,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::new(seed, 0xfeed_f00d),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Begin a run (from MENU or GAME_OVER)
    pub fn start_run(&mut self, difficulty: Difficulty, level: u32) {
        self.reset_run();
        self.difficulty = difficulty;
        self.set_level(level.max(1));
        self.status = RunStatus::Playing;
        self.events.push(GameEvent::RunStarted);
        log::info!(
            "Run started: difficulty={} level={} seed={}",
            difficulty.as_str(),
            self.level,
            self.seed
        );
    }

    /// Leave the run and go back to the menu
    pub fn return_to_menu(&mut self) {
        self.reset_run();
        self.set_level(1);
        self.status = RunStatus::Menu;
    }

    /// Clear all per-run mutable state
    fn reset_run(&mut self) {
        self.score = 0.0;
        self.time = 0.0;
        self.time_ticks = 0;
        self.player = Player::default();
        self.entities.clear();
        self.particles.clear();
        self.camera = CameraRig::default();
        self.last_spawn_z = INITIAL_SPAWN_Z;
        self.events.clear();
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
        self.settings = DifficultySettings::for_level(self.difficulty, level);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Assign an id and add the entity to the active set
    pub fn push_entity(&mut self, mut entity: Entity) -> u32 {
        entity.id = self.next_entity_id();
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Spawn a particle burst (or a steam puff) at `pos`
    pub fn spawn_particles(&mut self, pos: Vec3, color: ParticleColor, count: usize) {
        let steam = color == ParticleColor::Steam;
        let (spread, lift, life) = if steam { (1.0, 2.0, 2.0) } else { (4.0, 4.0, 1.0) };
        for _ in 0..count {
            let vel = Vec3::new(
                (self.fx_rng.random::<f32>() - 0.5) * spread,
                self.fx_rng.random::<f32>() * lift + 2.0,
                (self.fx_rng.random::<f32>() - 0.5) * spread,
            );
            self.particles.push(Particle { pos, vel, life, color });
        }
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Kick the camera; stronger shakes override weaker ones
    pub fn shake(&mut self, intensity: f32) {
        self.camera.shake = self.camera.shake.max(intensity);
    }

    pub fn final_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Validate invariants that the tick must preserve
    pub fn check_invariants(&self) -> Result<(), SimFault> {
        let p = &self.player;
        let finite = [
            ("player.x", p.x),
            ("player.z", p.z),
            ("player.height", p.height),
            ("player.speed", p.speed),
            ("score", self.score),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimFault::NonFinite(*name));
        }
        if self.entities.iter().any(|e| !e.pos.is_finite()) {
            return Err(SimFault::NonFinite("entity position"));
        }
        if p.ingredients.len() > INGREDIENT_SLOTS {
            return Err(SimFault::IngredientOverflow(p.ingredients.len()));
        }
        if p.letters.len() > TARGET_WORD.len() {
            return Err(SimFault::LetterOverflow(p.letters.len()));
        }
        if p.height < 0.0 {
            return Err(SimFault::BelowFloor(p.height));
        }
        Ok(())
    }
}
