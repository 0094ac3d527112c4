//! Read-only frame snapshot for renderers and HUDs
//!
//! Built once per rendered frame from the simulation state. Nothing here can
//! mutate the simulation.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::consts::{JUMP_FORCE, TARGET_WORD, TILE_LENGTH};
use crate::settings::Settings;
use crate::sim::{
    Behavior, Difficulty, EntityKind, GameState, IngredientKind, ParticleColor, PowerUpKind,
    RunStatus,
};

/// Running cycles per unit of distance (one stride every two units)
const STRIDE_PER_UNIT: f32 = 0.5;

/// Body animation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "phase")]
pub enum PlayerAnim {
    /// Stride phase in [0, 1)
    Running(f32),
    /// 0 at take-off, 0.5 at apex, 1 on landing
    Jumping(f32),
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPose {
    /// Lateral offset (lane-interpolated)
    pub x: f32,
    pub z: f32,
    pub height: f32,
    pub tilt: f32,
    pub spin: f32,
    pub anim: PlayerAnim,
    pub fury: bool,
    pub shield: bool,
    pub magnet: bool,
    pub turbo: bool,
    pub slipping: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec3,
    pub life: f32,
    pub color: ParticleColor,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraView {
    pub fov: f32,
    pub distance: f32,
    pub height: f32,
    pub shake_offset: Vec2,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub remaining: f32,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub status: RunStatus,
    pub difficulty: Difficulty,
    pub level: u32,
    /// Floored score
    pub score: u64,
    pub distance: f32,
    pub speed: f32,
    /// Index of the floor segment under the player (segments recycle every tile)
    pub floor_tile: i64,
    pub target_word: &'static str,
    pub letters: String,
    pub ingredients: Vec<IngredientKind>,
    pub fury_remaining: f32,
    pub power_up: Option<PowerUpView>,
    pub player: PlayerPose,
    pub entities: Vec<EntityView>,
    pub particles: Vec<ParticleView>,
    pub camera: CameraView,
    /// Fraction of a sim step not yet simulated, for render interpolation
    pub alpha: f32,
}

impl FrameView {
    pub fn capture(state: &GameState, settings: &Settings) -> Self {
        let p = &state.player;

        let anim = if p.airborne {
            let phase = (JUMP_FORCE - p.vertical_vel) / (2.0 * JUMP_FORCE);
            PlayerAnim::Jumping(phase.clamp(0.0, 1.0))
        } else {
            PlayerAnim::Running((p.distance().max(0.0) * STRIDE_PER_UNIT).fract())
        };

        let player = PlayerPose {
            x: p.x,
            z: p.z,
            height: p.height,
            tilt: p.tilt,
            spin: p.spin,
            anim,
            fury: p.fury_active(),
            shield: p.has_power_up(PowerUpKind::Shield),
            magnet: p.has_power_up(PowerUpKind::Magnet),
            turbo: p.has_power_up(PowerUpKind::Turbo),
            slipping: p.slipping(),
        };

        let entities = state
            .entities
            .iter()
            .filter(|e| e.active)
            .map(|e| EntityView {
                id: e.id,
                kind: e.kind,
                pos: e.pos,
                behavior: e.behavior,
            })
            .collect();

        let particles = if settings.particles {
            state
                .particles
                .iter()
                .map(|pt| ParticleView {
                    pos: pt.pos,
                    life: pt.life,
                    color: pt.color,
                })
                .collect()
        } else {
            Vec::new()
        };

        let cam = &state.camera;
        let camera = CameraView {
            fov: cam.fov,
            distance: cam.distance,
            height: cam.height,
            shake_offset: if settings.effective_screen_shake() {
                cam.shake_offset
            } else {
                Vec2::ZERO
            },
        };

        Self {
            status: state.status,
            difficulty: state.difficulty,
            level: state.level,
            score: state.final_score(),
            distance: p.distance(),
            speed: p.speed,
            floor_tile: (p.distance() / TILE_LENGTH).floor() as i64,
            target_word: TARGET_WORD,
            letters: p.letters.iter().collect(),
            ingredients: p.ingredients.clone(),
            fury_remaining: p.fury_timer.max(0.0),
            power_up: p.power_up.map(|kind| PowerUpView {
                kind,
                remaining: p.power_up_timer.max(0.0),
            }),
            player,
            entities,
            particles,
            camera,
            alpha: 0.0,
        }
    }
}
