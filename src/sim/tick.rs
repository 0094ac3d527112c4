//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::catalog::{Behavior, Category, EntityKind, ObstacleKind, PowerUpKind};
use super::state::{GameEvent, GameState, Lane, ParticleColor, RunStatus};
use super::{collision, kinematics, spawner};
use crate::consts::*;
use crate::lerp;

/// How far ahead the autopilot looks for threats
const AUTOPILOT_LOOKAHEAD: f32 = 12.0;
/// Distance at which the autopilot jumps when it cannot sidestep
const AUTOPILOT_JUMP_DISTANCE: f32 = 2.5;

/// Input intents for a single tick (deterministic, edge-triggered)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub lane_left: bool,
    pub lane_right: bool,
    pub jump: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.status != RunStatus::Playing {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    state.time_ticks += 1;
    state.time += dt;

    // Speed and position first so everything below sees the new position
    let step = kinematics::advance(&mut state.player, &state.settings, dt);
    state.score += step * SCORE_PER_UNIT;

    update_timers(state, dt);

    // Intents, then vertical and lateral motion
    let player = &mut state.player;
    if input.lane_left {
        kinematics::shift_lane(player, false);
    }
    if input.lane_right {
        kinematics::shift_lane(player, true);
    }
    if input.jump && kinematics::jump(player) {
        state.events.push(GameEvent::Jump);
    }
    kinematics::integrate_jump(&mut state.player, dt);
    kinematics::update_lateral(&mut state.player, state.time, dt);

    update_entities(state, dt);
    update_particles(state, dt);
    update_camera(state, dt);

    spawner::despawn(state);
    spawner::update(state);

    collision::resolve(state, dt);
}

/// Count down fury, power-up and slip timers, raising events on expiry
fn update_timers(state: &mut GameState, dt: f32) {
    let player = &mut state.player;

    if player.fury_timer > 0.0 {
        player.fury_timer -= dt;
        if player.fury_timer <= 0.0 {
            player.fury_timer = 0.0;
            state.events.push(GameEvent::FuryEnd);
        }
    }

    if player.power_up_timer > 0.0 {
        player.power_up_timer -= dt;
        if player.power_up_timer <= 0.0 {
            player.power_up_timer = 0.0;
            if let Some(kind) = player.power_up.take() {
                log::debug!("Power-up expired: {}", kind.as_str());
                state.events.push(GameEvent::PowerUpExpired(kind));
            }
        }
    }

    if player.slip_timer > 0.0 {
        player.slip_timer -= dt;
        if player.slip_timer <= 0.0 {
            player.slip_timer = 0.0;
            state.events.push(GameEvent::SlipEnd);
        }
    }
}

/// Per-kind behaviour for entities near the player
fn update_entities(state: &mut GameState, dt: f32) {
    let pz = state.player.z;
    let cycle = (state.time / BURNER_PERIOD).floor() as u64;
    let mut steam_at = Vec::new();

    for entity in state.entities.iter_mut() {
        let in_window =
            entity.pos.z > pz - BEHAVIOR_WINDOW_AHEAD && entity.pos.z < pz + BEHAVIOR_WINDOW_BEHIND;
        if !entity.active || !in_window {
            continue;
        }

        match &mut entity.behavior {
            Behavior::Static => {}
            Behavior::Falling { triggered } => {
                if !*triggered && entity.pos.z > pz - KNIFE_TRIGGER_DISTANCE {
                    *triggered = true;
                }
                if *triggered && entity.pos.y > 0.0 {
                    entity.pos.y = (entity.pos.y - KNIFE_FALL_SPEED * dt).max(0.0);
                }
            }
            Behavior::Flashing { lit, inverted } => {
                *lit = (cycle % 2 == 1) != *inverted;
            }
        }

        let steams = match entity.kind {
            EntityKind::Obstacle(ObstacleKind::Pot) => true,
            // Fixed burners are drawn lit but never steam
            EntityKind::Obstacle(ObstacleKind::Burner) => {
                matches!(entity.behavior, Behavior::Flashing { lit: true, .. })
            }
            _ => false,
        };
        if steams && state.fx_rng.random_bool(STEAM_CHANCE) {
            steam_at.push(Vec3::new(entity.pos.x, 1.0, entity.pos.z));
        }
    }

    for pos in steam_at {
        state.spawn_particles(pos, ParticleColor::Steam, 1);
    }
}

/// Ballistic particle integration with drag; drops expired or grounded ones
fn update_particles(state: &mut GameState, dt: f32) {
    let drift = state.player.speed * dt * 0.1;
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.pos.z += drift;
        // Young steam keeps rising, everything else falls
        let gravity = if particle.life > 1.5 { -2.0 } else { 5.0 };
        particle.vel.y -= gravity * dt;
        particle.vel.x *= 0.98;
        particle.vel.z *= 0.98;
        particle.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0 && p.pos.y >= 0.0);
}

/// Camera-follow parameters (cosmetic)
fn update_camera(state: &mut GameState, dt: f32) {
    let turbo = state.player.has_power_up(PowerUpKind::Turbo);
    let camera = &mut state.camera;

    camera.shake = lerp(camera.shake, 0.0, dt * 5.0);
    if camera.shake < 0.001 {
        camera.shake = 0.0;
    }
    camera.shake_offset = Vec2::new(
        (state.fx_rng.random::<f32>() - 0.5) * camera.shake,
        (state.fx_rng.random::<f32>() - 0.5) * camera.shake,
    );

    camera.distance = if turbo { 9.0 } else { 7.0 };
    camera.height = 3.5 + state.player.height * 0.3;
    let fov_target = if turbo {
        75.0
    } else if state.player.fury_active() {
        70.0
    } else {
        60.0
    };
    camera.fov = lerp(camera.fov, fov_target, dt * 2.0);
}

/// Whether an entity is something the autopilot should steer away from
fn is_threat(kind: EntityKind, behavior: Behavior) -> bool {
    match kind.category() {
        Category::Obstacle => !behavior.is_safe(),
        Category::Hazard => true,
        Category::Pickup | Category::PowerUp | Category::Decor => false,
    }
}

/// Simple AI: sidestep threats in the current lane, jump when boxed in
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let threat_distance = |lane: Lane| {
        state
            .entities
            .iter()
            .filter(|e| e.active && e.lane == lane && is_threat(e.kind, e.behavior))
            .map(|e| player.z - e.pos.z)
            .filter(|d| *d > -HIT_DZ)
            .fold(f32::INFINITY, f32::min)
    };

    let here = threat_distance(player.lane);
    let mut input = TickInput::default();
    if here > AUTOPILOT_LOOKAHEAD {
        return input;
    }

    let left = player.lane.shifted_left();
    let right = player.lane.shifted_right();
    let (best, best_distance) = [left, right]
        .into_iter()
        .filter(|lane| *lane != player.lane)
        .map(|lane| (lane, threat_distance(lane)))
        .fold((player.lane, here), |acc, cand| if cand.1 > acc.1 { cand } else { acc });

    if best != player.lane && best_distance > here {
        input.lane_left = best == left;
        input.lane_right = best == right;
    } else if here < AUTOPILOT_JUMP_DISTANCE {
        input.jump = true;
    }
    input
}
