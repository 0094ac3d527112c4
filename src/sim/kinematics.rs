//! Player kinematics: lanes, jumping, lateral easing and the speed ramp

use super::catalog::PowerUpKind;
use super::difficulty::DifficultySettings;
use super::state::Player;
use crate::consts::*;
use crate::lerp;

/// Speed the player is accelerating toward
pub fn target_speed(player: &Player, settings: &DifficultySettings) -> f32 {
    let mut target = (BASE_SPEED + player.distance().abs() * DISTANCE_SPEED_GAIN)
        * settings.speed_multiplier;
    if player.fury_active() {
        target *= FURY_SPEED_MULTIPLIER;
    }
    if player.has_power_up(PowerUpKind::Turbo) {
        target *= TURBO_SPEED_MULTIPLIER;
    }
    target.min(MAX_SPEED * settings.speed_multiplier)
}

/// Ease speed toward target, advance along the corridor, return distance covered
pub fn advance(player: &mut Player, settings: &DifficultySettings, dt: f32) -> f32 {
    let target = target_speed(player, settings);
    player.speed = lerp(player.speed, target, dt * SPEED_SMOOTHING);
    let step = player.speed * dt;
    player.z -= step;
    step
}

/// Apply a lane-change intent. Returns false when control is locked.
pub fn shift_lane(player: &mut Player, right: bool) -> bool {
    if player.slipping() {
        return false;
    }
    player.lane = if right {
        player.lane.shifted_right()
    } else {
        player.lane.shifted_left()
    };
    true
}

/// Apply a jump intent. Returns true if a jump actually started.
pub fn jump(player: &mut Player) -> bool {
    if player.slipping() || player.airborne {
        return false;
    }
    player.vertical_vel = JUMP_FORCE;
    player.airborne = true;
    true
}

/// Integrate vertical motion under gravity, landing at the floor
pub fn integrate_jump(player: &mut Player, dt: f32) {
    if !player.airborne {
        return;
    }
    player.height += player.vertical_vel * dt;
    player.vertical_vel -= GRAVITY * dt;
    if player.height <= 0.0 {
        player.height = 0.0;
        player.vertical_vel = 0.0;
        player.airborne = false;
    }
}

/// Ease the lateral offset toward the lane (or drift while slipping) and update
/// tilt/spin. `time` is the run clock, which drives the slip wobble.
pub fn update_lateral(player: &mut Player, time: f32, dt: f32) {
    let target_x = player.lane.x();
    if player.slipping() {
        player.x += (time * SLIP_DRIFT_FREQ).sin() * dt * SLIP_DRIFT_RATE;
        player.spin += dt * SLIP_SPIN_RATE;
    } else {
        player.x = lerp(player.x, target_x, dt * LANE_EASE_RATE);
        player.spin = 0.0;
    }
    let tilt = (player.x - target_x) * -0.2;
    player.tilt = lerp(player.tilt, tilt, dt * TILT_EASE_RATE);
}
