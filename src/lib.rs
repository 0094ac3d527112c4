//! Chef Runner - A three-lane kitchen endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, spawning, collisions, game state)
//! - `view`: Read-only per-frame snapshot for renderers
//! - `audio`: Fire-and-forget sound events
//! - `platform`: Input capture and frame clock
//! - `persistence`: User session and score history storage
//! - `game`: Host-side driver tying the above together

pub mod audio;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::{Game, RunConfig};
pub use persistence::{SessionStore, UserSession};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta accepted before clamping (tab backgrounding etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;

    /// Distance between adjacent lane centres
    pub const LANE_SPACING: f32 = 2.2;

    /// Player kinematics
    pub const JUMP_FORCE: f32 = 10.0;
    pub const GRAVITY: f32 = 25.0;
    pub const BASE_SPEED: f32 = 15.0;
    pub const MAX_SPEED: f32 = 40.0;
    /// Extra target speed per unit of distance travelled
    pub const DISTANCE_SPEED_GAIN: f32 = 0.005;
    /// Exponential smoothing rate toward target speed (per second)
    pub const SPEED_SMOOTHING: f32 = 2.0;
    pub const FURY_SPEED_MULTIPLIER: f32 = 1.5;
    pub const TURBO_SPEED_MULTIPLIER: f32 = 1.8;
    /// Lateral easing toward lane centre (per second)
    pub const LANE_EASE_RATE: f32 = 12.0;
    pub const TILT_EASE_RATE: f32 = 10.0;
    /// Slip drift: offset rate and oscillation frequency, spin rate (rad/s)
    pub const SLIP_DRIFT_RATE: f32 = 5.0;
    pub const SLIP_DRIFT_FREQ: f32 = 10.0;
    pub const SLIP_SPIN_RATE: f32 = 10.0;

    /// Timers (seconds)
    pub const FURY_DURATION: f32 = 10.0;
    pub const POWERUP_DURATION: f32 = 8.0;
    pub const SLIP_DURATION: f32 = 2.0;

    /// Scoring
    pub const SCORE_PER_UNIT: f32 = 0.5;
    pub const ITEM_SCORE: f32 = 50.0;
    pub const LEVEL_UP_BONUS: f32 = 1000.0;

    /// Word the player spells out with letter pickups to level up
    pub const TARGET_WORD: &str = "ENIGMA";
    /// Ingredient slots held toward a fury combo
    pub const INGREDIENT_SLOTS: usize = 3;
    /// Distinct kinds required among the held ingredients to trigger fury
    pub const FURY_DISTINCT_KINDS: usize = 2;

    /// Collision box half-extents (longitudinal, lateral, vertical)
    pub const HIT_DZ: f32 = 0.8;
    pub const HIT_DX: f32 = 0.7;
    pub const HIT_DY: f32 = 1.0;
    /// Player height above which pots and burners are cleared
    pub const JUMP_CLEARANCE: f32 = 1.2;

    /// Magnet attraction radius and pull rate (per second)
    pub const MAGNET_RADIUS: f32 = 15.0;
    pub const MAGNET_PULL_RATE: f32 = 5.0;

    /// Entity behaviour window relative to the player (ahead is negative z)
    pub const BEHAVIOR_WINDOW_AHEAD: f32 = 40.0;
    pub const BEHAVIOR_WINDOW_BEHIND: f32 = 10.0;
    /// Entities further than this behind the player are removed
    pub const DESPAWN_DISTANCE: f32 = 10.0;
    /// Spawn cursor starts this far ahead of the origin
    pub const INITIAL_SPAWN_Z: f32 = -10.0;

    /// Falling knives
    pub const KNIFE_START_HEIGHT: f32 = 10.0;
    pub const KNIFE_TRIGGER_DISTANCE: f32 = 30.0;
    pub const KNIFE_FALL_SPEED: f32 = 15.0;

    /// Flashing burner half-cycle (seconds)
    pub const BURNER_PERIOD: f32 = 1.5;
    /// Per-tick chance that a pot or lit burner puffs steam
    pub const STEAM_CHANCE: f64 = 0.1;

    /// Default particle budget
    pub const MAX_PARTICLES: usize = 300;

    /// Floor tile length used by renderers to recycle segments
    pub const TILE_LENGTH: f32 = 100.0;
}

/// Linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamps_factor() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
        assert_eq!(lerp(4.0, 10.0, -1.0), 4.0);
    }
}
