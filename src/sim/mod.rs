//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Stable iteration order (entities kept in spawn/id order)
//! - No rendering, audio or platform dependencies

pub mod catalog;
pub mod collision;
pub mod difficulty;
pub mod kinematics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use catalog::{Behavior, Category, EntityKind, IngredientKind, ObstacleKind, Pattern, PowerUpKind};
pub use collision::{ObstacleOutcome, overlaps};
pub use difficulty::{Difficulty, DifficultySettings};
pub use state::{
    CameraRig, Entity, GameEvent, GameState, Lane, Particle, ParticleColor, Player, RunStatus,
    SimFault,
};
pub use tick::{TickInput, tick};
