//! Difficulty tiers and level scaling

use serde::{Deserialize, Serialize};

/// Difficulty chosen at run start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Parameters derived from (difficulty, level)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Scales both target and maximum speed
    pub speed_multiplier: f32,
    /// Lookahead at which groups spawn; spawn events fire every quarter of it
    pub spawn_distance: f32,
    /// Chance weight for extra clutter alongside obstacle patterns
    pub obstacle_density: f32,
}

impl DifficultySettings {
    pub fn for_level(difficulty: Difficulty, level: u32) -> Self {
        let level = level as f32;
        match difficulty {
            Difficulty::Easy => Self {
                speed_multiplier: 0.8 + level * 0.05,
                spawn_distance: 90.0,
                obstacle_density: 0.2,
            },
            Difficulty::Medium => Self {
                speed_multiplier: 1.0 + level * 0.1,
                spawn_distance: 80.0,
                obstacle_density: 0.4,
            },
            Difficulty::Hard => Self {
                speed_multiplier: 1.3 + level * 0.15,
                spawn_distance: 70.0,
                obstacle_density: 0.6,
            },
        }
    }

    /// Distance the player must cover between spawn events
    pub fn spawn_interval(&self) -> f32 {
        self.spawn_distance / 4.0
    }
}
