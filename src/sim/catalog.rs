//! Entity kinds and spawn patterns
//!
//! Every thing that can appear on the corridor is an [`EntityKind`]. Behaviour
//! and collision effects dispatch on the kind with exhaustive matches; there is
//! no per-kind trait object.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::state::{Entity, Lane};
use crate::consts::*;

/// Obstacles end the run on contact unless dodged or absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Knife,
    Pot,
    Burner,
}

impl ObstacleKind {
    /// Low obstacles the player can clear by jumping above [`JUMP_CLEARANCE`]
    pub fn is_jumpable(self) -> bool {
        matches!(self, ObstacleKind::Pot | ObstacleKind::Burner)
    }
}

/// Ingredients feed the fury combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientKind {
    Tomato,
    Cheese,
    Steak,
}

/// Timed abilities, at most one active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Magnet,
    Shield,
    Turbo,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Magnet, PowerUpKind::Shield, PowerUpKind::Turbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Turbo => "turbo",
        }
    }
}

/// Everything that can be spawned on the corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Ingredient(IngredientKind),
    Letter(char),
    PowerUp(PowerUpKind),
    /// Floor hazard that causes a slip
    Oil,
    /// Breakable decoration
    Spoon,
}

/// Coarse grouping used by the collision resolver and the magnet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pickup,
    PowerUp,
    Hazard,
    Decor,
    Obstacle,
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Ingredient(_) | EntityKind::Letter(_) => Category::Pickup,
            EntityKind::PowerUp(_) => Category::PowerUp,
            EntityKind::Oil => Category::Hazard,
            EntityKind::Spoon => Category::Decor,
            EntityKind::Obstacle(_) => Category::Obstacle,
        }
    }

    /// Resting height above the floor when spawned
    pub fn spawn_height(&self) -> f32 {
        match self {
            EntityKind::Obstacle(ObstacleKind::Burner) => 0.1,
            EntityKind::Obstacle(_) => 0.0,
            EntityKind::Ingredient(_) => 0.5,
            EntityKind::Letter(_) => 0.9,
            EntityKind::PowerUp(_) => 0.8,
            EntityKind::Oil => 0.02,
            EntityKind::Spoon => 0.0,
        }
    }
}

/// Per-entity behaviour sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Sits still
    Static,
    /// Starts elevated, drops to the floor once the player is near
    Falling { triggered: bool },
    /// Toggles on/off with the run clock; `inverted` is the random initial phase
    Flashing { lit: bool, inverted: bool },
}

impl Behavior {
    /// Whether a flashing hazard is currently harmless
    pub fn is_safe(&self) -> bool {
        matches!(self, Behavior::Flashing { lit: false, .. })
    }
}

/// A pattern emitted as one spawn group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Five tomatoes in one lane, two units apart
    ItemLine,
    /// Two lanes blocked, bonus ingredient in the third
    Wall,
    /// Elevated knives in each lane with 70% probability each
    FallingKnives,
    /// One flashing burner per lane
    FlashingBurners,
    /// Oil slick in one lane
    OilSlick,
    /// Knife or burner in one lane
    SingleObstacle,
}

impl Pattern {
    /// Map a uniform roll in [0, 1) onto a pattern. Knife volleys and flashing
    /// burners are skipped on easy, in which case the roll falls through.
    pub fn from_roll(roll: f32, difficulty: Difficulty) -> Self {
        let hard_patterns = difficulty != Difficulty::Easy;
        if roll < 0.2 {
            Pattern::ItemLine
        } else if roll < 0.4 {
            Pattern::Wall
        } else if roll < 0.5 && hard_patterns {
            Pattern::FallingKnives
        } else if roll < 0.6 && hard_patterns {
            Pattern::FlashingBurners
        } else if roll < 0.7 {
            Pattern::OilSlick
        } else {
            Pattern::SingleObstacle
        }
    }

    /// Build the entities for this pattern at longitudinal position `z`.
    /// Ids are assigned by the caller.
    pub fn build<R: Rng>(self, z: f32, rng: &mut R) -> Vec<Entity> {
        match self {
            Pattern::ItemLine => {
                let lane = random_lane(rng);
                (0..5)
                    .map(|i| {
                        Entity::in_lane(
                            EntityKind::Ingredient(IngredientKind::Tomato),
                            lane,
                            z - i as f32 * 2.0,
                        )
                    })
                    .collect()
            }
            Pattern::Wall => {
                let free = random_lane(rng);
                Lane::ALL
                    .iter()
                    .map(|&lane| {
                        let kind = if lane == free {
                            let bonus = if rng.random_bool(0.5) {
                                IngredientKind::Cheese
                            } else {
                                IngredientKind::Steak
                            };
                            EntityKind::Ingredient(bonus)
                        } else if rng.random_bool(0.5) {
                            EntityKind::Obstacle(ObstacleKind::Pot)
                        } else {
                            EntityKind::Obstacle(ObstacleKind::Knife)
                        };
                        Entity::in_lane(kind, lane, z)
                    })
                    .collect()
            }
            Pattern::FallingKnives => Lane::ALL
                .iter()
                .filter(|_| rng.random::<f32>() > 0.3)
                .map(|&lane| {
                    let mut knife =
                        Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Knife), lane, z);
                    knife.pos.y = KNIFE_START_HEIGHT;
                    knife.behavior = Behavior::Falling { triggered: false };
                    knife
                })
                .collect(),
            Pattern::FlashingBurners => Lane::ALL
                .iter()
                .map(|&lane| {
                    let inverted = rng.random_bool(0.5);
                    let mut burner =
                        Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Burner), lane, z);
                    burner.behavior = Behavior::Flashing { lit: inverted, inverted };
                    burner
                })
                .collect(),
            Pattern::OilSlick => vec![Entity::in_lane(EntityKind::Oil, random_lane(rng), z)],
            Pattern::SingleObstacle => {
                let lane = random_lane(rng);
                let kind = if rng.random_bool(0.5) {
                    ObstacleKind::Knife
                } else {
                    ObstacleKind::Burner
                };
                vec![Entity::in_lane(EntityKind::Obstacle(kind), lane, z)]
            }
        }
    }
}

/// A single letter pickup
pub fn letter_pickup<R: Rng>(letter: char, z: f32, rng: &mut R) -> Entity {
    Entity::in_lane(EntityKind::Letter(letter), random_lane(rng), z)
}

/// A single random power-up
pub fn power_up_pickup<R: Rng>(z: f32, rng: &mut R) -> Entity {
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    Entity::in_lane(EntityKind::PowerUp(kind), random_lane(rng), z)
}

/// A breakable spoon lying in a random lane
pub fn spoon<R: Rng>(z: f32, rng: &mut R) -> Entity {
    Entity::in_lane(EntityKind::Spoon, random_lane(rng), z)
}

pub fn random_lane<R: Rng>(rng: &mut R) -> Lane {
    Lane::ALL[rng.random_range(0..Lane::ALL.len())]
}

/// Point along the corridor as a vector (x lateral, y height, z longitudinal)
#[inline]
pub fn lane_point(lane: Lane, height: f32, z: f32) -> Vec3 {
    Vec3::new(lane.x(), height, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pattern_roll_bands() {
        assert_eq!(Pattern::from_roll(0.1, Difficulty::Medium), Pattern::ItemLine);
        assert_eq!(Pattern::from_roll(0.3, Difficulty::Medium), Pattern::Wall);
        assert_eq!(Pattern::from_roll(0.45, Difficulty::Medium), Pattern::FallingKnives);
        assert_eq!(Pattern::from_roll(0.55, Difficulty::Hard), Pattern::FlashingBurners);
        assert_eq!(Pattern::from_roll(0.65, Difficulty::Medium), Pattern::OilSlick);
        assert_eq!(Pattern::from_roll(0.95, Difficulty::Medium), Pattern::SingleObstacle);
    }

    #[test]
    fn test_easy_skips_hard_patterns() {
        assert_eq!(Pattern::from_roll(0.45, Difficulty::Easy), Pattern::OilSlick);
        assert_eq!(Pattern::from_roll(0.55, Difficulty::Easy), Pattern::OilSlick);
    }

    #[test]
    fn test_item_line_spacing() {
        let mut rng = Pcg32::seed_from_u64(7);
        let items = Pattern::ItemLine.build(-100.0, &mut rng);
        assert_eq!(items.len(), 5);
        let lane = items[0].lane;
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.lane, lane);
            assert_eq!(item.pos.z, -100.0 - i as f32 * 2.0);
            assert_eq!(item.kind, EntityKind::Ingredient(IngredientKind::Tomato));
        }
    }

    #[test]
    fn test_wall_leaves_one_lane_open() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..20 {
            let wall = Pattern::Wall.build(-50.0, &mut rng);
            assert_eq!(wall.len(), 3);
            let obstacles = wall
                .iter()
                .filter(|e| e.kind.category() == Category::Obstacle)
                .count();
            let pickups = wall
                .iter()
                .filter(|e| e.kind.category() == Category::Pickup)
                .count();
            assert_eq!(obstacles, 2);
            assert_eq!(pickups, 1);
        }
    }

    #[test]
    fn test_falling_knives_start_elevated() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            for knife in Pattern::FallingKnives.build(-50.0, &mut rng) {
                assert_eq!(knife.pos.y, KNIFE_START_HEIGHT);
                assert_eq!(knife.behavior, Behavior::Falling { triggered: false });
            }
        }
    }

    #[test]
    fn test_flashing_burners_one_per_lane() {
        let mut rng = Pcg32::seed_from_u64(5);
        let burners = Pattern::FlashingBurners.build(-50.0, &mut rng);
        assert_eq!(burners.len(), 3);
        for (burner, lane) in burners.iter().zip(Lane::ALL) {
            assert_eq!(burner.lane, lane);
            assert!(matches!(burner.behavior, Behavior::Flashing { .. }));
        }
    }

    #[test]
    fn test_only_pots_and_burners_are_jumpable() {
        assert!(ObstacleKind::Pot.is_jumpable());
        assert!(ObstacleKind::Burner.is_jumpable());
        assert!(!ObstacleKind::Knife.is_jumpable());
    }
}
