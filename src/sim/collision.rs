//! Collision detection and effect resolution
//!
//! Proximity is a box test around the player, not exact geometry. Effects are
//! dispatched on the entity kind.

use std::collections::HashSet;

use glam::Vec3;

use super::catalog::{Category, EntityKind, IngredientKind, ObstacleKind, PowerUpKind};
use super::state::{Entity, GameEvent, GameState, ParticleColor, RunStatus};
use crate::consts::*;
use crate::lerp;

/// Outcome of an obstacle contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleOutcome {
    /// Jumped over, or a flashing burner in its off phase
    Dodged,
    /// Shield consumed
    Absorbed,
    /// Fury or turbo smashed through
    Smashed,
    /// Run over
    Fatal,
}

/// Box-proximity test between an entity and the player position
#[inline]
pub fn overlaps(entity_pos: Vec3, player_pos: Vec3) -> bool {
    (entity_pos.z - player_pos.z).abs() < HIT_DZ
        && (entity_pos.x - player_pos.x).abs() < HIT_DX
        && (entity_pos.y - player_pos.y).abs() < HIT_DY
}

/// Pull pickups toward the player while the magnet is active
pub fn apply_magnet(state: &mut GameState, dt: f32) {
    if !state.player.has_power_up(PowerUpKind::Magnet) {
        return;
    }
    let (px, pz) = (state.player.x, state.player.z);
    for entity in state.entities.iter_mut() {
        if !entity.active || entity.kind.category() != Category::Pickup {
            continue;
        }
        let dist = ((entity.pos.x - px).powi(2) + (entity.pos.z - pz).powi(2)).sqrt();
        if dist < MAGNET_RADIUS {
            entity.pos.x = lerp(entity.pos.x, px, dt * MAGNET_PULL_RATE);
            entity.pos.z = lerp(entity.pos.z, pz, dt * MAGNET_PULL_RATE);
        }
    }
}

/// Resolve contacts for every active entity against the player's current pose
pub fn resolve(state: &mut GameState, dt: f32) {
    apply_magnet(state, dt);

    let player_pos = Vec3::new(state.player.x, state.player.height, state.player.z);
    for idx in 0..state.entities.len() {
        if state.status != RunStatus::Playing {
            break;
        }
        let entity = &state.entities[idx];
        if !entity.active || !overlaps(entity.pos, player_pos) {
            continue;
        }
        let (kind, pos) = (entity.kind, entity.pos);
        match kind {
            EntityKind::Ingredient(item) => {
                state.entities[idx].active = false;
                collect_ingredient(state, item, pos);
            }
            EntityKind::Letter(letter) => {
                state.entities[idx].active = false;
                collect_letter(state, letter, pos);
            }
            EntityKind::PowerUp(power_up) => {
                state.entities[idx].active = false;
                acquire_power_up(state, power_up);
            }
            EntityKind::Oil => {
                state.entities[idx].active = false;
                state.player.slip_timer = SLIP_DURATION;
                state.events.push(GameEvent::Slip);
            }
            EntityKind::Spoon => {
                state.entities[idx].active = false;
                state.spawn_particles(pos, ParticleColor::Gray, 3);
                state.events.push(GameEvent::Clank);
            }
            EntityKind::Obstacle(obstacle) => {
                let outcome = obstacle_outcome(state, obstacle, &state.entities[idx]);
                apply_obstacle_outcome(state, idx, outcome);
            }
        }
    }
}

/// Push an ingredient onto the bounded combo sequence, triggering fury when the
/// three held items contain at least two distinct kinds
pub fn collect_ingredient(state: &mut GameState, item: IngredientKind, pos: Vec3) {
    state.score += ITEM_SCORE;
    state.spawn_particles(pos, ParticleColor::Gold, 5);
    state.events.push(GameEvent::CollectItem(item));

    let fury_active = state.player.fury_active();
    let held = &mut state.player.ingredients;
    if held.len() == INGREDIENT_SLOTS {
        held.remove(0);
    }
    held.push(item);

    if !fury_active && held.len() == INGREDIENT_SLOTS {
        let distinct = held.iter().collect::<HashSet<_>>().len();
        if distinct >= FURY_DISTINCT_KINDS {
            held.clear();
            state.player.fury_timer = FURY_DURATION;
            state.events.push(GameEvent::FuryStart);
            log::info!("Fury mode! ({:.0}s)", FURY_DURATION);
        }
    }
}

/// Append a letter; completing the word levels up
pub fn collect_letter(state: &mut GameState, letter: char, pos: Vec3) {
    state.spawn_particles(pos, ParticleColor::Purple, 10);
    state.events.push(GameEvent::CollectLetter(letter));

    let letters = &mut state.player.letters;
    if letters.len() < TARGET_WORD.len() {
        letters.push(letter);
    }
    if letters.len() == TARGET_WORD.len() {
        letters.clear();
        let level = state.level + 1;
        state.set_level(level);
        state.score += LEVEL_UP_BONUS;
        state.events.push(GameEvent::LevelUp { level });
        log::info!("Level up! Now level {}", level);
    }
}

/// Replace any active power-up with `kind` and restart its timer
pub fn acquire_power_up(state: &mut GameState, kind: PowerUpKind) {
    state.player.power_up = Some(kind);
    state.player.power_up_timer = POWERUP_DURATION;
    state.events.push(GameEvent::PowerUpAcquired(kind));
    log::debug!("Power-up acquired: {}", kind.as_str());
}

/// Decide what an obstacle contact does, without mutating anything
pub fn obstacle_outcome(state: &GameState, obstacle: ObstacleKind, entity: &Entity) -> ObstacleOutcome {
    let player = &state.player;
    if obstacle == ObstacleKind::Burner && entity.behavior.is_safe() {
        return ObstacleOutcome::Dodged;
    }
    if obstacle.is_jumpable() && player.height > JUMP_CLEARANCE {
        return ObstacleOutcome::Dodged;
    }
    if player.has_power_up(PowerUpKind::Shield) {
        ObstacleOutcome::Absorbed
    } else if player.fury_active() || player.has_power_up(PowerUpKind::Turbo) {
        ObstacleOutcome::Smashed
    } else {
        ObstacleOutcome::Fatal
    }
}

fn apply_obstacle_outcome(state: &mut GameState, idx: usize, outcome: ObstacleOutcome) {
    let pos = state.entities[idx].pos;
    match outcome {
        ObstacleOutcome::Dodged => {}
        ObstacleOutcome::Absorbed => {
            state.entities[idx].active = false;
            state.player.power_up = None;
            state.player.power_up_timer = 0.0;
            state.shake(0.5);
            let burst = Vec3::new(state.player.x, 1.0, state.player.z + 1.0);
            state.spawn_particles(burst, ParticleColor::Blue, 10);
            state.events.push(GameEvent::ShieldBroken);
        }
        ObstacleOutcome::Smashed => {
            state.entities[idx].active = false;
            state.shake(0.3);
            state.spawn_particles(Vec3::new(pos.x, 0.5, pos.z), ParticleColor::Gray, 8);
            state.events.push(GameEvent::Smash);
        }
        ObstacleOutcome::Fatal => {
            state.shake(1.0);
            state.status = RunStatus::GameOver;
            let final_score = state.final_score();
            state.events.push(GameEvent::Crash);
            state.events.push(GameEvent::RunEnded { final_score });
            log::info!(
                "Game over: score={} level={} distance={:.0}",
                final_score,
                state.level,
                state.player.distance()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::Behavior;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::state::Lane;
    use proptest::prelude::*;

    fn playing() -> GameState {
        let mut state = GameState::new(42);
        state.start_run(Difficulty::Medium, 1);
        state.events.clear();
        state
    }

    /// Place an entity right on the player and resolve
    fn hit(state: &mut GameState, kind: EntityKind) -> u32 {
        let mut entity = Entity::in_lane(kind, state.player.lane, state.player.z);
        entity.pos.y = 0.0;
        let id = state.push_entity(entity);
        resolve(state, SIM_DT);
        id
    }

    fn hit_obstacle(state: &mut GameState, kind: ObstacleKind) -> u32 {
        hit(state, EntityKind::Obstacle(kind))
    }

    fn is_active(state: &GameState, id: u32) -> bool {
        state.entities.iter().any(|e| e.id == id && e.active)
    }

    #[test]
    fn test_overlap_box() {
        let p = Vec3::new(0.0, 0.0, -10.0);
        assert!(overlaps(Vec3::new(0.5, 0.5, -10.5), p));
        assert!(!overlaps(Vec3::new(0.8, 0.0, -10.0), p));
        assert!(!overlaps(Vec3::new(0.0, 0.0, -11.0), p));
        assert!(!overlaps(Vec3::new(0.0, 1.5, -10.0), p));
    }

    #[test]
    fn test_item_pickup_scores() {
        let mut state = playing();
        let id = hit(&mut state, EntityKind::Ingredient(IngredientKind::Tomato));
        assert!(!is_active(&state, id));
        assert_eq!(state.score, ITEM_SCORE);
        assert_eq!(state.player.ingredients, vec![IngredientKind::Tomato]);
        assert!(state.events.contains(&GameEvent::CollectItem(IngredientKind::Tomato)));
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_fury_from_two_distinct_kinds() {
        use IngredientKind::*;
        let mut state = playing();
        let z = state.player.z;
        collect_ingredient(&mut state, Tomato, Vec3::new(0.0, 0.5, z));
        collect_ingredient(&mut state, Cheese, Vec3::new(0.0, 0.5, z));
        assert!(!state.player.fury_active());
        collect_ingredient(&mut state, Tomato, Vec3::new(0.0, 0.5, z));
        assert!(state.player.fury_active());
        assert_eq!(state.player.fury_timer, FURY_DURATION);
        assert!(state.player.ingredients.is_empty());
        let starts = state.events.iter().filter(|e| **e == GameEvent::FuryStart).count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_no_fury_from_identical_kinds() {
        let mut state = playing();
        for _ in 0..5 {
            collect_ingredient(&mut state, IngredientKind::Tomato, Vec3::ZERO);
        }
        assert!(!state.player.fury_active());
        assert_eq!(state.player.ingredients.len(), INGREDIENT_SLOTS);
    }

    #[test]
    fn test_no_retrigger_during_fury() {
        use IngredientKind::*;
        let mut state = playing();
        for item in [Tomato, Cheese, Steak] {
            collect_ingredient(&mut state, item, Vec3::ZERO);
        }
        assert!(state.player.fury_active());
        state.player.fury_timer = 3.0;
        for item in [Tomato, Cheese, Steak, Cheese] {
            collect_ingredient(&mut state, item, Vec3::ZERO);
        }
        assert_eq!(state.player.fury_timer, 3.0);
        assert_eq!(state.player.ingredients, vec![Cheese, Steak, Cheese]);
    }

    #[test]
    fn test_word_levels_up_once_after_last_letter() {
        let mut state = playing();
        let word: Vec<char> = TARGET_WORD.chars().collect();
        for (i, letter) in word.iter().enumerate() {
            collect_letter(&mut state, *letter, Vec3::ZERO);
            let level_ups = state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
                .count();
            if i + 1 < word.len() {
                assert_eq!(level_ups, 0);
                assert_eq!(state.player.letters.len(), i + 1);
            } else {
                assert_eq!(level_ups, 1);
            }
        }
        assert!(state.player.letters.is_empty());
        assert_eq!(state.level, 2);
        assert_eq!(state.score, LEVEL_UP_BONUS);
        assert_eq!(state.settings, crate::sim::DifficultySettings::for_level(Difficulty::Medium, 2));
    }

    #[test]
    fn test_power_up_replaces_and_resets_timer() {
        let mut state = playing();
        hit(&mut state, EntityKind::PowerUp(PowerUpKind::Magnet));
        state.player.power_up_timer = 1.0;
        hit(&mut state, EntityKind::PowerUp(PowerUpKind::Shield));
        assert_eq!(state.player.power_up, Some(PowerUpKind::Shield));
        assert_eq!(state.player.power_up_timer, POWERUP_DURATION);
    }

    #[test]
    fn test_oil_causes_slip() {
        let mut state = playing();
        let id = hit(&mut state, EntityKind::Oil);
        assert!(!is_active(&state, id));
        assert_eq!(state.player.slip_timer, SLIP_DURATION);
        assert!(state.events.contains(&GameEvent::Slip));
    }

    #[test]
    fn test_spoon_breaks_without_score() {
        let mut state = playing();
        let id = hit(&mut state, EntityKind::Spoon);
        assert!(!is_active(&state, id));
        assert_eq!(state.score, 0.0);
        assert!(state.events.contains(&GameEvent::Clank));
    }

    #[test]
    fn test_unprotected_hit_ends_run() {
        let mut state = playing();
        state.score = 1234.9;
        hit_obstacle(&mut state, ObstacleKind::Knife);
        assert_eq!(state.status, RunStatus::GameOver);
        assert!(state.events.contains(&GameEvent::RunEnded { final_score: 1234 }));
        assert_eq!(state.camera.shake, 1.0);
    }

    #[test]
    fn test_shield_absorbs_exactly_one_hit() {
        let mut state = playing();
        acquire_power_up(&mut state, PowerUpKind::Shield);
        let first = hit_obstacle(&mut state, ObstacleKind::Pot);
        assert_eq!(state.status, RunStatus::Playing);
        assert!(!is_active(&state, first));
        assert_eq!(state.player.power_up, None);
        assert_eq!(state.player.power_up_timer, 0.0);

        hit_obstacle(&mut state, ObstacleKind::Knife);
        assert_eq!(state.status, RunStatus::GameOver);
    }

    #[test]
    fn test_fury_and_turbo_smash_repeatedly() {
        let mut state = playing();
        state.player.fury_timer = FURY_DURATION;
        for _ in 0..4 {
            let id = hit_obstacle(&mut state, ObstacleKind::Knife);
            assert!(!is_active(&state, id));
        }
        assert_eq!(state.status, RunStatus::Playing);

        let mut state = playing();
        acquire_power_up(&mut state, PowerUpKind::Turbo);
        for _ in 0..4 {
            hit_obstacle(&mut state, ObstacleKind::Burner);
        }
        assert_eq!(state.status, RunStatus::Playing);
        assert_eq!(state.player.power_up, Some(PowerUpKind::Turbo));
    }

    #[test]
    fn test_jump_clears_low_obstacles_only() {
        let state = {
            let mut s = playing();
            s.player.height = JUMP_CLEARANCE + 0.1;
            s
        };
        let pot = Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Pot), Lane::Middle, 0.0);
        let knife = Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Knife), Lane::Middle, 0.0);
        assert_eq!(obstacle_outcome(&state, ObstacleKind::Pot, &pot), ObstacleOutcome::Dodged);
        assert_eq!(obstacle_outcome(&state, ObstacleKind::Knife, &knife), ObstacleOutcome::Fatal);
    }

    #[test]
    fn test_unlit_burner_is_safe() {
        let mut state = playing();
        let mut burner =
            Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Burner), Lane::Middle, state.player.z);
        burner.behavior = Behavior::Flashing { lit: false, inverted: false };
        state.push_entity(burner);
        resolve(&mut state, SIM_DT);
        assert_eq!(state.status, RunStatus::Playing);

        state.entities[0].behavior = Behavior::Flashing { lit: true, inverted: false };
        resolve(&mut state, SIM_DT);
        assert_eq!(state.status, RunStatus::GameOver);
    }

    #[test]
    fn test_magnet_pulls_pickups_only() {
        let mut state = playing();
        state.player.power_up = Some(PowerUpKind::Magnet);
        state.player.power_up_timer = POWERUP_DURATION;
        let z = state.player.z - 10.0;
        state.push_entity(Entity::in_lane(
            EntityKind::Ingredient(IngredientKind::Cheese),
            Lane::Right,
            z,
        ));
        state.push_entity(Entity::in_lane(EntityKind::Obstacle(ObstacleKind::Pot), Lane::Left, z));
        state.push_entity(Entity::in_lane(
            EntityKind::Ingredient(IngredientKind::Steak),
            Lane::Left,
            z - MAGNET_RADIUS - 5.0,
        ));
        apply_magnet(&mut state, SIM_DT);
        assert!(state.entities[0].pos.z > z);
        assert!(state.entities[0].pos.x < Lane::Right.x());
        assert_eq!(state.entities[1].pos.z, z);
        assert_eq!(state.entities[2].pos.z, z - MAGNET_RADIUS - 5.0);
    }

    #[test]
    fn test_magnet_eventually_collects() {
        let mut state = playing();
        state.player.power_up = Some(PowerUpKind::Magnet);
        state.player.power_up_timer = POWERUP_DURATION;
        let id = state.push_entity(Entity::in_lane(
            EntityKind::Letter('E'),
            Lane::Left,
            state.player.z - 8.0,
        ));
        for _ in 0..120 {
            resolve(&mut state, SIM_DT);
        }
        assert!(!is_active(&state, id));
        assert_eq!(state.player.letters, vec!['E']);
    }

    #[test]
    fn test_no_resolution_after_game_over() {
        let mut state = playing();
        hit_obstacle(&mut state, ObstacleKind::Knife);
        let id = hit(&mut state, EntityKind::Ingredient(IngredientKind::Tomato));
        assert!(is_active(&state, id));
    }

    proptest! {
        #[test]
        fn prop_sequences_stay_bounded(picks in proptest::collection::vec(0u8..4, 0..80)) {
            let mut state = playing();
            for pick in picks {
                match pick {
                    0 => collect_ingredient(&mut state, IngredientKind::Tomato, Vec3::ZERO),
                    1 => collect_ingredient(&mut state, IngredientKind::Cheese, Vec3::ZERO),
                    2 => collect_ingredient(&mut state, IngredientKind::Steak, Vec3::ZERO),
                    _ => {
                        if let Some(letter) = state.player.next_letter() {
                            collect_letter(&mut state, letter, Vec3::ZERO);
                        }
                    }
                }
                prop_assert!(state.player.ingredients.len() <= INGREDIENT_SLOTS);
                prop_assert!(state.player.letters.len() < TARGET_WORD.len());
            }
        }
    }
}
