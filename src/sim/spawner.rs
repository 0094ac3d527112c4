//! Procedural spawning ahead of the player and despawning behind

use rand::Rng;

use super::catalog::{self, EntityKind, Pattern};
use super::state::GameState;
use crate::consts::*;

/// Chance of a letter pickup when the word is incomplete
pub const LETTER_CHANCE: f32 = 0.08;
/// Cumulative chance band for a power-up (above the letter band)
pub const POWER_UP_CHANCE: f32 = 0.12;

/// What a spawn event produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnChoice {
    Letter(char),
    PowerUp,
    Pattern(Pattern),
}

/// Whether the player has advanced far enough since the last spawn
pub fn spawn_due(state: &GameState) -> bool {
    state.player.z - state.last_spawn_z < -state.settings.spawn_interval()
}

/// Whether an uncollected letter is still somewhere on the corridor
pub fn letter_in_play(state: &GameState) -> bool {
    state
        .entities
        .iter()
        .any(|e| e.active && matches!(e.kind, EntityKind::Letter(_)))
}

/// Pick what to spawn. First match wins; the roll is fresh per event.
///
/// Only one letter is live at a time so the word is always spelled in order.
pub fn choose<R: Rng>(state: &GameState, rng: &mut R) -> SpawnChoice {
    let roll: f32 = rng.random();
    if roll < LETTER_CHANCE && !letter_in_play(state) {
        if let Some(letter) = state.player.next_letter() {
            return SpawnChoice::Letter(letter);
        }
    }
    if roll < POWER_UP_CHANCE && state.player.power_up.is_none() {
        return SpawnChoice::PowerUp;
    }
    SpawnChoice::Pattern(Pattern::from_roll(rng.random(), state.difficulty))
}

/// Emit one spawn group if due. Returns the number of entities spawned.
pub fn update(state: &mut GameState) -> usize {
    if !spawn_due(state) {
        return 0;
    }
    state.last_spawn_z = state.player.z;
    let spawn_z = state.player.z - state.settings.spawn_distance;

    // Work on a detached RNG so pattern builders can borrow it alongside state
    let mut rng = state.rng.clone();
    let choice = choose(state, &mut rng);
    let group = match choice {
        SpawnChoice::Letter(letter) => vec![catalog::letter_pickup(letter, spawn_z, &mut rng)],
        SpawnChoice::PowerUp => vec![catalog::power_up_pickup(spawn_z, &mut rng)],
        SpawnChoice::Pattern(pattern) => {
            let mut group = pattern.build(spawn_z, &mut rng);
            if rng.random::<f32>() < state.settings.obstacle_density * 0.25 {
                group.push(catalog::spoon(spawn_z + 4.0, &mut rng));
            }
            group
        }
    };
    state.rng = rng;

    log::debug!(
        "Spawn at z={:.1}: {:?} ({} entities)",
        spawn_z,
        choice,
        group.len()
    );
    let count = group.len();
    for entity in group {
        state.push_entity(entity);
    }
    count
}

/// Whether an entity at `entity_z` has fallen past the despawn threshold
#[inline]
pub fn is_behind(entity_z: f32, player_z: f32) -> bool {
    entity_z - player_z > DESPAWN_DISTANCE
}

/// Remove entities left behind the player and drain deactivated ones
pub fn despawn(state: &mut GameState) {
    let player_z = state.player.z;
    state
        .entities
        .retain(|e| e.active && !is_behind(e.pos.z, player_z));
}
