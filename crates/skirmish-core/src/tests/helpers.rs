//! Test helper functions for setting up scenes, simulations and characters.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::{Controller, RoutineContext};
use crate::character::{CharacterId, Controls, Team};
use crate::config::{CharacterProfile, StateConfig};
use crate::scene::Scene;
use crate::simulation::Simulation;

/// One frame at 60 FPS.
pub const DT: f32 = 1.0 / 60.0;

/// Installs a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Scene Setup
// =============================================================================

/// Spawns default characters at the given positions, in order.
///
/// # Returns
///
/// The scene and the spawned ids, in the same order as `characters`.
pub fn scene_with(characters: &[(Team, Vec2)]) -> (Scene, Vec<CharacterId>) {
    let mut scene = Scene::new();
    let ids = characters
        .iter()
        .map(|&(team, position)| {
            scene
                .spawn(team, position, CharacterProfile::default(), StateConfig::default())
                .unwrap()
        })
        .collect();
    (scene, ids)
}

/// Runs `f` with a routine context for `id`, one frame long, backed by a
/// fixed-seed random source.
pub fn routine_context<R>(
    scene: &Scene,
    id: CharacterId,
    controls: &mut Controls,
    f: impl FnOnce(&mut RoutineContext<'_>) -> R,
) -> R {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut ctx = RoutineContext::new(scene, id, controls, DT, &mut rng);
    f(&mut ctx)
}

/// Puts a character into the shielding state and holds it for `held_for`.
///
/// A hold shorter than the perfect-parry window leaves the window open.
pub fn raise_shield(scene: &mut Scene, id: CharacterId, held_for: f32) {
    let character = scene.get_mut(id).expect("character should exist");
    character.controls.shield = true;
    character.cycle_state(0.0);
    if held_for > 0.0 {
        character.cycle_state(held_for);
    }
    assert!(character.state().shielded(), "character should be shielding");
}

// =============================================================================
// Simulation Setup
// =============================================================================

/// Profile with a custom health pool.
pub fn profile_with_health(max_health: f32) -> CharacterProfile {
    CharacterProfile {
        max_health,
        ..CharacterProfile::default()
    }
}

/// Spawns a player driven by scripted controls (an idle controller).
pub fn spawn_player(sim: &mut Simulation, position: Vec2, profile: CharacterProfile) -> CharacterId {
    sim.spawn(Team::Player, position, profile, Controller::idle()).unwrap()
}

/// Overwrites a character's controls.
pub fn set_controls(sim: &mut Simulation, id: CharacterId, controls: Controls) {
    sim.scene_mut()
        .get_mut(id)
        .expect("character should exist")
        .controls = controls;
}

/// Position of a live character.
pub fn position_of(sim: &Simulation, id: CharacterId) -> Vec2 {
    sim.scene().get(id).expect("character should exist").position
}
