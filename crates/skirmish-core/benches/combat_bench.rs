use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use skirmish_core::ai::Controller;
use skirmish_core::character::Team;
use skirmish_core::config::{CharacterProfile, StateConfig};
use skirmish_core::geometry::Radii;
use skirmish_core::scene::Scene;
use skirmish_core::simulation::Simulation;
use std::f32::consts::PI;

fn bench_pick_victim(c: &mut Criterion) {
    // One attacker in the middle of a ring of opponents
    let mut scene = Scene::new();
    let attacker = scene
        .spawn(Team::Player, Vec2::ZERO, CharacterProfile::default(), StateConfig::default())
        .unwrap();
    for i in 0..64 {
        let angle = i as f32 / 64.0 * std::f32::consts::TAU;
        let distance = 20.0 + (i % 8) as f32 * 10.0;
        scene.spawn(
            Team::Enemy,
            Vec2::new(angle.cos(), angle.sin()) * distance,
            CharacterProfile::default(),
            StateConfig::default(),
        ).unwrap();
    }
    if let Some(character) = scene.get_mut(attacker) {
        character.controls.aim = Vec2::new(1.0, 0.0);
    }

    c.bench_function("pick_victim_64", |b| {
        b.iter(|| black_box(scene.pick_victim(attacker, black_box(Radii::new(80.0, 40.0)), PI)))
    });
}

fn bench_skirmish_step(c: &mut Criterion) {
    // A player surrounded by a dozen enemy routines
    let mut sim = Simulation::new(42);
    sim.spawn(
        Team::Player,
        Vec2::ZERO,
        CharacterProfile {
            max_health: f32::MAX,
            ..CharacterProfile::default()
        },
        Controller::idle(),
    ).unwrap();
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        sim.spawn(
            Team::Enemy,
            Vec2::new(angle.cos(), angle.sin()) * 300.0,
            CharacterProfile::default(),
            Controller::enemy(),
        ).unwrap();
    }

    c.bench_function("skirmish_step_13", |b| {
        b.iter(|| {
            sim.step(black_box(1.0 / 60.0));
            sim.take_events();
        })
    });
}

criterion_group!(benches, bench_pick_victim, bench_skirmish_step);
criterion_main!(benches);
