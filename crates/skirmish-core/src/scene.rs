//! The scene: every live character plus the transient world around them.
//!
//! The scene provides:
//! - Character storage with deterministic iteration order (`BTreeMap`)
//! - Category enumeration used for targeting and collisions
//! - Effect spawning, interpolators and delays
//! - Damage and death: labels, body halves, smoke and queued removal
//! - Camera zoom and time dilation
//!
//! # Determinism
//!
//! Characters are keyed by [`CharacterId`] in a `BTreeMap` and ids are assigned
//! monotonically, so every category enumerates in spawn order. Victim
//! tie-breaks and last-write-wins collision order follow from that.
//!
//! # Removal
//!
//! [`Scene::remove`] only marks a character and queues it. Marked characters
//! are invisible to [`Scene::get`] and every enumeration straight away, and
//! are dropped (with their controller) by [`Scene::flush_removals`] at the
//! end of the tick.
//!
//! # Example
//!
//! ```
//! use skirmish_core::character::{Category, Team};
//! use skirmish_core::config::{CharacterProfile, StateConfig};
//! use skirmish_core::scene::Scene;
//! use glam::Vec2;
//!
//! let mut scene = Scene::new();
//! let hero = scene
//!     .spawn(Team::Player, Vec2::ZERO, CharacterProfile::default(), StateConfig::default())
//!     .unwrap();
//! let foe = scene
//!     .spawn(Team::Enemy, Vec2::new(50.0, 0.0), CharacterProfile::default(), StateConfig::default())
//!     .unwrap();
//!
//! let enemies: Vec<_> = scene.category(Category::Team(Team::Enemy)).map(|c| c.id()).collect();
//! assert_eq!(enemies, vec![foe]);
//!
//! scene.remove(foe);
//! assert!(scene.get(foe).is_none());
//! assert_eq!(scene.flush_removals(), 1);
//! assert_eq!(scene.character_ids(), vec![hero]);
//! ```

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_4, PI, TAU};
use tracing::{debug, trace};

use crate::ai::{Completion, SignalState};
use crate::character::{Category, Character, CharacterId, Team};
use crate::config::{CharacterProfile, CombatConfig, ConfigError, SlowMotionConfig, StateConfig};
use crate::effects::{
    between, Axis, CorpseHalf, Delay, Easing, Effect, EffectId, EffectKind, InterpolationTarget,
    Interpolator, SlowMotion, SlowMotionPhase, CHEST_HEIGHT, CORPSE_DURATION, LABEL_DURATION,
};
use crate::geometry::{direction, pick_best, Radii};
use crate::resolver::{CombatEvent, EventLog};

/// Height above a character's feet at which labels appear.
const LABEL_HEIGHT: f32 = 90.0;

/// How long slain body halves take to settle.
const CORPSE_SETTLE: f32 = 1.0;

/// The scene camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Zoom factor, 1 at rest.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Container for characters, effects and scene-wide time.
#[derive(Debug)]
pub struct Scene {
    /// Monotonically increasing character id counter.
    next_character_id: u64,
    /// Character storage with deterministic iteration order.
    characters: BTreeMap<CharacterId, Character>,
    next_effect_id: u64,
    effects: BTreeMap<EffectId, Effect>,
    interpolators: Vec<Interpolator>,
    delays: Vec<Delay>,
    slow_motions: Vec<SlowMotion>,
    /// Characters marked for removal, dropped at the end of the tick.
    pending_removals: Vec<CharacterId>,
    events: EventLog,
    camera: Camera,
    speed_ratio: f32,
    age: f32,
}

impl Scene {
    /// Creates an empty scene running at normal speed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_character_id: 0,
            characters: BTreeMap::new(),
            next_effect_id: 0,
            effects: BTreeMap::new(),
            interpolators: Vec::new(),
            delays: Vec::new(),
            slow_motions: Vec::new(),
            pending_removals: Vec::new(),
            events: EventLog::new(),
            camera: Camera::default(),
            speed_ratio: 1.0,
            age: 0.0,
        }
    }

    // -------------------------------------------------------------------------
    // Characters
    // -------------------------------------------------------------------------

    /// Spawns a character and returns its id. The character has no
    /// controller until one is installed.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of `profile` or `state_config`.
    pub fn spawn(
        &mut self,
        team: Team,
        position: Vec2,
        profile: CharacterProfile,
        state_config: StateConfig,
    ) -> Result<CharacterId, ConfigError> {
        profile.validate()?;
        state_config.validate()?;

        let id = CharacterId::new(self.next_character_id);
        self.next_character_id += 1;

        let character = Character::new(id, team, position, profile, state_config);
        self.characters.insert(id, character);
        debug!(%id, %team, x = position.x, y = position.y, "character spawned");
        Ok(id)
    }

    /// Live character by id.
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id).filter(|c| !c.is_removed())
    }

    /// Live character by id, mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id).filter(|c| !c.is_removed())
    }

    /// Ids of live characters in id order.
    #[must_use]
    pub fn character_ids(&self) -> Vec<CharacterId> {
        self.characters().map(Character::id).collect()
    }

    /// Live characters in id order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> + '_ {
        self.characters.values().filter(|c| !c.is_removed())
    }

    /// Live members of a category in id order.
    pub fn category(&self, category: Category) -> impl Iterator<Item = &Character> + '_ {
        self.characters()
            .filter(move |c| category.contains(c.team()))
    }

    /// Number of live characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters().count()
    }

    /// Returns `true` if no live character remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.character_count() == 0
    }

    /// Closest live member of `category` to `from`. Ties keep the lowest id.
    #[must_use]
    pub fn nearest(&self, from: Vec2, category: Category) -> Option<&Character> {
        let mut best: Option<(&Character, f32)> = None;
        for candidate in self.category(category) {
            let distance = from.distance_squared(candidate.position);
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(character, _)| character)
    }

    /// Picks the opponent of `attacker` with the highest positive
    /// strikability. Ties keep the first in id order.
    #[must_use]
    pub fn pick_victim(&self, attacker: CharacterId, radii: Radii, fov: f32) -> Option<CharacterId> {
        let attacker = self.get(attacker)?;
        pick_best(
            self.category(attacker.target_team().into())
                .map(|victim| (victim.id(), attacker.strikability(victim, radii, fov))),
        )
    }

    /// Ages the scene and every live character.
    pub fn advance_age(&mut self, elapsed: f32) {
        self.age += elapsed;
        for character in self.characters.values_mut().filter(|c| !c.is_removed()) {
            character.advance_age(elapsed);
        }
    }

    /// Marks a character for removal at the end of the tick.
    pub fn remove(&mut self, id: CharacterId) {
        if let Some(character) = self.get_mut(id) {
            character.mark_removed();
            self.pending_removals.push(id);
            debug!(%id, "character removal queued");
        }
    }

    /// Drops every character marked for removal and returns how many.
    pub fn flush_removals(&mut self) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.pending_removals) {
            if self.characters.remove(&id).is_some() {
                removed += 1;
                debug!(%id, "character removed");
            }
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------------

    /// Spawns an effect. `None` lives until removed.
    pub fn add_effect(&mut self, kind: EffectKind, position: Vec2, duration: Option<f32>) -> EffectId {
        let id = EffectId::new(self.next_effect_id);
        self.next_effect_id += 1;
        self.effects.insert(id, Effect::new(kind, position, duration));
        id
    }

    /// Effect by id.
    #[must_use]
    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.get(&id)
    }

    /// Live effects in spawn order.
    pub fn effects(&self) -> impl Iterator<Item = (EffectId, &Effect)> + '_ {
        self.effects.iter().map(|(id, effect)| (*id, effect))
    }

    /// Number of live effects.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Removes an effect.
    pub fn remove_effect(&mut self, id: EffectId) -> Option<Effect> {
        self.effects.remove(&id)
    }

    /// Shows a floating label above a character, replacing its previous one.
    pub fn display_label(&mut self, id: CharacterId, text: &str) -> Option<EffectId> {
        let character = self.get(id)?;
        let position = character.position - Vec2::new(0.0, LABEL_HEIGHT);
        if let Some(previous) = character.last_label() {
            self.effects.remove(&previous);
        }

        let label = self.add_effect(
            EffectKind::Label {
                text: text.to_string(),
            },
            position,
            Some(LABEL_DURATION),
        );
        if let Some(character) = self.get_mut(id) {
            character.set_last_label(label);
        }
        Some(label)
    }

    /// Current floating label of a character.
    #[must_use]
    pub fn label_of(&self, id: CharacterId) -> Option<&str> {
        let label = self.get(id)?.last_label()?;
        match self.effects.get(&label)?.kind() {
            EffectKind::Label { text } => Some(text.as_str()),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Damage and death
    // -------------------------------------------------------------------------

    /// Damages a character, shows the amount as a label and slays the
    /// character if its health runs out.
    ///
    /// Returns the damage actually applied (after the damage-taken ratio) and
    /// whether the blow was fatal, or `None` if the character is gone.
    pub fn damage(
        &mut self,
        id: CharacterId,
        amount: f32,
        config: &CombatConfig,
        rng: &mut dyn RngCore,
    ) -> Option<(f32, bool)> {
        let character = self.get_mut(id)?;
        let applied = character.damage(amount, config);
        let fatal = character.ledger().is_dead();

        self.display_label(id, &format!("-{applied}"));
        if fatal {
            self.slay(id, config, rng);
        }
        Some((applied, fatal))
    }

    /// Slays every live character with no health left and returns how many.
    pub fn slay_fallen(&mut self, config: &CombatConfig, rng: &mut dyn RngCore) -> usize {
        let fallen: Vec<_> = self
            .characters()
            .filter(|c| c.ledger().is_dead())
            .map(Character::id)
            .collect();
        for &id in &fallen {
            self.slay(id, config, rng);
        }
        fallen.len()
    }

    /// Body halves fly off, a puff of smoke, a label, then removal at the
    /// end of the tick.
    fn slay(&mut self, id: CharacterId, config: &CombatConfig, rng: &mut dyn RngCore) {
        let Some(victim) = self.get_mut(id) else {
            return;
        };
        victim.kill();
        let position = victim.position;
        let facing = victim.controls.aim_angle(position);

        for half in [CorpseHalf::Upper, CorpseHalf::Lower] {
            let piece = self.add_effect(EffectKind::Corpse { half }, position, Some(CORPSE_DURATION));
            let angle = facing + PI + between(rng, -1.0, 1.0) * FRAC_PI_4;
            let landing = position + direction(angle) * between(rng, 30.0, 60.0);
            let spin = if rng.gen::<bool>() { 1.0 } else { -1.0 } * between(rng, FRAC_PI_4, PI);

            self.add_interpolator(
                InterpolationTarget::EffectPosition { id: piece, axis: Axis::X },
                landing.x,
                CORPSE_SETTLE,
                Easing::EaseOutQuint,
            );
            self.add_interpolator(
                InterpolationTarget::EffectPosition { id: piece, axis: Axis::Y },
                landing.y,
                CORPSE_SETTLE,
                Easing::EaseOutQuint,
            );
            self.add_interpolator(
                InterpolationTarget::EffectRotation(piece),
                spin,
                CORPSE_SETTLE,
                Easing::EaseOutQuint,
            );
        }

        self.poof(position, config.poof_particles, rng);
        self.display_label(id, "Slain!");
        self.remove(id);
        debug!(%id, "slain");
    }

    fn poof(&mut self, at: Vec2, particles: u32, rng: &mut dyn RngCore) {
        for _ in 0..particles {
            let angle = rng.gen::<f32>() * TAU;
            let spread = rng.gen::<f32>() * 40.0;
            let from = at + Vec2::new(0.0, -CHEST_HEIGHT) + direction(angle) * spread;
            let to = from + Vec2::new(between(rng, -20.0, 20.0), between(rng, -20.0, 20.0));
            let duration = between(rng, 0.5, 1.0);
            self.add_effect(
                EffectKind::Particle {
                    color: "#fff",
                    size: (10.0, 20.0),
                    to,
                },
                from,
                Some(duration),
            );
        }
    }

    // -------------------------------------------------------------------------
    // Interpolation and time
    // -------------------------------------------------------------------------

    /// Animates `target` from its current value to `to`.
    ///
    /// Returns an abandoned completion if the target does not exist.
    pub fn add_interpolator(
        &mut self,
        target: InterpolationTarget,
        to: f32,
        duration: f32,
        easing: Easing,
    ) -> Completion {
        let Some(from) = self.current_value(target) else {
            return Completion::abandoned();
        };
        let (interpolator, completion) = Interpolator::new(target, from, to, duration, easing);
        self.interpolators.push(interpolator);
        completion
    }

    /// Moves a character `distance` along `angle` over `duration` and returns
    /// the destination.
    pub fn dash(&mut self, id: CharacterId, angle: f32, distance: f32, duration: f32) -> Option<Vec2> {
        let destination = self.get(id)?.position + direction(angle) * distance;
        self.add_interpolator(
            InterpolationTarget::CharacterPosition { id, axis: Axis::X },
            destination.x,
            duration,
            Easing::Linear,
        );
        self.add_interpolator(
            InterpolationTarget::CharacterPosition { id, axis: Axis::Y },
            destination.y,
            duration,
            Easing::Linear,
        );
        trace!(%id, angle, distance, duration, "dash");
        Some(destination)
    }

    /// Completion that resolves after `duration` of scaled scene time.
    pub fn delay(&mut self, duration: f32) -> Completion {
        let (delay, completion) = Delay::new(duration);
        self.delays.push(delay);
        completion
    }

    /// Slows the scene down and zooms the camera in, then back out.
    pub fn start_slow_motion(&mut self, config: SlowMotionConfig) {
        self.speed_ratio = config.speed_ratio;
        let zoom_in = self.add_interpolator(
            InterpolationTarget::CameraZoom,
            config.zoom,
            config.zoom_duration,
            Easing::Linear,
        );
        self.slow_motions.push(SlowMotion::new(config, zoom_in));
        debug!(speed_ratio = config.speed_ratio, "slow motion started");
    }

    /// Returns `true` while a slow-motion sequence runs.
    #[must_use]
    pub fn in_slow_motion(&self) -> bool {
        !self.slow_motions.is_empty()
    }

    /// Number of running interpolators.
    #[must_use]
    pub fn interpolator_count(&self) -> usize {
        self.interpolators.len()
    }

    /// Multiplier applied to elapsed time each tick.
    #[must_use]
    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    /// Overrides the time multiplier.
    pub fn set_speed_ratio(&mut self, speed_ratio: f32) {
        self.speed_ratio = speed_ratio;
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Scaled time since the scene was created.
    #[must_use]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Advances interpolators, delays, slow-motion sequences and effects.
    pub fn update(&mut self, elapsed: f32) {
        for mut interpolator in std::mem::take(&mut self.interpolators) {
            let value = interpolator.advance(elapsed);
            if !self.apply(interpolator.target(), value) {
                trace!(target = ?interpolator.target(), "interpolator target gone");
                continue;
            }
            if interpolator.is_finished() {
                interpolator.finish();
            } else {
                self.interpolators.push(interpolator);
            }
        }

        self.delays.retain_mut(|delay| !delay.advance(elapsed));

        let mut sequences = std::mem::take(&mut self.slow_motions);
        for sequence in &mut sequences {
            self.advance_slow_motion(sequence);
        }
        sequences.retain(|sequence| !sequence.is_done());
        self.slow_motions = sequences;

        for effect in self.effects.values_mut() {
            effect.advance(elapsed);
        }
        self.effects.retain(|_, effect| !effect.is_expired());
    }

    fn advance_slow_motion(&mut self, sequence: &mut SlowMotion) {
        let Some(waiting) = sequence.waiting_on() else {
            return;
        };
        match waiting.state() {
            SignalState::Pending => return,
            SignalState::Abandoned => {
                self.speed_ratio = 1.0;
                sequence.set_phase(SlowMotionPhase::Done);
                return;
            }
            SignalState::Resolved => {}
        }

        let config = *sequence.config();
        let next = match sequence.phase() {
            SlowMotionPhase::ZoomIn(_) => SlowMotionPhase::Hold(self.delay(config.hold * self.speed_ratio)),
            SlowMotionPhase::Hold(_) => SlowMotionPhase::ZoomOut(self.add_interpolator(
                InterpolationTarget::CameraZoom,
                1.0,
                config.zoom_duration,
                Easing::Linear,
            )),
            SlowMotionPhase::ZoomOut(_) => {
                self.speed_ratio = 1.0;
                debug!("slow motion finished");
                SlowMotionPhase::Done
            }
            SlowMotionPhase::Done => return,
        };
        sequence.set_phase(next);
    }

    fn current_value(&self, target: InterpolationTarget) -> Option<f32> {
        match target {
            InterpolationTarget::CharacterPosition { id, axis } => {
                let position = self.get(id)?.position;
                Some(match axis {
                    Axis::X => position.x,
                    Axis::Y => position.y,
                })
            }
            InterpolationTarget::EffectPosition { id, axis } => {
                let position = self.effects.get(&id)?.position;
                Some(match axis {
                    Axis::X => position.x,
                    Axis::Y => position.y,
                })
            }
            InterpolationTarget::EffectRotation(id) => Some(self.effects.get(&id)?.rotation),
            InterpolationTarget::CameraZoom => Some(self.camera.zoom),
        }
    }

    fn apply(&mut self, target: InterpolationTarget, value: f32) -> bool {
        match target {
            InterpolationTarget::CharacterPosition { id, axis } => {
                let Some(character) = self.get_mut(id) else {
                    return false;
                };
                match axis {
                    Axis::X => character.position.x = value,
                    Axis::Y => character.position.y = value,
                }
            }
            InterpolationTarget::EffectPosition { id, axis } => {
                let Some(effect) = self.effects.get_mut(&id) else {
                    return false;
                };
                match axis {
                    Axis::X => effect.position.x = value,
                    Axis::Y => effect.position.y = value,
                }
            }
            InterpolationTarget::EffectRotation(id) => {
                let Some(effect) = self.effects.get_mut(&id) else {
                    return false;
                };
                effect.rotation = value;
            }
            InterpolationTarget::CameraZoom => self.camera.zoom = value,
        }
        true
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Records a combat resolution.
    pub fn record_event(&mut self, event: CombatEvent) {
        self.events.record(event);
    }

    /// The combat event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drains the combat event log.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        self.events.take_events()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::scene_with;
    use std::f32::consts::PI;

    mod storage_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic_and_ordered() {
            let (scene, ids) = scene_with(&[
                (Team::Player, Vec2::ZERO),
                (Team::Enemy, Vec2::ZERO),
                (Team::Enemy, Vec2::ZERO),
            ]);
            assert_eq!(ids, vec![CharacterId::new(0), CharacterId::new(1), CharacterId::new(2)]);
            assert_eq!(scene.character_ids(), ids);
        }

        #[test]
        fn categories_filter_by_team() {
            let (scene, ids) = scene_with(&[
                (Team::Player, Vec2::ZERO),
                (Team::Enemy, Vec2::ZERO),
                (Team::Enemy, Vec2::ZERO),
            ]);
            let enemies: Vec<_> = scene.category(Team::Enemy.into()).map(Character::id).collect();
            assert_eq!(enemies, vec![ids[1], ids[2]]);
            assert_eq!(scene.category(Category::Character).count(), 3);
        }

        #[test]
        fn spawn_rejects_invalid_profile() {
            let mut scene = Scene::new();
            let hollow = CharacterProfile {
                max_health: 0.0,
                ..CharacterProfile::default()
            };
            let result = scene.spawn(Team::Enemy, Vec2::ZERO, hollow, StateConfig::default());
            assert!(matches!(
                result,
                Err(ConfigError::NotPositive { field: "max_health", .. })
            ));
            assert!(scene.is_empty());

            let id = scene
                .spawn(Team::Enemy, Vec2::ZERO, CharacterProfile::default(), StateConfig::default())
                .unwrap();
            assert_eq!(id, CharacterId::new(0));
        }

        #[test]
        fn removed_characters_vanish_immediately() {
            let (mut scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO), (Team::Enemy, Vec2::ZERO)]);
            scene.remove(ids[1]);
            scene.remove(ids[1]);
            assert!(scene.get(ids[1]).is_none());
            assert_eq!(scene.character_count(), 1);
            assert_eq!(scene.flush_removals(), 1);
            assert_eq!(scene.flush_removals(), 0);
        }

        #[test]
        fn nearest_prefers_lowest_id_on_ties() {
            let (scene, ids) = scene_with(&[
                (Team::Enemy, Vec2::new(10.0, 0.0)),
                (Team::Enemy, Vec2::new(-10.0, 0.0)),
                (Team::Enemy, Vec2::new(30.0, 0.0)),
            ]);
            let nearest = scene.nearest(Vec2::ZERO, Team::Enemy.into()).map(Character::id);
            assert_eq!(nearest, Some(ids[0]));
            assert!(scene.nearest(Vec2::ZERO, Team::Player.into()).is_none());
        }
    }

    mod victim_tests {
        use super::*;

        fn aim(scene: &mut Scene, id: CharacterId, at: Vec2) {
            scene.get_mut(id).unwrap().controls.aim = at;
        }

        #[test]
        fn picks_the_best_scoring_opponent() {
            let (mut scene, ids) = scene_with(&[
                (Team::Player, Vec2::ZERO),
                (Team::Enemy, Vec2::new(60.0, 0.0)),
                (Team::Enemy, Vec2::new(20.0, 0.0)),
                (Team::Player, Vec2::new(5.0, 0.0)),
            ]);
            aim(&mut scene, ids[0], Vec2::new(1.0, 0.0));
            let radii = Radii::new(80.0, 40.0);
            assert_eq!(scene.pick_victim(ids[0], radii, PI), Some(ids[2]));
        }

        #[test]
        fn equal_scores_keep_the_first() {
            let (mut scene, ids) = scene_with(&[
                (Team::Player, Vec2::ZERO),
                (Team::Enemy, Vec2::new(30.0, 10.0)),
                (Team::Enemy, Vec2::new(30.0, -10.0)),
            ]);
            aim(&mut scene, ids[0], Vec2::new(1.0, 0.0));
            assert_eq!(scene.pick_victim(ids[0], Radii::new(80.0, 40.0), PI), Some(ids[1]));
        }

        #[test]
        fn nobody_in_reach_is_a_whiff() {
            let (mut scene, ids) = scene_with(&[
                (Team::Player, Vec2::ZERO),
                (Team::Enemy, Vec2::new(300.0, 0.0)),
            ]);
            aim(&mut scene, ids[0], Vec2::new(1.0, 0.0));
            assert_eq!(scene.pick_victim(ids[0], Radii::new(80.0, 40.0), PI), None);
            assert_eq!(scene.pick_victim(ids[0], Radii::ZERO, PI), None);
        }
    }

    mod interpolation_tests {
        use super::*;

        #[test]
        fn dash_moves_over_duration() {
            let (mut scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO)]);
            let target = scene.dash(ids[0], 0.0, 100.0, 0.2).unwrap();
            assert!((target - Vec2::new(100.0, 0.0)).length() < 1e-4);

            scene.update(0.1);
            assert!((scene.get(ids[0]).unwrap().position.x - 50.0).abs() < 1e-3);
            scene.update(0.1);
            scene.update(0.1);
            assert!((scene.get(ids[0]).unwrap().position.x - 100.0).abs() < 1e-3);
            assert_eq!(scene.interpolator_count(), 0);
        }

        #[test]
        fn interpolating_a_removed_character_abandons() {
            let (mut scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO)]);
            let completion = scene.add_interpolator(
                InterpolationTarget::CharacterPosition { id: ids[0], axis: Axis::X },
                10.0,
                1.0,
                Easing::Linear,
            );
            scene.remove(ids[0]);
            scene.update(0.1);
            assert!(completion.is_abandoned());
            assert_eq!(scene.interpolator_count(), 0);
        }

        #[test]
        fn unknown_target_is_abandoned_at_once() {
            let mut scene = Scene::new();
            let completion = scene.add_interpolator(
                InterpolationTarget::EffectRotation(EffectId::new(42)),
                1.0,
                1.0,
                Easing::Linear,
            );
            assert!(completion.is_abandoned());
        }

        #[test]
        fn delay_resolves_in_scaled_time() {
            let mut scene = Scene::new();
            let completion = scene.delay(0.5);
            scene.update(0.3);
            assert!(completion.is_pending());
            scene.update(0.3);
            assert!(completion.is_resolved());
        }

        #[test]
        fn slow_motion_runs_its_course() {
            let mut scene = Scene::new();
            let config = SlowMotionConfig::default();
            scene.start_slow_motion(config);
            assert_eq!(scene.speed_ratio(), 0.1);

            scene.update(0.1);
            assert!((scene.camera().zoom - 1.5).abs() < 1e-4);
            scene.update(0.1);
            assert!((scene.camera().zoom - 2.0).abs() < 1e-4);
            assert!(scene.in_slow_motion());

            // Hold lasts 5 × 0.1 of scaled time.
            for _ in 0..6 {
                scene.update(0.1);
            }
            for _ in 0..3 {
                scene.update(0.1);
            }
            assert!((scene.camera().zoom - 1.0).abs() < 1e-4);
            assert_eq!(scene.speed_ratio(), 1.0);
            assert!(!scene.in_slow_motion());
        }
    }

    mod effect_tests {
        use super::*;

        #[test]
        fn labels_replace_each_other() {
            let (mut scene, ids) = scene_with(&[(Team::Enemy, Vec2::new(0.0, 100.0))]);
            let first = scene.display_label(ids[0], "-50").unwrap();
            let second = scene.display_label(ids[0], "Blocked!").unwrap();
            assert!(scene.effect(first).is_none());
            assert_eq!(scene.label_of(ids[0]), Some("Blocked!"));
            assert_eq!(scene.effect(second).unwrap().position, Vec2::new(0.0, 10.0));
            assert_eq!(scene.effect_count(), 1);
        }

        #[test]
        fn effects_expire() {
            let mut scene = Scene::new();
            scene.add_effect(EffectKind::ShieldBlock, Vec2::ZERO, Some(0.2));
            scene.add_effect(EffectKind::PerfectParry, Vec2::ZERO, None);
            scene.update(0.25);
            assert_eq!(scene.effect_count(), 1);
        }
    }

    mod death_tests {
        use super::*;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        fn count(scene: &Scene, predicate: impl Fn(&EffectKind) -> bool) -> usize {
            scene.effects().filter(|(_, effect)| predicate(effect.kind())).count()
        }

        fn corpses(scene: &Scene) -> usize {
            count(scene, |kind| matches!(kind, EffectKind::Corpse { .. }))
        }

        #[test]
        fn survivable_damage_shows_the_amount() {
            let (mut scene, ids) = scene_with(&[(Team::Enemy, Vec2::ZERO)]);
            let mut rng = ChaCha8Rng::seed_from_u64(1);

            let outcome = scene.damage(ids[0], 30.0, &CombatConfig::default(), &mut rng);
            assert_eq!(outcome, Some((30.0, false)));
            assert_eq!(scene.label_of(ids[0]), Some("-30"));
            assert!((scene.get(ids[0]).unwrap().ledger().health() - 70.0).abs() < 1e-4);
        }

        #[test]
        fn fatal_damage_slays_and_queues_removal() {
            let (mut scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO), (Team::Enemy, Vec2::ZERO)]);
            let mut rng = ChaCha8Rng::seed_from_u64(1);

            let outcome = scene.damage(ids[0], 150.0, &CombatConfig::default(), &mut rng);
            assert_eq!(outcome, Some((150.0, true)));
            assert!(scene.get(ids[0]).is_none());
            assert_eq!(scene.category(Team::Player.into()).count(), 0);

            assert_eq!(corpses(&scene), 2);
            assert_eq!(count(&scene, |kind| matches!(kind, EffectKind::Particle { color: "#fff", .. })), 80);
            assert!(scene
                .effects()
                .any(|(_, effect)| *effect.kind() == EffectKind::Label { text: "Slain!".to_string() }));
            assert_eq!(scene.flush_removals(), 1);
        }

        #[test]
        fn damaging_a_removed_character_does_nothing() {
            let (mut scene, ids) = scene_with(&[(Team::Enemy, Vec2::ZERO)]);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            scene.remove(ids[0]);

            assert_eq!(scene.damage(ids[0], 150.0, &CombatConfig::default(), &mut rng), None);
            assert_eq!(scene.effect_count(), 0);
        }

        #[test]
        fn health_drained_through_the_ledger_is_slain_by_the_sweep() {
            let (mut scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO), (Team::Enemy, Vec2::ZERO)]);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let config = CombatConfig::default();
            scene.get_mut(ids[1]).unwrap().ledger_mut().damage(500.0, 0.0, false, &config);

            assert_eq!(scene.slay_fallen(&config, &mut rng), 1);
            assert!(scene.get(ids[1]).is_none());
            assert!(scene.get(ids[0]).is_some());
            assert_eq!(scene.slay_fallen(&config, &mut rng), 0);
        }

        #[test]
        fn corpses_fade_after_a_while() {
            let (mut scene, ids) = scene_with(&[(Team::Enemy, Vec2::ZERO)]);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            scene.damage(ids[0], 150.0, &CombatConfig::default(), &mut rng);
            scene.flush_removals();

            for _ in 0..19 {
                scene.update(0.5);
            }
            assert_eq!(corpses(&scene), 2);

            scene.update(0.5);
            assert_eq!(corpses(&scene), 0);
            assert_eq!(scene.effect_count(), 0);
        }
    }
}
