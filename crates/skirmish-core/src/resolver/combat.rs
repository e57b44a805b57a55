//! Combat resolver for stamina costs and strikes.
//!
//! The `CombatResolver` handles:
//! - `LoseStamina` actions: spend the source's stamina
//! - `Strike` actions: pick a victim and resolve a hit, a block or a perfect
//!   parry
//!
//! # Strike Resolution
//!
//! 1. Pick the victim with the best strikability in the attacker's strike
//!    ellipse, over a half-turn field of view. No victim is a whiff.
//! 2. Shielded victim: the victim turns to face the attacker, its parry count
//!    goes up and the attacker recoils.
//!    - Inside the perfect-parry window the victim gets its stamina back,
//!      scores a combo, pushes back every opponent within its strike box and
//!      the scene drops into slow motion.
//!    - Otherwise the victim pays `relative_strength × 0.2` stamina.
//! 3. Unshielded victim: damage and knockback of `strength × relative_strength`,
//!    the attacker scores a combo and impact particles fly. A victim whose
//!    health reaches zero is slain.

use glam::Vec2;
use rand::RngCore;
use std::f32::consts::PI;
use tracing::debug;

use crate::character::CharacterId;
use crate::config::CombatConfig;
use crate::effects::{
    between, EffectKind, CHEST_HEIGHT, PERFECT_PARRY_DURATION, SHIELD_BLOCK_DURATION,
};
use crate::geometry::{angle_between, facing_sign, is_within_radii};
use crate::scene::Scene;
use crate::state::{ActionEnvelope, ActionKind, StateAction};

use super::{CombatEvent, ResolveContext, Resolver, StrikeOutcome};

/// Resolver for stamina costs and strikes.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{CombatResolver, Resolver};
/// use skirmish_core::state::ActionKind;
///
/// let resolver = CombatResolver::default();
/// assert!(resolver.handles().contains(&ActionKind::Strike));
/// assert!(resolver.handles().contains(&ActionKind::Stamina));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    config: CombatConfig,
}

impl CombatResolver {
    /// Creates a combat resolver.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Resolves a strike by `attacker` and records the outcome on the scene.
    ///
    /// Returns `None` if the attacker is not a live character.
    pub fn strike(
        &self,
        ctx: &mut ResolveContext<'_>,
        attacker_id: CharacterId,
        relative_strength: f32,
    ) -> Option<CombatEvent> {
        let scene = &mut *ctx.scene;
        let attacker = scene.get(attacker_id)?;
        let strength = attacker.profile().strength;
        let origin = attacker.position;
        let time = scene.age();

        let Some(victim_id) = scene.pick_victim(attacker_id, attacker.profile().strike_radii, PI) else {
            debug!(attacker = %attacker_id, "strike missed");
            let event = CombatEvent::miss(time, attacker_id, relative_strength);
            scene.record_event(event.clone());
            return Some(event);
        };

        let victim = scene.get(victim_id)?;
        let angle = angle_between(origin, victim.position);
        let mut event = CombatEvent {
            victim: Some(victim_id),
            ..CombatEvent::miss(time, attacker_id, relative_strength)
        };

        if victim.state().shielded() {
            let perfect = victim.state().perfect_parry();
            self.parry(scene, attacker_id, victim_id, angle);
            if perfect {
                self.perfect_parry(scene, victim_id);
                event.outcome = StrikeOutcome::PerfectParry;
            } else {
                self.block(scene, victim_id, relative_strength);
                event.outcome = StrikeOutcome::Block;
            }
        } else {
            let impact = strength * relative_strength;
            let (damage, died) = self.hit(scene, &mut *ctx.rng, attacker_id, victim_id, angle, impact);
            event.outcome = StrikeOutcome::Hit;
            event.damage = damage;
            event.knockback = impact;
            event.victim_died = died;
        }

        debug!(
            attacker = %attacker_id,
            victim = %victim_id,
            outcome = ?event.outcome,
            damage = event.damage,
            "strike resolved"
        );
        scene.record_event(event.clone());
        Some(event)
    }

    /// Common to every shielded strike: the victim faces the attacker and
    /// the attacker recoils.
    fn parry(&self, scene: &mut Scene, attacker_id: CharacterId, victim_id: CharacterId, angle: f32) {
        let attacker_x = scene.get(attacker_id).map_or(0.0, |a| a.position.x);
        if let Some(victim) = scene.get_mut(victim_id) {
            victim.facing = facing_sign(attacker_x - victim.position.x);
            victim.ledger_mut().record_parry();
        }
        scene.dash(
            attacker_id,
            angle + PI,
            self.config.parry_recoil,
            self.config.knockback_duration,
        );
    }

    fn perfect_parry(&self, scene: &mut Scene, victim_id: CharacterId) {
        let Some(victim) = scene.get_mut(victim_id) else {
            return;
        };
        victim.ledger_mut().restore_stamina();
        victim.update_combo(1, "Perfect Block!");

        let position = victim.position;
        let reach = victim.profile().strike_radii;
        let opponents = victim.target_team();
        let pushed: Vec<_> = scene
            .category(opponents.into())
            .filter(|other| is_within_radii(position, other.position, reach))
            .map(|other| (other.id(), angle_between(position, other.position)))
            .collect();

        scene.display_label(victim_id, "Perfect Block!");
        scene.add_effect(
            EffectKind::PerfectParry,
            position - Vec2::new(0.0, CHEST_HEIGHT),
            Some(PERFECT_PARRY_DURATION),
        );
        for (id, angle) in pushed {
            scene.dash(
                id,
                angle,
                self.config.pushback_distance,
                self.config.pushback_duration,
            );
        }
        scene.start_slow_motion(self.config.slow_motion);
    }

    fn block(&self, scene: &mut Scene, victim_id: CharacterId, relative_strength: f32) {
        let Some(victim) = scene.get_mut(victim_id) else {
            return;
        };
        victim.lose_stamina(relative_strength * self.config.block_stamina_factor);
        let position = victim.position;

        scene.display_label(victim_id, "Blocked!");
        scene.add_effect(
            EffectKind::ShieldBlock,
            position - Vec2::new(0.0, CHEST_HEIGHT),
            Some(SHIELD_BLOCK_DURATION),
        );
    }

    /// Returns the damage applied and whether the victim died.
    fn hit(
        &self,
        scene: &mut Scene,
        rng: &mut dyn RngCore,
        attacker_id: CharacterId,
        victim_id: CharacterId,
        angle: f32,
        impact: f32,
    ) -> (f32, bool) {
        let Some(position) = scene.get(victim_id).map(|v| v.position) else {
            return (0.0, false);
        };
        let (damage, died) = scene
            .damage(victim_id, impact, &self.config, rng)
            .unwrap_or((0.0, false));
        scene.dash(victim_id, angle, impact, self.config.knockback_duration);

        if let Some(attacker) = scene.get_mut(attacker_id) {
            attacker.update_combo(1, "Hit");
        }
        self.impact_particles(scene, rng, position);

        (damage, died)
    }

    fn impact_particles(&self, scene: &mut Scene, rng: &mut dyn RngCore, at: Vec2) {
        let impact = at + Vec2::new(between(rng, -20.0, 20.0), -CHEST_HEIGHT + between(rng, -20.0, 20.0));
        let size = between(rng, 1.0, 2.0);
        for _ in 0..self.config.impact_particles {
            let grown = size + between(rng, 3.0, 6.0);
            let to = impact + Vec2::new(between(rng, -30.0, 30.0), between(rng, -30.0, 30.0));
            let duration = between(rng, 0.2, 0.4);
            scene.add_effect(
                EffectKind::Particle {
                    color: "#900",
                    size: (size, grown),
                    to,
                },
                impact,
                Some(duration),
            );
        }
    }
}

impl Resolver for CombatResolver {
    fn handles(&self) -> &[ActionKind] {
        &[ActionKind::Stamina, ActionKind::Strike]
    }

    fn resolve(&self, actions: &[&ActionEnvelope], ctx: &mut ResolveContext<'_>) {
        for envelope in actions {
            match *envelope.action() {
                StateAction::LoseStamina(amount) => {
                    if let Some(character) = ctx.scene.get_mut(envelope.source()) {
                        character.lose_stamina(amount);
                    }
                }
                StateAction::Strike { relative_strength } => {
                    self.strike(ctx, envelope.source(), relative_strength);
                }
                StateAction::Dash { .. } | StateAction::Lunge => {}
            }
        }
    }
}
