//! Physics resolver for dashes, lunges and per-tick movement.
//!
//! The `PhysicsResolver` handles:
//! - `Dash` actions: animate the character along the dash angle
//! - `Lunge` actions: close the gap toward the best victim in the magnet
//!   ellipse, or step forward along the aim when there is none
//! - Integration: `position += direction(angle) * force * speed * elapsed`
//! - Collisions: push each character out of every overlapping neighbour
//!
//! # Collision Order
//!
//! Collisions are corrected one pair at a time, in id order, against the
//! positions as they are at that moment. When several neighbours overlap the
//! same character the last correction wins.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;
use tracing::{trace, warn};

use crate::character::{Category, CharacterId};
use crate::config::CombatConfig;
use crate::geometry::{angle_between, direction, distance, facing_sign};
use crate::scene::Scene;
use crate::state::{ActionEnvelope, ActionKind, StateAction};

use super::{ResolveContext, Resolver};

/// Resolver for movement actions and movement integration.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{PhysicsResolver, Resolver};
/// use skirmish_core::state::ActionKind;
///
/// let resolver = PhysicsResolver::default();
/// assert!(resolver.handles().contains(&ActionKind::Movement));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhysicsResolver {
    config: CombatConfig,
}

impl PhysicsResolver {
    /// Creates a physics resolver.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// Lunges `source` toward its best victim in the magnet ellipse.
    ///
    /// Without a victim the character steps the fallback distance along its
    /// aim. Otherwise it stops half a strike reach short of the victim.
    pub fn lunge(&self, scene: &mut Scene, source: CharacterId) -> Option<Vec2> {
        let character = scene.get(source)?;
        let magnet = character.profile().magnet_radii;
        let strike_reach = character.profile().strike_radii.x;
        let origin = character.position;

        let (angle, reach) = match scene.pick_victim(source, magnet, FRAC_PI_2) {
            Some(victim) => {
                let target = scene.get(victim)?.position;
                let gap = (distance(origin, target) - strike_reach / 2.0).max(0.0);
                (angle_between(origin, target), gap)
            }
            None => (
                character.controls.aim_angle(origin),
                self.config.lunge_fallback_distance,
            ),
        };
        scene.dash(source, angle, reach, self.config.lunge_duration)
    }

    /// Moves every live character by its controls, updates facing and
    /// resolves collisions.
    pub fn integrate(scene: &mut Scene, elapsed: f32) {
        for id in scene.character_ids() {
            let Some(character) = scene.get_mut(id) else {
                continue;
            };
            let speed = character.state().speed_ratio() * character.profile().base_speed;
            let controls = character.controls;
            let delta = direction(controls.angle) * controls.clamped_force() * speed * elapsed;
            let next = character.position + delta;

            debug_assert!(next.is_finite(), "non-finite position for {id}");
            if next.is_finite() {
                character.position = next;
            } else {
                warn!(%id, angle = controls.angle, force = controls.force, "skipping non-finite movement");
            }
            character.facing = facing_sign(controls.aim.x - character.position.x);

            Self::collide(scene, id);
        }
    }

    /// Pushes `id` to the collision boundary of every overlapping character.
    fn collide(scene: &mut Scene, id: CharacterId) {
        let Some(radius) = scene.get(id).map(|c| c.profile().collision_radius) else {
            return;
        };
        let others: Vec<_> = scene
            .category(Category::Character)
            .filter(|other| other.id() != id)
            .map(|other| other.id())
            .collect();

        for other_id in others {
            let Some(other) = scene.get(other_id).map(|c| c.position) else {
                continue;
            };
            let Some(character) = scene.get_mut(id) else {
                return;
            };
            if distance(character.position, other) > radius {
                continue;
            }
            let angle = angle_between(character.position, other);
            character.position = other - direction(angle) * radius;
            trace!(%id, other = %other_id, "collision");
        }
    }
}

impl Resolver for PhysicsResolver {
    fn handles(&self) -> &[ActionKind] {
        &[ActionKind::Movement]
    }

    fn resolve(&self, actions: &[&ActionEnvelope], ctx: &mut ResolveContext<'_>) {
        for envelope in actions {
            match *envelope.action() {
                StateAction::Dash {
                    angle,
                    distance,
                    duration,
                } => {
                    ctx.scene.dash(envelope.source(), angle, distance, duration);
                }
                StateAction::Lunge => {
                    self.lunge(ctx.scene, envelope.source());
                }
                StateAction::LoseStamina(_) | StateAction::Strike { .. } => {}
            }
        }
    }
}
