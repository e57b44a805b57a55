//! Resolvers turn state-machine actions into scene mutations.
//!
//! State machines only gate behavior. When a transition needs something done
//! to the world (a dash, a stamina cost, a strike) the machine emits a
//! [`StateAction`](crate::state::StateAction), the simulation wraps it in an
//! [`ActionEnvelope`] and routes it to every resolver whose
//! [`Resolver::handles()`] lists the action's [`ActionKind`].
//!
//! # Invariants
//!
//! - Resolvers MUST be deterministic given the same scene, actions and RNG
//! - Actions are applied in the order they were emitted (character id order,
//!   then emission order within a character)
//! - Randomness is drawn only from [`ResolveContext::rng`]
//!
//! # Available Resolvers
//!
//! - [`PhysicsResolver`]: dashes, lunges, movement integration and collisions
//! - [`CombatResolver`]: stamina costs and strikes (hit, block, perfect parry)

mod combat;
mod event;
mod physics;

pub use combat::CombatResolver;
pub use event::{CombatEvent, EventLog, StrikeOutcome};
pub use physics::PhysicsResolver;

use rand::RngCore;

use crate::scene::Scene;
use crate::state::{ActionEnvelope, ActionKind};

/// Mutable state a resolver works on.
pub struct ResolveContext<'a> {
    /// The scene to mutate.
    pub scene: &'a mut Scene,
    /// Simulation random source.
    pub rng: &'a mut dyn RngCore,
}

impl<'a> ResolveContext<'a> {
    /// Bundles a scene with a random source.
    pub fn new(scene: &'a mut Scene, rng: &'a mut dyn RngCore) -> Self {
        Self { scene, rng }
    }
}

/// Resolver applies routed actions to the scene.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{ResolveContext, Resolver};
/// use skirmish_core::state::{ActionEnvelope, ActionKind};
///
/// struct Tally;
///
/// impl Resolver for Tally {
///     fn handles(&self) -> &[ActionKind] {
///         &[ActionKind::Stamina]
///     }
///
///     fn resolve(&self, actions: &[&ActionEnvelope], ctx: &mut ResolveContext<'_>) {
///         // Inspect actions and mutate ctx.scene
///     }
/// }
/// ```
pub trait Resolver {
    /// Returns the action kinds this resolver handles.
    fn handles(&self) -> &[ActionKind];

    /// Applies `actions` (already filtered by [`handles()`](Self::handles)).
    fn resolve(&self, actions: &[&ActionEnvelope], ctx: &mut ResolveContext<'_>);
}

/// Routes each envelope to every resolver that handles its kind.
pub fn dispatch(resolvers: &[&dyn Resolver], envelopes: &[ActionEnvelope], ctx: &mut ResolveContext<'_>) {
    for resolver in resolvers {
        let routed: Vec<&ActionEnvelope> = envelopes
            .iter()
            .filter(|envelope| resolver.handles().contains(&envelope.action().kind()))
            .collect();
        if !routed.is_empty() {
            resolver.resolve(&routed, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterId;
    use crate::state::StateAction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        kinds: Vec<ActionKind>,
        seen: RefCell<Vec<StateAction>>,
    }

    impl Resolver for Recorder {
        fn handles(&self) -> &[ActionKind] {
            &self.kinds
        }

        fn resolve(&self, actions: &[&ActionEnvelope], _ctx: &mut ResolveContext<'_>) {
            self.seen
                .borrow_mut()
                .extend(actions.iter().map(|envelope| *envelope.action()));
        }
    }

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[&dyn Resolver]) {}
    }

    #[test]
    fn dispatch_routes_by_kind_in_order() {
        let movement = Recorder {
            kinds: vec![ActionKind::Movement],
            ..Recorder::default()
        };
        let combat = Recorder {
            kinds: vec![ActionKind::Stamina, ActionKind::Strike],
            ..Recorder::default()
        };
        let source = CharacterId::new(0);
        let envelopes = [
            ActionEnvelope::new(source, StateAction::LoseStamina(0.1), 0),
            ActionEnvelope::new(source, StateAction::Lunge, 1),
            ActionEnvelope::new(source, StateAction::Strike { relative_strength: 1.0 }, 2),
        ];

        let mut scene = Scene::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = ResolveContext::new(&mut scene, &mut rng);
        dispatch(&[&movement, &combat], &envelopes, &mut ctx);

        assert_eq!(*movement.seen.borrow(), vec![StateAction::Lunge]);
        assert_eq!(
            *combat.seen.borrow(),
            vec![
                StateAction::LoseStamina(0.1),
                StateAction::Strike { relative_strength: 1.0 }
            ]
        );
    }
}
