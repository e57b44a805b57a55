//! Cooperative AI routines.
//!
//! A routine is a suspendable unit of behavior controlling one character.
//! It is bound to its character, started (which hands back a [`Completion`]),
//! then cycled once per tick until it resolves its own [`Signal`]. Composite
//! routines such as [`EnemyRoutine`] launch child routines, keep exactly one
//! of them current and move to the next phase in the same tick the child
//! resolves.
//!
//! Routines never touch the scene directly. Each cycle receives a
//! [`RoutineContext`] with read access to the scene and write access to a
//! working copy of the bound character's [`Controls`]. The simulation writes
//! that copy back once the cycle returns.
//!
//! A character owns its [`Controller`]. Replacing the controller or removing
//! the character drops the routine tree; every pending [`Signal`] in it then
//! settles as [`SignalState::Abandoned`].

mod enemy;
mod light_attack;
mod retreat;
mod signal;
mod wait;

pub use enemy::{BurstSize, EnemyRoutine};
pub use light_attack::{AttackPhase, LightAttackRoutine};
pub use retreat::RetreatRoutine;
pub use signal::{Completion, Signal, SignalState};
pub use wait::WaitRoutine;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::character::{Character, CharacterId, Controls};
use crate::geometry;
use crate::scene::Scene;

// =============================================================================
// Routine Trait
// =============================================================================

/// Tag identifying a concrete routine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutineKind {
    /// Does nothing; the character is driven from outside.
    Idle,
    /// Waits for a duration of the character's age.
    Wait,
    /// Chases, prepares and releases one light attack.
    LightAttack,
    /// Backs away from the target.
    Retreat,
    /// Looping enemy behavior.
    Enemy,
}

impl RoutineKind {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Wait => "Wait",
            Self::LightAttack => "LightAttack",
            Self::Retreat => "Retreat",
            Self::Enemy => "Enemy",
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A suspendable unit of behavior.
///
/// # Example
///
/// ```
/// use skirmish_core::ai::{Completion, Routine, RoutineContext, RoutineCore, RoutineKind};
/// use skirmish_core::character::CharacterId;
///
/// /// Holds the shield until the character is older than 3.
/// #[derive(Debug, Default)]
/// struct Turtle {
///     core: RoutineCore,
/// }
///
/// impl Routine for Turtle {
///     fn kind(&self) -> RoutineKind {
///         RoutineKind::Idle
///     }
///
///     fn bind(&mut self, entity: CharacterId) {
///         self.core.bind(entity);
///     }
///
///     fn start(&mut self, _ctx: &mut RoutineContext<'_>) -> Completion {
///         self.core.begin()
///     }
///
///     fn cycle(&mut self, ctx: &mut RoutineContext<'_>) {
///         let Some(age) = ctx.age() else {
///             self.core.abandon();
///             return;
///         };
///         ctx.controls_mut().shield = age <= 3.0;
///         if age > 3.0 {
///             self.core.resolve();
///         }
///     }
/// }
/// ```
pub trait Routine: fmt::Debug {
    /// Concrete routine tag.
    fn kind(&self) -> RoutineKind;

    /// Binds the character this routine controls.
    fn bind(&mut self, entity: CharacterId);

    /// Starts the routine. The returned completion settles exactly once.
    fn start(&mut self, ctx: &mut RoutineContext<'_>) -> Completion;

    /// Runs one tick of behavior. Only called while the routine is current.
    fn cycle(&mut self, ctx: &mut RoutineContext<'_>);

    /// Kind of the leaf routine currently executing.
    fn active(&self) -> RoutineKind {
        self.kind()
    }

    /// Debug description of the routine tree.
    fn description(&self) -> String {
        self.kind().label().to_string()
    }
}

/// Binding and signal bookkeeping shared by routine implementations.
#[derive(Debug, Default)]
pub struct RoutineCore {
    entity: Option<CharacterId>,
    signal: Option<Signal>,
}

impl RoutineCore {
    /// Records the bound character.
    pub fn bind(&mut self, entity: CharacterId) {
        self.entity = Some(entity);
    }

    /// Bound character, if any.
    #[must_use]
    pub fn entity(&self) -> Option<CharacterId> {
        self.entity
    }

    /// Creates a fresh signal and returns its completion. Any previous
    /// pending signal is abandoned.
    pub fn begin(&mut self) -> Completion {
        let (signal, completion) = Signal::pair();
        self.signal = Some(signal);
        completion
    }

    /// Resolves the current signal.
    pub fn resolve(&mut self) {
        if let Some(signal) = &self.signal {
            signal.resolve();
        }
    }

    /// Abandons the current signal.
    pub fn abandon(&mut self) {
        if let Some(signal) = &self.signal {
            signal.abandon();
        }
    }

    /// Returns `true` while started and not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.signal.as_ref().is_some_and(Signal::is_pending)
    }
}

// =============================================================================
// Context
// =============================================================================

/// What a routine sees and may change during one cycle.
pub struct RoutineContext<'a> {
    scene: &'a Scene,
    entity: CharacterId,
    controls: &'a mut Controls,
    elapsed: f32,
    rng: &'a mut dyn RngCore,
}

impl fmt::Debug for RoutineContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineContext")
            .field("entity", &self.entity)
            .field("controls", &self.controls)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl<'a> RoutineContext<'a> {
    /// Creates a context for `entity`.
    pub fn new(
        scene: &'a Scene,
        entity: CharacterId,
        controls: &'a mut Controls,
        elapsed: f32,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            scene,
            entity,
            controls,
            elapsed,
            rng,
        }
    }

    /// The controlled character's id.
    #[must_use]
    pub fn entity(&self) -> CharacterId {
        self.entity
    }

    /// The scene, read-only.
    #[must_use]
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// The controlled character, unless it is missing or removed.
    #[must_use]
    pub fn me(&self) -> Option<&'a Character> {
        self.scene.get(self.entity)
    }

    /// Age of the controlled character.
    #[must_use]
    pub fn age(&self) -> Option<f32> {
        self.me().map(Character::age)
    }

    /// Nearest live character of the controlled character's target team.
    /// Ties keep the lowest id.
    #[must_use]
    pub fn target(&self) -> Option<&'a Character> {
        let me = self.me()?;
        self.scene.nearest(me.position, me.target_team().into())
    }

    /// Working controls.
    #[must_use]
    pub fn controls(&self) -> &Controls {
        &*self.controls
    }

    /// Working controls, mutably.
    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut *self.controls
    }

    /// Scaled time elapsed this tick.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The simulation's random source.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// Returns `true` if `target` is within ±90° of the working aim and inside
    /// the controlled character's strike box.
    #[must_use]
    pub fn can_strike(&self, target: &Character) -> bool {
        self.me().is_some_and(|me| {
            me.id() != target.id()
                && geometry::is_strikable(
                    me.position,
                    self.controls.aim,
                    target.position,
                    me.profile().strike_radii,
                )
        })
    }
}

// =============================================================================
// Idle
// =============================================================================

/// A routine that never resolves and writes nothing.
///
/// Used for characters driven from outside, such as the player.
#[derive(Debug, Default)]
pub struct IdleRoutine {
    core: RoutineCore,
}

impl IdleRoutine {
    /// Creates an idle routine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Routine for IdleRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Idle
    }

    fn bind(&mut self, entity: CharacterId) {
        self.core.bind(entity);
    }

    fn start(&mut self, _ctx: &mut RoutineContext<'_>) -> Completion {
        self.core.begin()
    }

    fn cycle(&mut self, _ctx: &mut RoutineContext<'_>) {}
}

// =============================================================================
// Controller
// =============================================================================

/// Owner of a character's top-level routine.
///
/// The controller starts its routine on first use and only cycles it while
/// its completion is pending.
#[derive(Debug)]
pub struct Controller {
    routine: Box<dyn Routine>,
    completion: Option<Completion>,
}

impl Controller {
    /// Wraps a routine.
    #[must_use]
    pub fn new(routine: impl Routine + 'static) -> Self {
        Self::from_boxed(Box::new(routine))
    }

    /// Wraps a boxed routine.
    #[must_use]
    pub fn from_boxed(routine: Box<dyn Routine>) -> Self {
        Self {
            routine,
            completion: None,
        }
    }

    /// Controller running an [`IdleRoutine`].
    #[must_use]
    pub fn idle() -> Self {
        Self::new(IdleRoutine::new())
    }

    /// Controller running an [`EnemyRoutine`] with random bursts.
    #[must_use]
    pub fn enemy() -> Self {
        Self::new(EnemyRoutine::new())
    }

    /// Binds and starts the routine unless it already started.
    pub fn start(&mut self, ctx: &mut RoutineContext<'_>) {
        if self.completion.is_none() {
            self.routine.bind(ctx.entity());
            self.completion = Some(self.routine.start(ctx));
        }
    }

    /// Runs one tick of the routine while it is pending.
    pub fn cycle(&mut self, ctx: &mut RoutineContext<'_>) {
        self.start(ctx);
        if self.completion.as_ref().is_some_and(Completion::is_pending) {
            self.routine.cycle(ctx);
        }
    }

    /// Returns `true` once started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.completion.is_some()
    }

    /// Completion of the top-level routine, once started.
    #[must_use]
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Kind of the leaf routine currently executing.
    #[must_use]
    pub fn active(&self) -> RoutineKind {
        self.routine.active()
    }

    /// Debug description of the routine tree.
    #[must_use]
    pub fn description(&self) -> String {
        self.routine.description()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::idle()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Team;
    use crate::tests::helpers::{routine_context, scene_with};
    use glam::Vec2;

    #[test]
    fn core_settles_once() {
        let mut core = RoutineCore::default();
        assert!(!core.is_pending());
        let completion = core.begin();
        assert!(core.is_pending());
        core.resolve();
        core.abandon();
        assert!(completion.is_resolved());
    }

    #[test]
    fn rebegin_abandons_the_previous_signal() {
        let mut core = RoutineCore::default();
        let first = core.begin();
        let second = core.begin();
        assert!(first.is_abandoned());
        assert!(second.is_pending());
    }

    #[test]
    fn controller_starts_lazily_and_idles_forever() {
        let (scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO)]);
        let mut controls = Controls::default();
        let mut controller = Controller::idle();
        assert!(!controller.is_started());

        for _ in 0..10 {
            routine_context(&scene, ids[0], &mut controls, |ctx| controller.cycle(ctx));
        }
        assert!(controller.is_started());
        assert!(controller.completion().is_some_and(Completion::is_pending));
        assert_eq!(controller.active(), RoutineKind::Idle);
        assert_eq!(controls, Controls::default());
    }

    #[test]
    fn dropping_a_controller_abandons_its_routine() {
        let (scene, ids) = scene_with(&[(Team::Player, Vec2::ZERO)]);
        let mut controls = Controls::default();
        let mut controller = Controller::idle();
        routine_context(&scene, ids[0], &mut controls, |ctx| controller.start(ctx));
        let completion = controller.completion().cloned().unwrap();

        drop(controller);
        assert!(completion.is_abandoned());
    }

    #[test]
    fn context_targets_the_nearest_opponent() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(300.0, 0.0)),
            (Team::Player, Vec2::new(-100.0, 0.0)),
            (Team::Enemy, Vec2::new(10.0, 0.0)),
        ]);
        let mut controls = Controls::default();
        routine_context(&scene, ids[0], &mut controls, |ctx| {
            assert_eq!(ctx.target().map(Character::id), Some(ids[2]));
            assert_eq!(ctx.me().map(Character::id), Some(ids[0]));
        });
    }

    #[test]
    fn can_strike_uses_working_aim() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(50.0, 0.0)),
        ]);
        let mut controls = Controls::default();
        routine_context(&scene, ids[0], &mut controls, |ctx| {
            let target = ctx.target().unwrap();
            ctx.controls_mut().aim = Vec2::new(-50.0, 0.0);
            assert!(!ctx.can_strike(target));
            ctx.controls_mut().aim = target.position;
            assert!(ctx.can_strike(target));
            assert!(!ctx.can_strike(ctx.me().unwrap()));
        });
    }

    #[test]
    fn missing_character_has_no_target() {
        let (scene, _) = scene_with(&[(Team::Player, Vec2::ZERO)]);
        let mut controls = Controls::default();
        routine_context(&scene, CharacterId::new(99), &mut controls, |ctx| {
            assert!(ctx.me().is_none());
            assert!(ctx.target().is_none());
            assert!(ctx.age().is_none());
        });
    }
}
