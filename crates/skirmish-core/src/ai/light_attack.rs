//! One light attack: chase, prepare, release.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, Routine, RoutineContext, RoutineCore, RoutineKind};
use crate::character::CharacterId;
use crate::geometry::angle_between;

/// Phase of a [`LightAttackRoutine`]. Exactly one is active per tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Moving toward the target until it is strikable.
    Chase,
    /// Holding the attack control.
    Prepare,
    /// Attack control released; the routine has resolved.
    Release,
}

impl AttackPhase {
    const fn label(self) -> &'static str {
        match self {
            Self::Chase => "chase",
            Self::Prepare => "prepare",
            Self::Release => "release",
        }
    }
}

/// Chases the target, holds the attack once in range and releases it after
/// half the heavy-attack preparation time, then resolves.
#[derive(Debug)]
pub struct LightAttackRoutine {
    core: RoutineCore,
    phase: AttackPhase,
}

impl LightAttackRoutine {
    /// Creates a light attack in the chase phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: RoutineCore::default(),
            phase: AttackPhase::Chase,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    fn enter(&mut self, entity: CharacterId, phase: AttackPhase) {
        if self.phase != phase {
            debug!(%entity, from = self.phase.label(), to = phase.label(), "light attack phase");
            self.phase = phase;
        }
    }
}

impl Default for LightAttackRoutine {
    fn default() -> Self {
        Self::new()
    }
}

impl Routine for LightAttackRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::LightAttack
    }

    fn bind(&mut self, entity: CharacterId) {
        self.core.bind(entity);
    }

    fn start(&mut self, _ctx: &mut RoutineContext<'_>) -> Completion {
        self.phase = AttackPhase::Chase;
        self.core.begin()
    }

    fn cycle(&mut self, ctx: &mut RoutineContext<'_>) {
        let Some(me) = ctx.me() else {
            self.core.abandon();
            return;
        };
        let Some(target) = ctx.target() else {
            return;
        };
        let entity = me.id();

        ctx.controls_mut().force = 0.0;

        match me.state().preparing_since() {
            None => {
                if ctx.can_strike(target) {
                    ctx.controls_mut().attack = true;
                    self.enter(entity, AttackPhase::Prepare);
                } else {
                    let controls = ctx.controls_mut();
                    controls.force = 1.0;
                    controls.angle = angle_between(me.position, target.position);
                    self.enter(entity, AttackPhase::Chase);
                }
            }
            Some(since) => {
                let release_after = me.state().config().time_to_prepare_heavy_attack / 2.0;
                if me.age() - since > release_after {
                    ctx.controls_mut().release();
                    self.enter(entity, AttackPhase::Release);
                    self.core.resolve();
                } else {
                    self.enter(entity, AttackPhase::Prepare);
                }
            }
        }
    }

    fn description(&self) -> String {
        format!("LightAttack ({})", self.phase.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Controls, Team};
    use crate::state::StateInput;
    use crate::tests::helpers::{routine_context, scene_with};
    use glam::Vec2;

    #[test]
    fn chases_an_out_of_range_target() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(0.0, 200.0)),
        ]);
        let mut controls = Controls {
            aim: Vec2::new(0.0, 200.0),
            ..Controls::default()
        };
        let mut attack = LightAttackRoutine::new();
        let completion = routine_context(&scene, ids[0], &mut controls, |ctx| {
            let completion = attack.start(ctx);
            attack.cycle(ctx);
            completion
        });

        assert_eq!(attack.phase(), AttackPhase::Chase);
        assert_eq!(controls.force, 1.0);
        assert!((controls.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(!controls.attack);
        assert!(completion.is_pending());
    }

    #[test]
    fn raises_attack_once_in_range() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(50.0, 0.0)),
        ]);
        let mut controls = Controls {
            aim: Vec2::new(50.0, 0.0),
            ..Controls::default()
        };
        let mut attack = LightAttackRoutine::new();
        routine_context(&scene, ids[0], &mut controls, |ctx| {
            attack.start(ctx);
            attack.cycle(ctx);
        });

        assert_eq!(attack.phase(), AttackPhase::Prepare);
        assert!(controls.attack);
        assert_eq!(controls.force, 0.0);
    }

    #[test]
    fn releases_after_half_the_preparation_time() {
        let (mut scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(50.0, 0.0)),
        ]);
        let mut controls = Controls {
            aim: Vec2::new(50.0, 0.0),
            attack: true,
            ..Controls::default()
        };
        {
            let enemy = scene.get_mut(ids[0]).unwrap();
            let input = StateInput {
                controls,
                stamina: 1.0,
                health: 100.0,
                now: enemy.age(),
            };
            enemy.state_mut().cycle(&input, 0.0);
            assert_eq!(enemy.state().preparing_since(), Some(0.0));
        }

        let mut attack = LightAttackRoutine::new();
        let completion = routine_context(&scene, ids[0], &mut controls, |ctx| attack.start(ctx));

        scene.advance_age(0.4);
        routine_context(&scene, ids[0], &mut controls, |ctx| attack.cycle(ctx));
        assert!(controls.attack);
        assert!(completion.is_pending());

        scene.advance_age(0.2);
        routine_context(&scene, ids[0], &mut controls, |ctx| attack.cycle(ctx));
        assert!(!controls.attack);
        assert_eq!(controls.aim, Vec2::new(50.0, 0.0));
        assert_eq!(attack.phase(), AttackPhase::Release);
        assert!(completion.is_resolved());
    }

    #[test]
    fn no_target_writes_nothing() {
        let (scene, ids) = scene_with(&[(Team::Enemy, Vec2::ZERO)]);
        let mut controls = Controls {
            force: 0.7,
            ..Controls::default()
        };
        let mut attack = LightAttackRoutine::new();
        let completion = routine_context(&scene, ids[0], &mut controls, |ctx| {
            let completion = attack.start(ctx);
            attack.cycle(ctx);
            completion
        });
        assert_eq!(controls.force, 0.7);
        assert!(completion.is_pending());
    }
}
