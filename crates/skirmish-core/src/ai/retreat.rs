//! Backing away from the target.

use super::{Completion, Routine, RoutineContext, RoutineCore, RoutineKind};
use crate::character::CharacterId;
use crate::geometry::{angle_between, distance};

/// Distance beyond which a retreat is complete.
pub const RETREAT_DISTANCE: f32 = 200.0;

/// Moves straight away from the target while closer than the retreat
/// distance, then resolves.
#[derive(Debug)]
pub struct RetreatRoutine {
    core: RoutineCore,
    distance: f32,
}

impl RetreatRoutine {
    /// Creates a retreat to [`RETREAT_DISTANCE`].
    #[must_use]
    pub fn new() -> Self {
        Self::to_distance(RETREAT_DISTANCE)
    }

    /// Creates a retreat to a custom distance.
    #[must_use]
    pub fn to_distance(distance: f32) -> Self {
        Self {
            core: RoutineCore::default(),
            distance,
        }
    }
}

impl Default for RetreatRoutine {
    fn default() -> Self {
        Self::new()
    }
}

impl Routine for RetreatRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Retreat
    }

    fn bind(&mut self, entity: CharacterId) {
        self.core.bind(entity);
    }

    fn start(&mut self, _ctx: &mut RoutineContext<'_>) -> Completion {
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

        let controls = ctx.controls_mut();
        controls.force = 0.0;

        if distance(target.position, me.position) < self.distance {
            controls.force = 1.0;
            controls.angle = angle_between(target.position, me.position);
        } else {
            controls.release();
            self.core.resolve();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Controls, Team};
    use crate::tests::helpers::{routine_context, scene_with};
    use glam::Vec2;
    use std::f32::consts::PI;

    #[test]
    fn moves_away_while_close() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(100.0, 0.0)),
        ]);
        let mut controls = Controls::default();
        let mut retreat = RetreatRoutine::new();
        let completion = routine_context(&scene, ids[0], &mut controls, |ctx| {
            let completion = retreat.start(ctx);
            retreat.cycle(ctx);
            completion
        });
        assert_eq!(controls.force, 1.0);
        assert!((controls.angle.abs() - PI).abs() < 1e-6);
        assert!(completion.is_pending());
    }

    #[test]
    fn resolves_once_far_enough() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(250.0, 0.0)),
        ]);
        let mut controls = Controls {
            force: 1.0,
            ..Controls::default()
        };
        let mut retreat = RetreatRoutine::new();
        let completion = routine_context(&scene, ids[0], &mut controls, |ctx| {
            let completion = retreat.start(ctx);
            retreat.cycle(ctx);
            completion
        });
        assert_eq!(controls.force, 0.0);
        assert!(completion.is_resolved());
    }

    #[test]
    fn resolving_lets_go_of_held_inputs() {
        let (scene, ids) = scene_with(&[
            (Team::Enemy, Vec2::ZERO),
            (Team::Player, Vec2::new(250.0, 0.0)),
        ]);
        let mut controls = Controls {
            force: 1.0,
            shield: true,
            attack: true,
            aim: Vec2::new(250.0, 0.0),
            ..Controls::default()
        };
        let mut retreat = RetreatRoutine::new();
        routine_context(&scene, ids[0], &mut controls, |ctx| {
            retreat.start(ctx);
            retreat.cycle(ctx);
        });
        assert!(!controls.shield && !controls.attack);
        assert_eq!(controls.aim, Vec2::new(250.0, 0.0));
    }
}
