//! Timed wait.

use super::{Completion, Routine, RoutineContext, RoutineCore, RoutineKind};
use crate::character::CharacterId;

/// Resolves once the character's age exceeds its start age plus `duration`.
/// Writes no controls.
#[derive(Debug)]
pub struct WaitRoutine {
    core: RoutineCore,
    duration: f32,
    end_time: f32,
}

impl WaitRoutine {
    /// Creates a wait of `duration` units of character age.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            core: RoutineCore::default(),
            duration,
            end_time: f32::INFINITY,
        }
    }

    /// Requested duration.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Character age after which the wait resolves.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.end_time
    }
}

impl Routine for WaitRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Wait
    }

    fn bind(&mut self, entity: CharacterId) {
        self.core.bind(entity);
    }

    fn start(&mut self, ctx: &mut RoutineContext<'_>) -> Completion {
        let completion = self.core.begin();
        match ctx.age() {
            Some(age) => self.end_time = age + self.duration,
            None => self.core.abandon(),
        }
        completion
    }

    fn cycle(&mut self, ctx: &mut RoutineContext<'_>) {
        let Some(age) = ctx.age() else {
            self.core.abandon();
            return;
        };
        if age > self.end_time {
            self.core.resolve();
        }
    }

    fn description(&self) -> String {
        format!("Wait({})", self.duration)
    }
}
