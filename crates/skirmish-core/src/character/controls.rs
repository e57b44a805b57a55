//! The control surface shared by AI routines, the state machine and physics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::angle_between;

/// Intent written by a controller and read by the state machine and physics.
///
/// Fields are public so players and routines can write them directly.
/// Physics only ever reads [`Controls::clamped_force`], which keeps the
/// effective force in `[0, 1]` whatever was written.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Controls {
    /// Movement intensity in `[0, 1]`.
    pub force: f32,
    /// Movement direction in radians.
    pub angle: f32,
    /// Shield held.
    pub shield: bool,
    /// Attack held.
    pub attack: bool,
    /// World point the character aims at.
    pub aim: Vec2,
    /// Dash requested.
    pub dash: bool,
}

impl Controls {
    /// Force clamped to `[0, 1]`. Non-finite values read as zero.
    #[must_use]
    pub fn clamped_force(&self) -> f32 {
        if self.force.is_finite() {
            self.force.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Angle from `origin` to the aim point.
    #[must_use]
    pub fn aim_angle(&self, origin: Vec2) -> f32 {
        angle_between(origin, self.aim)
    }

    /// Drops every held input, keeping the aim point.
    pub fn release(&mut self) {
        self.force = 0.0;
        self.shield = false;
        self.attack = false;
        self.dash = false;
    }
}
