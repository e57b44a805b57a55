//! Transient effects, interpolators and time dilation.
//!
//! Effects are descriptions only: labels, particles, block flashes and corpse
//! halves with a position and a lifetime. Drawing them is up to the caller.
//! [`Interpolator`]s animate a scalar of a character, an effect or the camera
//! and resolve a [`Signal`] when done. A [`SlowMotion`] sequence chains two
//! camera zooms around a hold while the scene runs slowed down.

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ai::{Completion, Signal};
use crate::character::CharacterId;
use crate::config::SlowMotionConfig;

/// Lifetime of a floating label.
pub const LABEL_DURATION: f32 = 1.0;
/// Lifetime of the regular block flash.
pub const SHIELD_BLOCK_DURATION: f32 = 0.3;
/// Lifetime of the perfect-parry flash.
pub const PERFECT_PARRY_DURATION: f32 = 0.5;
/// How long slain body halves stay on the ground.
pub const CORPSE_DURATION: f32 = 10.0;
/// Height of a character's chest above its feet, where hits and smoke land.
pub const CHEST_HEIGHT: f32 = 30.0;

/// Uniform sample in `[min, max)` for effect scatter.
pub(crate) fn between(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.gen::<f32>()
}

// =============================================================================
// Effects
// =============================================================================

/// Identifier of a spawned effect.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(u64);

impl EffectId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({})", self.0)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which half of a slain character a corpse piece is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorpseHalf {
    /// Head and torso.
    Upper,
    /// Legs.
    Lower,
}

/// What an effect shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EffectKind {
    /// Floating text.
    Label {
        /// Text shown.
        text: String,
    },
    /// A square particle moving linearly from its position to `to`.
    Particle {
        /// CSS color.
        color: &'static str,
        /// Size at birth and at death.
        size: (f32, f32),
        /// Final position.
        to: Vec2,
    },
    /// Regular block flash.
    ShieldBlock,
    /// Perfect parry flash.
    PerfectParry,
    /// One half of a slain character's body.
    Corpse {
        /// Which half.
        half: CorpseHalf,
    },
}

/// A spawned transient effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effect {
    kind: EffectKind,
    /// Position at birth (or as last set by an interpolator).
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    age: f32,
    duration: Option<f32>,
}

impl Effect {
    /// Creates an effect. `None` lives until removed.
    #[must_use]
    pub fn new(kind: EffectKind, position: Vec2, duration: Option<f32>) -> Self {
        Self {
            kind,
            position,
            rotation: 0.0,
            age: 0.0,
            duration,
        }
    }

    /// What the effect shows.
    #[must_use]
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Time since spawn.
    #[must_use]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Lifetime, if bounded.
    #[must_use]
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Share of the lifetime elapsed, in `[0, 1]`. Unbounded effects stay at 0.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.duration {
            Some(duration) if duration > 0.0 => (self.age / duration).min(1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Where the effect is now. Particles travel toward their end point.
    #[must_use]
    pub fn current_position(&self) -> Vec2 {
        match &self.kind {
            EffectKind::Particle { to, .. } => self.position.lerp(*to, self.progress()),
            _ => self.position,
        }
    }

    /// Returns `true` once the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.duration.is_some_and(|duration| self.age >= duration)
    }

    pub(crate) fn advance(&mut self, elapsed: f32) {
        self.age += elapsed;
    }
}

// =============================================================================
// Interpolation
// =============================================================================

/// Easing curve applied to interpolation progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Fast start, long settle.
    EaseOutQuint,
}

impl Easing {
    /// Maps progress in `[0, 1]` to eased progress.
    ///
    /// ```
    /// use skirmish_core::effects::Easing;
    ///
    /// assert_eq!(Easing::Linear.apply(0.25), 0.25);
    /// assert!(Easing::EaseOutQuint.apply(0.25) > 0.7);
    /// assert_eq!(Easing::EaseOutQuint.apply(1.0), 1.0);
    /// ```
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
        }
    }
}

/// Horizontal or vertical component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// x.
    X,
    /// y.
    Y,
}

/// The scalar an [`Interpolator`] drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationTarget {
    /// One coordinate of a character.
    CharacterPosition {
        /// Character moved.
        id: CharacterId,
        /// Coordinate.
        axis: Axis,
    },
    /// One coordinate of an effect.
    EffectPosition {
        /// Effect moved.
        id: EffectId,
        /// Coordinate.
        axis: Axis,
    },
    /// Rotation of an effect.
    EffectRotation(EffectId),
    /// Camera zoom.
    CameraZoom,
}

/// Animates one scalar from `from` to `to` over `duration`.
#[derive(Debug)]
pub struct Interpolator {
    target: InterpolationTarget,
    from: f32,
    to: f32,
    duration: f32,
    easing: Easing,
    age: f32,
    signal: Signal,
}

impl Interpolator {
    /// Creates an interpolator and the completion it resolves when done.
    #[must_use]
    pub fn new(
        target: InterpolationTarget,
        from: f32,
        to: f32,
        duration: f32,
        easing: Easing,
    ) -> (Self, Completion) {
        let (signal, completion) = Signal::pair();
        (
            Self {
                target,
                from,
                to,
                duration,
                easing,
                age: 0.0,
                signal,
            },
            completion,
        )
    }

    /// Driven scalar.
    #[must_use]
    pub fn target(&self) -> InterpolationTarget {
        self.target
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        let progress = if self.duration > 0.0 {
            self.age / self.duration
        } else {
            1.0
        };
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    /// Returns `true` once the full duration has elapsed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.age >= self.duration
    }

    /// Advances time and returns the new value.
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        self.age = (self.age + elapsed).min(self.duration.max(0.0));
        self.value()
    }

    /// Resolves the completion. Dropping an unfinished interpolator abandons it.
    pub fn finish(self) {
        self.signal.resolve();
    }
}

// =============================================================================
// Delays and Slow Motion
// =============================================================================

/// A pending scene delay.
#[derive(Debug)]
pub struct Delay {
    remaining: f32,
    signal: Signal,
}

impl Delay {
    /// Creates a delay and its completion.
    #[must_use]
    pub fn new(duration: f32) -> (Self, Completion) {
        let (signal, completion) = Signal::pair();
        (
            Self {
                remaining: duration,
                signal,
            },
            completion,
        )
    }

    /// Counts down; resolves and returns `true` once elapsed.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        self.remaining -= elapsed;
        if self.remaining <= 0.0 {
            self.signal.resolve();
            true
        } else {
            false
        }
    }
}

/// Step of a [`SlowMotion`] sequence.
#[derive(Debug, Clone)]
pub enum SlowMotionPhase {
    /// Zooming the camera in.
    ZoomIn(Completion),
    /// Holding while slowed down.
    Hold(Completion),
    /// Zooming the camera back out.
    ZoomOut(Completion),
    /// Speed restored.
    Done,
}

/// Perfect-parry time dilation: zoom in, hold, zoom out, restore speed.
#[derive(Debug, Clone)]
pub struct SlowMotion {
    config: SlowMotionConfig,
    phase: SlowMotionPhase,
}

impl SlowMotion {
    /// Creates a sequence whose zoom-in is tracked by `zoom_in`.
    #[must_use]
    pub fn new(config: SlowMotionConfig, zoom_in: Completion) -> Self {
        Self {
            config,
            phase: SlowMotionPhase::ZoomIn(zoom_in),
        }
    }

    /// Settings of the sequence.
    #[must_use]
    pub fn config(&self) -> &SlowMotionConfig {
        &self.config
    }

    /// Current step.
    #[must_use]
    pub fn phase(&self) -> &SlowMotionPhase {
        &self.phase
    }

    /// Returns `true` once speed is restored.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.phase, SlowMotionPhase::Done)
    }

    /// The completion gating the current step, if any.
    pub(crate) fn waiting_on(&self) -> Option<&Completion> {
        match &self.phase {
            SlowMotionPhase::ZoomIn(c) | SlowMotionPhase::Hold(c) | SlowMotionPhase::ZoomOut(c) => {
                Some(c)
            }
            SlowMotionPhase::Done => None,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: SlowMotionPhase) {
        self.phase = phase;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod effect_tests {
        use super::*;

        #[test]
        fn bounded_effects_expire() {
            let mut effect = Effect::new(EffectKind::ShieldBlock, Vec2::ZERO, Some(0.3));
            effect.advance(0.2);
            assert!(!effect.is_expired());
            effect.advance(0.2);
            assert!(effect.is_expired());
            assert_eq!(effect.progress(), 1.0);
        }

        #[test]
        fn unbounded_effects_persist() {
            let mut effect = Effect::new(
                EffectKind::Corpse {
                    half: CorpseHalf::Upper,
                },
                Vec2::ZERO,
                None,
            );
            effect.advance(100.0);
            assert!(!effect.is_expired());
        }

        #[test]
        fn particles_travel() {
            let mut particle = Effect::new(
                EffectKind::Particle {
                    color: "#900",
                    size: (1.0, 4.0),
                    to: Vec2::new(10.0, 0.0),
                },
                Vec2::ZERO,
                Some(1.0),
            );
            particle.advance(0.5);
            assert!((particle.current_position().x - 5.0).abs() < 1e-5);
        }
    }

    mod interpolator_tests {
        use super::*;

        #[test]
        fn linear_interpolation_reaches_target_and_resolves() {
            let (mut interpolator, completion) =
                Interpolator::new(InterpolationTarget::CameraZoom, 1.0, 2.0, 0.2, Easing::Linear);
            assert!((interpolator.advance(0.1) - 1.5).abs() < 1e-5);
            assert!(!interpolator.is_finished());
            assert!((interpolator.advance(0.5) - 2.0).abs() < 1e-6);
            assert!(interpolator.is_finished());
            interpolator.finish();
            assert!(completion.is_resolved());
        }

        #[test]
        fn zero_duration_jumps_to_target() {
            let (mut interpolator, _) =
                Interpolator::new(InterpolationTarget::CameraZoom, 0.0, 5.0, 0.0, Easing::Linear);
            assert_eq!(interpolator.advance(0.0), 5.0);
            assert!(interpolator.is_finished());
        }

        #[test]
        fn dropped_interpolator_is_abandoned() {
            let (interpolator, completion) =
                Interpolator::new(InterpolationTarget::CameraZoom, 0.0, 1.0, 1.0, Easing::Linear);
            drop(interpolator);
            assert!(completion.is_abandoned());
        }

        #[test]
        fn ease_out_quint_is_monotonic() {
            let mut previous = 0.0;
            for step in 1..=20 {
                let value = Easing::EaseOutQuint.apply(step as f32 / 20.0);
                assert!(value >= previous);
                previous = value;
            }
            assert_eq!(previous, 1.0);
        }
    }

    #[test]
    fn delay_resolves_after_duration() {
        let (mut delay, completion) = Delay::new(0.5);
        assert!(!delay.advance(0.3));
        assert!(completion.is_pending());
        assert!(delay.advance(0.3));
        assert!(completion.is_resolved());
    }
}
