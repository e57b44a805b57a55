//! Geometry and scoring primitives shared by targeting, AI and physics.
//!
//! Everything here is a pure function of its arguments. Angles are radians,
//! measured with `atan2` in screen space (y grows downward, so positive angles
//! turn clockwise on screen).
//!
//! The central primitive is [`strikability`]: one scoring function used both
//! to decide who a melee swing connects with and to rank lock-on candidates.
//! Call sites only differ by the ellipse radii and field of view they pass.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Half-extents of an axis-aligned ellipse (or box, for [`is_within_radii`]).
///
/// # Example
///
/// ```
/// use skirmish_core::geometry::Radii;
///
/// let strike = Radii::new(80.0, 40.0);
/// assert!(!strike.is_degenerate());
/// assert!(Radii::ZERO.is_degenerate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Radii {
    /// Horizontal half-extent.
    pub x: f32,
    /// Vertical half-extent.
    pub y: f32,
}

impl Radii {
    /// Zero-extent radii; never reaches anything.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates radii from horizontal and vertical half-extents.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if either extent is zero, negative or not a number.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.x > 0.0 && self.y > 0.0)
    }
}

/// Angle of the vector pointing from `from` to `to`.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Wraps an angle into `(-π, π]`.
///
/// ```
/// use skirmish_core::geometry::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
/// ```
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped <= -PI {
        wrapped += TAU;
    } else if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Unit vector for an angle.
#[must_use]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Sign of `value` as a facing, defaulting to `1.0` on zero (and NaN).
#[must_use]
pub fn facing_sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Scores how well `victim` is positioned for a strike from `origin`.
///
/// The score averages two terms:
///
/// - an angular term `1 - |normalize(angle_to_victim - aim_angle)| / (fov / 2)`
/// - a distance term `1 - hypot(dx, dy * rx / ry) / rx`, i.e. the distance
///   inside the ellipse normalised so that its boundary scores 0
///
/// Returns exactly `0.0` when either term is negative, when a radius is zero
/// or when `fov` is not positive. Identity ("victim is self") is checked by
/// the caller, which knows entity ids.
///
/// # Example
///
/// ```
/// use skirmish_core::geometry::{strikability, Radii};
/// use glam::Vec2;
/// use std::f32::consts::PI;
///
/// let score = strikability(
///     Vec2::ZERO,
///     Vec2::new(10.0, 0.0),
///     Vec2::new(40.0, 0.0),
///     Radii::new(80.0, 40.0),
///     PI,
/// );
/// // Straight ahead (angle term 1) at half the reach (distance term 0.5).
/// assert!((score - 0.75).abs() < 1e-5);
/// ```
#[must_use]
pub fn strikability(origin: Vec2, aim: Vec2, victim: Vec2, radii: Radii, fov: f32) -> f32 {
    if radii.is_degenerate() || !(fov > 0.0) {
        return 0.0;
    }

    let angle_to_victim = angle_between(origin, victim);
    let aim_angle = angle_between(origin, aim);
    let angle_score = 1.0 - normalize_angle(angle_to_victim - aim_angle).abs() / (fov / 2.0);

    let dx = (origin.x - victim.x).abs();
    let adjusted_dy = (origin.y - victim.y).abs() / (radii.y / radii.x);
    let distance_score = 1.0 - dx.hypot(adjusted_dy) / radii.x;

    if distance_score < 0.0 || angle_score < 0.0 {
        return 0.0;
    }

    (distance_score + angle_score) / 2.0
}

/// Axis-aligned box test: both offsets strictly inside the radii.
#[must_use]
pub fn is_within_radii(origin: Vec2, other: Vec2, radii: Radii) -> bool {
    (other.x - origin.x).abs() < radii.x && (other.y - origin.y).abs() < radii.y
}

/// Returns `true` if `target` lies within ±90° of the aim direction and
/// inside the radii box.
#[must_use]
pub fn is_strikable(origin: Vec2, aim: Vec2, target: Vec2, radii: Radii) -> bool {
    let angle = angle_between(origin, target);
    let aim_angle = angle_between(origin, aim);
    if normalize_angle(aim_angle - angle).abs() > FRAC_PI_2 {
        return false;
    }
    is_within_radii(origin, target, radii)
}

/// Picks the best-scoring candidate.
///
/// Candidates with a non-positive score are discarded. A later candidate
/// replaces the current best only with a strictly greater score, so ties keep
/// the one encountered first.
///
/// ```
/// use skirmish_core::geometry::pick_best;
///
/// let best = pick_best([("a", 0.5), ("b", 0.5), ("c", 0.0)]);
/// assert_eq!(best, Some("a"));
/// ```
pub fn pick_best<T>(candidates: impl IntoIterator<Item = (T, f32)>) -> Option<T> {
    let mut best: Option<(T, f32)> = None;
    for (candidate, score) in candidates {
        if !(score > 0.0) {
            continue;
        }
        let replaces = best
            .as_ref()
            .map_or(true, |(_, best_score)| score > *best_score);
        if replaces {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

// =============================================================================
// Tests
// =============================================================================
