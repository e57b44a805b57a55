//! Tuning configuration for characters, state timings and combat rules.
//!
//! All structs implement [`Default`] with the values the game ships with and
//! deserialize with `#[serde(default)]`, so a JSON document only needs to list
//! the fields it overrides.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json(r#"{ "seed": 7, "combat": { "parry_recoil": 25.0 } }"#)
//!     .unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.combat.parry_recoil, 25.0);
//! assert_eq!(config.combat.combo_timeout, 5.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Radii;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value that must be non-negative is negative or not a number.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value lies outside its allowed closed range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// =============================================================================
// Character Profile
// =============================================================================

/// Per-character physical and combat statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    /// Health a character spawns with, and the cap for its ledger.
    pub max_health: f32,
    /// Movement speed at full force and a speed ratio of 1.
    pub base_speed: f32,
    /// Melee reach ellipse.
    pub strike_radii: Radii,
    /// Lock-on assist ellipse used by lunges. Zero disables lock-on.
    pub magnet_radii: Radii,
    /// Minimum separation kept from other characters.
    pub collision_radius: f32,
    /// Damage and knockback dealt by a strike of relative strength 1.
    pub strength: f32,
    /// Multiplier applied to incoming strike damage.
    pub damage_taken_ratio: f32,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            base_speed: 200.0,
            strike_radii: Radii::new(80.0, 40.0),
            magnet_radii: Radii::ZERO,
            collision_radius: 30.0,
            strength: 100.0,
            damage_taken_ratio: 1.0,
        }
    }
}

impl CharacterProfile {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_health", self.max_health)?;
        non_negative("base_speed", self.base_speed)?;
        positive("strike_radii.x", self.strike_radii.x)?;
        positive("strike_radii.y", self.strike_radii.y)?;
        non_negative("magnet_radii.x", self.magnet_radii.x)?;
        non_negative("magnet_radii.y", self.magnet_radii.y)?;
        non_negative("collision_radius", self.collision_radius)?;
        non_negative("strength", self.strength)?;
        non_negative("damage_taken_ratio", self.damage_taken_ratio)?;
        Ok(())
    }
}

// =============================================================================
// State Machine Timings
// =============================================================================

/// Timings and costs that drive the character state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// How long the attack control must be held for a heavy strike.
    pub time_to_prepare_heavy_attack: f32,
    /// Relative strength of a strike released early.
    pub light_attack_strength: f32,
    /// Relative strength of a fully prepared strike.
    pub heavy_attack_strength: f32,
    /// Stamina spent on a light strike.
    pub light_attack_stamina_cost: f32,
    /// Stamina spent on a heavy strike.
    pub heavy_attack_stamina_cost: f32,
    /// Delay between releasing the attack and the blow landing.
    pub strike_delay: f32,
    /// Total time spent in the striking state.
    pub strike_duration: f32,
    /// Time spent dashing.
    pub dash_duration: f32,
    /// Distance covered by a dash.
    pub dash_distance: f32,
    /// Stamina spent per dash.
    pub dash_stamina_cost: f32,
    /// Length of the perfect-parry window at the start of a shield hold.
    pub perfect_parry_window: f32,
    /// Speed ratio while preparing an attack.
    pub prepare_speed_ratio: f32,
    /// Speed ratio while shielding.
    pub shield_speed_ratio: f32,
    /// Speed ratio while exhausted.
    pub exhausted_speed_ratio: f32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            time_to_prepare_heavy_attack: 1.0,
            light_attack_strength: 0.5,
            heavy_attack_strength: 1.0,
            light_attack_stamina_cost: 0.1,
            heavy_attack_stamina_cost: 0.2,
            strike_delay: 0.1,
            strike_duration: 0.2,
            dash_duration: 0.3,
            dash_distance: 150.0,
            dash_stamina_cost: 0.15,
            perfect_parry_window: 0.15,
            prepare_speed_ratio: 0.5,
            shield_speed_ratio: 0.5,
            exhausted_speed_ratio: 0.5,
        }
    }
}

impl StateConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("time_to_prepare_heavy_attack", self.time_to_prepare_heavy_attack)?;
        non_negative("light_attack_strength", self.light_attack_strength)?;
        non_negative("heavy_attack_strength", self.heavy_attack_strength)?;
        within("light_attack_stamina_cost", self.light_attack_stamina_cost, 0.0, 1.0)?;
        within("heavy_attack_stamina_cost", self.heavy_attack_stamina_cost, 0.0, 1.0)?;
        non_negative("strike_delay", self.strike_delay)?;
        positive("strike_duration", self.strike_duration)?;
        positive("dash_duration", self.dash_duration)?;
        non_negative("dash_distance", self.dash_distance)?;
        within("dash_stamina_cost", self.dash_stamina_cost, 0.0, 1.0)?;
        non_negative("perfect_parry_window", self.perfect_parry_window)?;
        non_negative("prepare_speed_ratio", self.prepare_speed_ratio)?;
        non_negative("shield_speed_ratio", self.shield_speed_ratio)?;
        non_negative("exhausted_speed_ratio", self.exhausted_speed_ratio)?;
        if self.strike_delay > self.strike_duration {
            return Err(ConfigError::OutOfRange {
                field: "strike_delay",
                value: self.strike_delay,
                min: 0.0,
                max: self.strike_duration,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Combat Rules
// =============================================================================

/// Parameters of the perfect-parry slow-motion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowMotionConfig {
    /// Scene speed ratio while the sequence runs.
    pub speed_ratio: f32,
    /// Camera zoom reached during the sequence.
    pub zoom: f32,
    /// Duration of each zoom transition.
    pub zoom_duration: f32,
    /// Hold time, multiplied by `speed_ratio` before being scheduled.
    pub hold: f32,
}

impl Default for SlowMotionConfig {
    fn default() -> Self {
        Self {
            speed_ratio: 0.1,
            zoom: 2.0,
            zoom_duration: 0.2,
            hold: 5.0,
        }
    }
}

/// Rules of the stamina economy and strike resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Time without stamina loss before passive regeneration starts.
    pub stamina_regen_delay: f32,
    /// Stamina regenerated per unit of time.
    pub stamina_regen_rate: f32,
    /// Time without combo change before the combo resets.
    pub combo_timeout: f32,
    /// Stamina lost by a blocking victim per unit of relative strength.
    pub block_stamina_factor: f32,
    /// Stamina lost per unit of damage, relative to max health.
    pub damage_stamina_factor: f32,
    /// Distance an attacker recoils when its strike is blocked.
    pub parry_recoil: f32,
    /// Duration of recoil and knockback dashes.
    pub knockback_duration: f32,
    /// Distance opponents are pushed back by a perfect parry.
    pub pushback_distance: f32,
    /// Duration of the perfect-parry pushback.
    pub pushback_duration: f32,
    /// Distance of a lunge that found no victim.
    pub lunge_fallback_distance: f32,
    /// Duration of a lunge.
    pub lunge_duration: f32,
    /// Stamina drained per unit of time while in water.
    pub water_stamina_drain: f32,
    /// Particles spawned by a hit.
    pub impact_particles: u32,
    /// Particles spawned when a character dies.
    pub poof_particles: u32,
    /// Perfect-parry slow motion.
    pub slow_motion: SlowMotionConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            stamina_regen_delay: 5.0,
            stamina_regen_rate: 0.3,
            combo_timeout: 5.0,
            block_stamina_factor: 0.2,
            damage_stamina_factor: 0.3,
            parry_recoil: 20.0,
            knockback_duration: 0.1,
            pushback_distance: 100.0,
            pushback_duration: 0.2,
            lunge_fallback_distance: 40.0,
            lunge_duration: 0.1,
            water_stamina_drain: 0.2,
            impact_particles: 20,
            poof_particles: 80,
            slow_motion: SlowMotionConfig::default(),
        }
    }
}

impl CombatConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("stamina_regen_delay", self.stamina_regen_delay)?;
        non_negative("stamina_regen_rate", self.stamina_regen_rate)?;
        non_negative("combo_timeout", self.combo_timeout)?;
        non_negative("block_stamina_factor", self.block_stamina_factor)?;
        non_negative("damage_stamina_factor", self.damage_stamina_factor)?;
        non_negative("parry_recoil", self.parry_recoil)?;
        positive("knockback_duration", self.knockback_duration)?;
        non_negative("pushback_distance", self.pushback_distance)?;
        positive("pushback_duration", self.pushback_duration)?;
        non_negative("lunge_fallback_distance", self.lunge_fallback_distance)?;
        positive("lunge_duration", self.lunge_duration)?;
        non_negative("water_stamina_drain", self.water_stamina_drain)?;
        within("slow_motion.speed_ratio", self.slow_motion.speed_ratio, 0.01, 1.0)?;
        positive("slow_motion.zoom", self.slow_motion.zoom)?;
        positive("slow_motion.zoom_duration", self.slow_motion.zoom_duration)?;
        non_negative("slow_motion.hold", self.slow_motion.hold)?;
        Ok(())
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Top-level configuration of a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the simulation RNG (AI burst sizes, effect scatter).
    pub seed: u64,
    /// Combat rules.
    pub combat: CombatConfig,
    /// State machine timings applied to spawned characters.
    pub state: StateConfig,
}

impl SimulationConfig {
    /// Creates the default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and a
    /// validation error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the combat rules and state timings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.state.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
