//! Health, stamina and combo bookkeeping for one character.
//!
//! Every mutation clamps: health stays in `[0, max_health]`, stamina in
//! `[0, 1]` and the combo counter never goes below zero. Timestamps are the
//! owning character's age at the time of the change.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;

/// Combo delta that resets the counter to zero whatever its value.
pub const COMBO_RESET: i32 = i32::MIN;

/// Timestamp used for "never happened" so fresh characters regenerate and
/// do not flash.
const LONG_AGO: f32 = -9.0;

/// Per-character numeric state with decay and regeneration rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    health: f32,
    max_health: f32,
    combo: u32,
    last_combo_change: f32,
    combo_reason: String,
    stamina: f32,
    last_stamina_loss: f32,
    last_damage: f32,
    damage_count: u32,
    parry_count: u32,
}

impl Ledger {
    /// Creates a full-health, full-stamina ledger.
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            combo: 0,
            last_combo_change: 0.0,
            combo_reason: String::new(),
            stamina: 1.0,
            last_stamina_loss: LONG_AGO,
            last_damage: LONG_AGO,
            damage_count: 0,
            parry_count: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health cap.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current combo counter.
    #[must_use]
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Uppercased reason of the last combo change.
    #[must_use]
    pub fn combo_reason(&self) -> &str {
        &self.combo_reason
    }

    /// Time of the last combo change.
    #[must_use]
    pub fn last_combo_change(&self) -> f32 {
        self.last_combo_change
    }

    /// Current stamina in `[0, 1]`.
    #[must_use]
    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Time of the last stamina loss.
    #[must_use]
    pub fn last_stamina_loss(&self) -> f32 {
        self.last_stamina_loss
    }

    /// Time of the last damage taken.
    #[must_use]
    pub fn last_damage(&self) -> f32 {
        self.last_damage
    }

    /// Number of times damage was taken, including at zero health.
    #[must_use]
    pub fn damage_count(&self) -> u32 {
        self.damage_count
    }

    /// Number of strikes blocked.
    #[must_use]
    pub fn parry_count(&self) -> u32 {
        self.parry_count
    }

    /// Returns `true` once health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Spends stamina and restarts the regeneration delay.
    pub fn lose_stamina(&mut self, amount: f32, now: f32) {
        self.stamina = (self.stamina - amount).clamp(0.0, 1.0);
        self.last_stamina_loss = now;
    }

    /// Refills stamina to 1.
    pub fn restore_stamina(&mut self) {
        self.stamina = 1.0;
    }

    /// Adds `delta` to the combo, clamped at zero, and records the reason.
    ///
    /// Pass [`COMBO_RESET`] to reset the counter.
    pub fn update_combo(&mut self, delta: i32, reason: &str, now: f32) {
        let combo = (i64::from(self.combo) + i64::from(delta)).max(0);
        self.combo = u32::try_from(combo).unwrap_or(u32::MAX);
        self.last_combo_change = now;
        self.combo_reason = reason.to_uppercase();
    }

    /// Resets the combo to zero with the given reason.
    pub fn reset_combo(&mut self, reason: &str, now: f32) {
        self.update_combo(COMBO_RESET, reason, now);
    }

    /// Counts a blocked strike.
    pub fn record_parry(&mut self) {
        self.parry_count = self.parry_count.saturating_add(1);
    }

    /// Applies damage and returns `true` if health is now zero.
    ///
    /// Unless `exhausted`, the hit also drains stamina in proportion to the
    /// share of max health it took. The combo is always reset.
    pub fn damage(&mut self, amount: f32, now: f32, exhausted: bool, config: &CombatConfig) -> bool {
        let amount = amount.max(0.0);
        self.health = (self.health - amount).max(0.0);
        self.last_damage = now;
        self.damage_count = self.damage_count.saturating_add(1);

        if !exhausted {
            self.lose_stamina(amount / self.max_health * config.damage_stamina_factor, now);
        }
        self.reset_combo("Ouch!", now);

        self.is_dead()
    }

    /// Applies the passive rules for one tick: stamina regeneration and
    /// combo timeout.
    pub fn settle(&mut self, elapsed: f32, now: f32, exhausted: bool, config: &CombatConfig) {
        if now - self.last_stamina_loss > config.stamina_regen_delay || exhausted {
            self.stamina = (self.stamina + elapsed * config.stamina_regen_rate).min(1.0);
        }

        if now - self.last_combo_change > config.combo_timeout {
            self.reset_combo("", now);
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(100.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
