//! Combat event log.
//!
//! Every strike the [`CombatResolver`](super::CombatResolver) resolves leaves
//! one [`CombatEvent`], whiffs included. The log does not influence the
//! simulation; it exists for telemetry, replays and tests.

use serde::{Deserialize, Serialize};

use crate::character::CharacterId;

/// How a strike ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeOutcome {
    /// Nobody in reach.
    Miss,
    /// Absorbed by a shield.
    Block,
    /// Absorbed by a shield raised within the parry window.
    PerfectParry,
    /// Landed on an unshielded victim.
    Hit,
}

/// Record of one resolved strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    /// Scene age when the strike resolved.
    pub time: f32,
    /// Character that struck.
    pub attacker: CharacterId,
    /// Character that was struck, if any.
    pub victim: Option<CharacterId>,
    /// Outcome.
    pub outcome: StrikeOutcome,
    /// Strength relative to the attacker's strength.
    pub relative_strength: f32,
    /// Health removed from the victim.
    pub damage: f32,
    /// Distance the victim was knocked back.
    pub knockback: f32,
    /// Whether the victim died from this strike.
    pub victim_died: bool,
}

impl CombatEvent {
    /// A strike that found nobody.
    #[must_use]
    pub fn miss(time: f32, attacker: CharacterId, relative_strength: f32) -> Self {
        Self {
            time,
            attacker,
            victim: None,
            outcome: StrikeOutcome::Miss,
            relative_strength,
            damage: 0.0,
            knockback: 0.0,
            victim_died: false,
        }
    }
}

/// Ordered log of combat events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Drains and returns every recorded event.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
