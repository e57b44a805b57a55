//! The per-character state machine.
//!
//! The machine gates behavior without owning any physics. Each tick it reads
//! a [`StateInput`] snapshot (controls, stamina, health, age), performs at
//! most one transition and returns the [`StateAction`]s that transition
//! requested. Actions are wrapped in [`ActionEnvelope`]s and routed to the
//! resolvers by [`ActionKind`].
//!
//! # States
//!
//! | State           | Speed ratio | Flags                       | Leaves to                       |
//! |-----------------|-------------|-----------------------------|---------------------------------|
//! | `Idle`          | 1           |                             | any, from controls              |
//! | `Dashing`       | 0           |                             | `Idle` after the dash           |
//! | `AttackPrepare` | 0.5         |                             | `Striking` / `Shielding`        |
//! | `Striking`      | 0           |                             | `Idle` after the strike         |
//! | `Shielding`     | 0.5         | shielded (+ perfect parry)  | `Idle` on release               |
//! | `Exhausted`     | 0.5         | exhausted                   | `Idle` at full stamina          |
//! | `Dead`          | 0           |                             | terminal                        |
//!
//! # Example
//!
//! ```
//! use skirmish_core::character::Controls;
//! use skirmish_core::config::StateConfig;
//! use skirmish_core::state::{StateInput, StateMachine};
//!
//! let mut machine = StateMachine::new(StateConfig::default());
//! let input = StateInput {
//!     controls: Controls { shield: true, ..Controls::default() },
//!     stamina: 1.0,
//!     health: 100.0,
//!     now: 0.0,
//! };
//! machine.cycle(&input, 0.016);
//! assert!(machine.shielded());
//! assert!(machine.perfect_parry());
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::character::{CharacterId, Controls};
use crate::config::StateConfig;

// =============================================================================
// Flags and States
// =============================================================================

bitflags! {
    /// Derived facts about the current state, consumed by combat and the ledger.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StateFlags: u8 {
        /// Incoming strikes are blocked.
        const SHIELDED = 1;
        /// Incoming strikes are perfectly parried.
        const PERFECT_PARRY = 1 << 1;
        /// Stamina loss from damage is suppressed and regeneration is forced.
        const EXHAUSTED = 1 << 2;
    }
}

/// The discrete state of a character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CharacterState {
    /// Free to move and act.
    Idle,
    /// Dashing along a fixed angle.
    Dashing {
        /// Direction of the dash.
        angle: f32,
    },
    /// Holding the attack control.
    AttackPrepare {
        /// Character age when the attack started preparing.
        started_at: f32,
    },
    /// Swinging. The blow lands once, after the strike delay.
    Striking {
        /// Strength of the swing relative to the character's strength.
        relative_strength: f32,
        /// Whether the blow has landed already.
        struck: bool,
    },
    /// Holding the shield.
    Shielding,
    /// Out of stamina.
    Exhausted,
    /// Terminal.
    Dead,
}

impl CharacterState {
    /// Human-readable label for debug overlays.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Dashing { .. } => "Dashing",
            Self::AttackPrepare { .. } => "Preparing attack",
            Self::Striking { .. } => "Striking",
            Self::Shielding => "Shielding",
            Self::Exhausted => "Exhausted",
            Self::Dead => "Dead",
        }
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Routing key for [`StateAction`]s.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Displacements: dashes and lunges.
    Movement,
    /// Stamina spending.
    Stamina,
    /// Strike resolution.
    Strike,
}

/// A side effect requested by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StateAction {
    /// Dash along `angle`.
    Dash {
        /// Direction.
        angle: f32,
        /// Distance covered.
        distance: f32,
        /// Time taken.
        duration: f32,
    },
    /// Spend stamina.
    LoseStamina(f32),
    /// Close the gap toward the best victim in the lock-on ellipse.
    Lunge,
    /// Land a blow.
    Strike {
        /// Strength relative to the character's strength.
        relative_strength: f32,
    },
}

impl StateAction {
    /// Returns the routing key of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Dash { .. } | Self::Lunge => ActionKind::Movement,
            Self::LoseStamina(_) => ActionKind::Stamina,
            Self::Strike { .. } => ActionKind::Strike,
        }
    }
}

/// A [`StateAction`] tagged with the character that requested it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionEnvelope {
    source: CharacterId,
    action: StateAction,
    sequence: u32,
}

impl ActionEnvelope {
    /// Wraps an action.
    #[must_use]
    pub const fn new(source: CharacterId, action: StateAction, sequence: u32) -> Self {
        Self {
            source,
            action,
            sequence,
        }
    }

    /// Character whose state machine emitted the action.
    #[must_use]
    pub const fn source(&self) -> CharacterId {
        self.source
    }

    /// The action.
    #[must_use]
    pub const fn action(&self) -> &StateAction {
        &self.action
    }

    /// Position of the action within the tick's output of its source.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

// =============================================================================
// State Machine
// =============================================================================

/// Snapshot of the character facts the machine transitions on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInput {
    /// Controls as written by the controller.
    pub controls: Controls,
    /// Current stamina.
    pub stamina: f32,
    /// Current health.
    pub health: f32,
    /// Character age.
    pub now: f32,
}

/// A character's state machine. Exactly one state is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachine {
    state: CharacterState,
    age: f32,
    config: StateConfig,
}

impl StateMachine {
    /// Creates a machine in [`CharacterState::Idle`].
    #[must_use]
    pub fn new(config: StateConfig) -> Self {
        Self {
            state: CharacterState::Idle,
            age: 0.0,
            config,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    /// Time spent in the current state.
    #[must_use]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Timings this machine runs on.
    #[must_use]
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Label of the current state.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.state.label()
    }

    /// Multiplier on the character's base speed.
    #[must_use]
    pub fn speed_ratio(&self) -> f32 {
        match self.state {
            CharacterState::Idle => 1.0,
            CharacterState::AttackPrepare { .. } => self.config.prepare_speed_ratio,
            CharacterState::Shielding => self.config.shield_speed_ratio,
            CharacterState::Exhausted => self.config.exhausted_speed_ratio,
            CharacterState::Dashing { .. } | CharacterState::Striking { .. } | CharacterState::Dead => 0.0,
        }
    }

    /// Derived facts about the current state.
    #[must_use]
    pub fn flags(&self) -> StateFlags {
        match self.state {
            CharacterState::Shielding if self.age < self.config.perfect_parry_window => {
                StateFlags::SHIELDED | StateFlags::PERFECT_PARRY
            }
            CharacterState::Shielding => StateFlags::SHIELDED,
            CharacterState::Exhausted => StateFlags::EXHAUSTED,
            _ => StateFlags::empty(),
        }
    }

    /// Returns `true` while strikes are blocked.
    #[must_use]
    pub fn shielded(&self) -> bool {
        self.flags().contains(StateFlags::SHIELDED)
    }

    /// Returns `true` during the perfect-parry window of a shield hold.
    #[must_use]
    pub fn perfect_parry(&self) -> bool {
        self.flags().contains(StateFlags::PERFECT_PARRY)
    }

    /// Returns `true` while exhausted.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.flags().contains(StateFlags::EXHAUSTED)
    }

    /// Dash direction while dashing.
    #[must_use]
    pub fn dash_angle(&self) -> Option<f32> {
        match self.state {
            CharacterState::Dashing { angle } => Some(angle),
            _ => None,
        }
    }

    /// Character age at which the current attack started preparing.
    #[must_use]
    pub fn preparing_since(&self) -> Option<f32> {
        match self.state {
            CharacterState::AttackPrepare { started_at } => Some(started_at),
            _ => None,
        }
    }

    /// Returns `true` once dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state == CharacterState::Dead
    }

    /// Moves to [`CharacterState::Dead`].
    pub fn kill(&mut self) {
        self.enter(CharacterState::Dead);
    }

    /// Ages the current state and performs at most one transition.
    pub fn cycle(&mut self, input: &StateInput, elapsed: f32) -> Vec<StateAction> {
        self.age += elapsed;

        let mut actions = Vec::new();
        if self.is_dead() {
            return actions;
        }
        if input.health <= 0.0 {
            self.kill();
            return actions;
        }

        let controls = &input.controls;
        match self.state {
            CharacterState::Idle => {
                if input.stamina <= 0.0 {
                    self.enter(CharacterState::Exhausted);
                } else if controls.dash {
                    actions.push(StateAction::LoseStamina(self.config.dash_stamina_cost));
                    actions.push(StateAction::Dash {
                        angle: controls.angle,
                        distance: self.config.dash_distance,
                        duration: self.config.dash_duration,
                    });
                    self.enter(CharacterState::Dashing {
                        angle: controls.angle,
                    });
                } else if controls.shield {
                    self.enter(CharacterState::Shielding);
                } else if controls.attack {
                    self.enter(CharacterState::AttackPrepare {
                        started_at: input.now,
                    });
                }
            }
            CharacterState::Dashing { .. } => {
                if self.age >= self.config.dash_duration {
                    self.enter(CharacterState::Idle);
                }
            }
            CharacterState::AttackPrepare { started_at } => {
                if controls.shield {
                    self.enter(CharacterState::Shielding);
                } else if !controls.attack {
                    let heavy = input.now - started_at >= self.config.time_to_prepare_heavy_attack;
                    let (relative_strength, cost) = if heavy {
                        (
                            self.config.heavy_attack_strength,
                            self.config.heavy_attack_stamina_cost,
                        )
                    } else {
                        (
                            self.config.light_attack_strength,
                            self.config.light_attack_stamina_cost,
                        )
                    };
                    actions.push(StateAction::LoseStamina(cost));
                    actions.push(StateAction::Lunge);
                    self.enter(CharacterState::Striking {
                        relative_strength,
                        struck: false,
                    });
                }
            }
            CharacterState::Striking {
                relative_strength,
                struck,
            } => {
                if !struck && self.age >= self.config.strike_delay {
                    actions.push(StateAction::Strike { relative_strength });
                    self.state = CharacterState::Striking {
                        relative_strength,
                        struck: true,
                    };
                }
                if self.age >= self.config.strike_duration {
                    self.enter(CharacterState::Idle);
                }
            }
            CharacterState::Shielding => {
                if !controls.shield {
                    self.enter(CharacterState::Idle);
                }
            }
            CharacterState::Exhausted => {
                if input.stamina >= 1.0 {
                    self.enter(CharacterState::Idle);
                }
            }
            CharacterState::Dead => {}
        }

        actions
    }

    fn enter(&mut self, state: CharacterState) {
        trace!(from = self.state.label(), to = state.label(), "state transition");
        self.state = state;
        self.age = 0.0;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(StateConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
