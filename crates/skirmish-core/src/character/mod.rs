//! Characters: identity, teams and per-character simulation state.
//!
//! This module provides the core character types:
//! - [`CharacterId`]: unique, ordered identifier
//! - [`Team`] and [`Category`]: membership used for targeting and enumeration
//! - [`Controls`]: the intent surface written by controllers
//! - [`Ledger`]: health, stamina and combo bookkeeping
//! - [`Character`]: the complete entity
//!
//! # Example
//!
//! ```
//! use skirmish_core::character::{Character, CharacterId, Team};
//! use skirmish_core::config::{CharacterProfile, StateConfig};
//! use glam::Vec2;
//!
//! let enemy = Character::new(
//!     CharacterId::new(3),
//!     Team::Enemy,
//!     Vec2::new(10.0, 20.0),
//!     CharacterProfile::default(),
//!     StateConfig::default(),
//! );
//!
//! assert_eq!(enemy.target_team(), Team::Player);
//! assert_eq!(enemy.ledger().health(), 100.0);
//! assert_eq!(enemy.state_label(), "Idle");
//! ```

mod controls;
mod ledger;

pub use controls::Controls;
pub use ledger::{Ledger, COMBO_RESET};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ai::{Controller, RoutineKind};
use crate::config::{CharacterProfile, CombatConfig, StateConfig};
use crate::effects::EffectId;
use crate::geometry::{self, Radii};
use crate::state::{StateAction, StateInput, StateMachine};

/// How long a character flashes after taking damage.
pub const DAMAGE_FLASH_DURATION: f32 = 0.1;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for a character.
///
/// Ids are ordered by their numeric value, which fixes the enumeration order
/// of every category and therefore victim tie-breaks.
///
/// ```
/// use skirmish_core::character::CharacterId;
///
/// assert!(CharacterId::new(1) < CharacterId::new(2));
/// assert_eq!(format!("{:?}", CharacterId::new(7)), "CharacterId(7)");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(u64);

impl CharacterId {
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

impl fmt::Debug for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharacterId({})", self.0)
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CharacterId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<CharacterId> for u64 {
    fn from(id: CharacterId) -> Self {
        id.0
    }
}

/// Side a character fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The player and allies.
    Player,
    /// Hostile characters.
    Enemy,
}

impl Team {
    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// Tag used to enumerate live characters from the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Every character.
    Character,
    /// Members of one team.
    Team(Team),
}

impl Category {
    /// Returns `true` if a member of `team` belongs to this category.
    #[must_use]
    pub fn contains(self, team: Team) -> bool {
        match self {
            Self::Character => true,
            Self::Team(member) => member == team,
        }
    }
}

impl From<Team> for Category {
    fn from(team: Team) -> Self {
        Self::Team(team)
    }
}

// =============================================================================
// Character
// =============================================================================

/// A combatant.
///
/// Position, facing, controls and the water flag are public; everything with
/// an invariant goes through methods.
#[derive(Debug)]
pub struct Character {
    id: CharacterId,
    team: Team,
    target_team: Team,
    /// World position.
    pub position: Vec2,
    /// Horizontal facing, `1.0` or `-1.0`.
    pub facing: f32,
    /// Standing in water: stamina drains and animations slow down.
    pub in_water: bool,
    /// Intent surface written by the controller.
    pub controls: Controls,
    age: f32,
    ledger: Ledger,
    profile: CharacterProfile,
    state: StateMachine,
    controller: Option<Controller>,
    last_label: Option<EffectId>,
    removed: bool,
}

impl Character {
    /// Creates a character targeting the opposing team, with no controller.
    #[must_use]
    pub fn new(
        id: CharacterId,
        team: Team,
        position: Vec2,
        profile: CharacterProfile,
        state_config: StateConfig,
    ) -> Self {
        Self {
            id,
            team,
            target_team: team.opponent(),
            position,
            facing: 1.0,
            in_water: false,
            controls: Controls::default(),
            age: 0.0,
            ledger: Ledger::new(profile.max_health),
            profile,
            state: StateMachine::new(state_config),
            controller: None,
            last_label: None,
            removed: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Own team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Team this character attacks.
    #[must_use]
    pub const fn target_team(&self) -> Team {
        self.target_team
    }

    /// Time since spawn.
    #[must_use]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Physical and combat statistics.
    #[must_use]
    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    /// Health, stamina and combo.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable ledger access.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// The state machine.
    #[must_use]
    pub fn state(&self) -> &StateMachine {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut StateMachine {
        &mut self.state
    }

    /// Returns `true` once removed from the scene.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
    }

    pub(crate) fn last_label(&self) -> Option<EffectId> {
        self.last_label
    }

    pub(crate) fn set_last_label(&mut self, label: EffectId) {
        self.last_label = Some(label);
    }

    pub(crate) fn advance_age(&mut self, elapsed: f32) {
        self.age += elapsed;
    }

    // -------------------------------------------------------------------------
    // Ledger operations
    // -------------------------------------------------------------------------

    /// Spends stamina, clamped at zero, and restarts the regeneration delay.
    pub fn lose_stamina(&mut self, amount: f32) {
        self.ledger.lose_stamina(amount, self.age);
    }

    /// Adds `delta` to the combo. Pass [`COMBO_RESET`] to reset it.
    pub fn update_combo(&mut self, delta: i32, reason: &str) {
        self.ledger.update_combo(delta, reason, self.age);
    }

    /// Applies incoming damage scaled by the damage-taken ratio and returns
    /// the amount actually applied. Death is handled by [`Scene::damage`].
    ///
    /// [`Scene::damage`]: crate::scene::Scene::damage
    pub(crate) fn damage(&mut self, amount: f32, config: &CombatConfig) -> f32 {
        let amount = amount * self.profile.damage_taken_ratio;
        let exhausted = self.state.exhausted();
        self.ledger.damage(amount, self.age, exhausted, config);
        amount
    }

    /// Passive per-tick rules: water drain, stamina regeneration and combo
    /// timeout.
    pub fn settle_ledger(&mut self, elapsed: f32, config: &CombatConfig) {
        if self.in_water {
            self.lose_stamina(elapsed * config.water_stamina_drain);
        }
        let exhausted = self.state.exhausted();
        self.ledger.settle(elapsed, self.age, exhausted, config);
    }

    // -------------------------------------------------------------------------
    // State machine
    // -------------------------------------------------------------------------

    /// Runs the state machine for one tick and returns the requested actions.
    pub fn cycle_state(&mut self, elapsed: f32) -> Vec<StateAction> {
        let input = StateInput {
            controls: self.controls,
            stamina: self.ledger.stamina(),
            health: self.ledger.health(),
            now: self.age,
        };
        self.state.cycle(&input, elapsed)
    }

    /// Moves the state machine to `Dead`.
    pub fn kill(&mut self) {
        self.state.kill();
    }

    // -------------------------------------------------------------------------
    // Targeting
    // -------------------------------------------------------------------------

    /// Strikability of `victim` from this character's position and aim.
    /// Always zero for itself.
    #[must_use]
    pub fn strikability(&self, victim: &Character, radii: Radii, fov: f32) -> f32 {
        if victim.id == self.id {
            return 0.0;
        }
        geometry::strikability(self.position, self.controls.aim, victim.position, radii, fov)
    }

    /// Returns `true` if `target` is within ±90° of the aim and inside the
    /// radii box. Never true for itself.
    #[must_use]
    pub fn is_strikable(&self, target: &Character, radii: Radii) -> bool {
        target.id != self.id
            && geometry::is_strikable(self.position, self.controls.aim, target.position, radii)
    }

    /// Axis-aligned box test around this character.
    #[must_use]
    pub fn is_within_radii(&self, other: &Character, radii: Radii) -> bool {
        geometry::is_within_radii(self.position, other.position, radii)
    }

    // -------------------------------------------------------------------------
    // Controller
    // -------------------------------------------------------------------------

    /// Installs a controller, returning the previous one.
    ///
    /// The new controller starts on its next cycle. Dropping the returned
    /// controller abandons its routine tree.
    pub fn set_controller(&mut self, controller: Controller) -> Option<Controller> {
        self.controller.replace(controller)
    }

    /// Takes the controller out for a cycle.
    pub fn take_controller(&mut self) -> Option<Controller> {
        self.controller.take()
    }

    /// Puts a controller back after a cycle.
    pub fn restore_controller(&mut self, controller: Controller) {
        if self.controller.is_none() {
            self.controller = Some(controller);
        }
    }

    /// The installed controller.
    #[must_use]
    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    /// Kind of the leaf routine currently controlling this character.
    #[must_use]
    pub fn active_routine(&self) -> Option<RoutineKind> {
        self.controller.as_ref().map(Controller::active)
    }

    // -------------------------------------------------------------------------
    // Rendering hints
    // -------------------------------------------------------------------------

    /// Returns `true` shortly after taking damage.
    #[must_use]
    pub fn damage_flash(&self) -> bool {
        self.age - self.ledger.last_damage() < DAMAGE_FLASH_DURATION
    }

    /// Animation clock; runs at half speed in water.
    #[must_use]
    pub fn render_age(&self) -> f32 {
        if self.in_water {
            self.age * 0.5
        } else {
            self.age
        }
    }

    /// Label of the current state.
    #[must_use]
    pub fn state_label(&self) -> &'static str {
        self.state.label()
    }

    /// Lines for a debug overlay.
    #[must_use]
    pub fn debug_lines(&self) -> Vec<String> {
        let controller = self
            .controller
            .as_ref()
            .map_or_else(|| "none".to_string(), Controller::description);
        vec![
            format!("State: {}", self.state_label()),
            format!(
                "HP: {:.0}/{:.0}",
                self.ledger.health().floor(),
                self.ledger.max_health()
            ),
            format!("AI: {controller}"),
            format!("Speed: {}", self.profile.base_speed),
            format!("Strength: {}", self.profile.strength),
        ]
    }
}

// =============================================================================
// Tests
// =============================================================================
