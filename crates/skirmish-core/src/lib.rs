//! # Skirmish Core
//!
//! Real-time melee combat simulation core.
//!
//! This crate provides a deterministic, single-threaded simulation of
//! characters fighting with strikes, shields and dashes, driven either by
//! scripted controls or by cooperative AI routines.
//!
//! ## Architecture
//!
//! - **Characters**: position, controls, a stamina/combo/health ledger and a
//!   state machine that gates what they can do
//! - **Controllers**: AI routines that write a character's controls each tick
//!   and signal completion through single-use handles
//! - **Resolvers**: turn state-machine actions into scene mutations
//!   (physics for dashes and movement, combat for strikes)
//! - **Scene**: character storage in stable order, effects, interpolators and
//!   time dilation
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::ai::Controller;
//! use skirmish_core::character::Team;
//! use skirmish_core::config::CharacterProfile;
//! use skirmish_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(7);
//! let hero = sim
//!     .spawn(Team::Player, Vec2::ZERO, CharacterProfile::default(), Controller::idle())
//!     .unwrap();
//! sim
//!     .spawn(Team::Enemy, Vec2::new(300.0, 0.0), CharacterProfile::default(), Controller::enemy())
//!     .unwrap();
//!
//! sim.run(120, 1.0 / 60.0);
//! for event in sim.take_events() {
//!     println!("{event:?}");
//! }
//! assert!(sim.scene().get(hero).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ai;
pub mod character;
pub mod config;
pub mod effects;
pub mod geometry;
pub mod resolver;
pub mod scene;
pub mod simulation;
pub mod state;

#[cfg(test)]
mod tests;

pub use character::{Category, Character, CharacterId, Team};
pub use scene::Scene;
pub use simulation::Simulation;
