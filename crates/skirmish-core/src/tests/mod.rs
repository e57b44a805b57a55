//! Test module for scenario and determinism tests.
//!
//! - **Scenario tests**: strikes, parries, AI bursts and deaths through the
//!   full simulation tick
//! - **Determinism tests**: same seed produces identical results
//! - **Helper functions**: utilities for test setup
//!
//! # Test Structure
//!
//! - `scenarios.rs`: end-to-end combat and AI scenarios
//! - `determinism.rs`: tests that verify deterministic execution
//! - `helpers.rs`: test setup utilities and factory functions

mod determinism;
pub mod helpers;
