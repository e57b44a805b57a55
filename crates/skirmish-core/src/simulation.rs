//! Simulation module with the fixed pass-order tick.
//!
//! The `Simulation` struct owns the scene, the seeded random source and the
//! resolvers, and advances them through a fixed sequence of passes:
//!
//! 1. **TIME**: scale elapsed time by the scene speed ratio, age everything
//! 2. **STATE**: cycle every state machine, route actions to resolvers
//! 3. **CONTROL**: cycle every controller, write controls back
//! 4. **PHYSICS**: integrate movement, resolve collisions
//! 5. **LEDGER**: water drain, stamina regeneration, combo timeout, then
//!    every character out of health is slain
//! 6. **SCENE**: interpolators, delays, slow motion, effect expiry
//! 7. **CLEANUP**: drop characters removed during the tick
//!
//! # Determinism
//!
//! Every pass walks characters in id order and every random draw comes from
//! one `ChaCha8Rng` seeded from the configuration, so two simulations built
//! from the same configuration and fed the same inputs stay identical.
//!
//! # Example
//!
//! ```
//! use skirmish_core::ai::Controller;
//! use skirmish_core::character::Team;
//! use skirmish_core::config::CharacterProfile;
//! use skirmish_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(42);
//! let hero = sim
//!     .spawn(Team::Player, Vec2::ZERO, CharacterProfile::default(), Controller::idle())
//!     .unwrap();
//! sim
//!     .spawn(Team::Enemy, Vec2::new(400.0, 0.0), CharacterProfile::default(), Controller::enemy())
//!     .unwrap();
//!
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(sim.scene().get(hero).is_some());
//! ```

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::ai::{Controller, RoutineContext};
use crate::character::{CharacterId, Team};
use crate::config::{CharacterProfile, ConfigError, SimulationConfig};
use crate::resolver::{dispatch, CombatEvent, CombatResolver, PhysicsResolver, ResolveContext};
use crate::scene::Scene;
use crate::state::ActionEnvelope;

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator.
#[derive(Debug)]
pub struct Simulation {
    scene: Scene,
    rng: ChaCha8Rng,
    physics: PhysicsResolver,
    combat: CombatResolver,
    config: SimulationConfig,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation with default tuning and the given seed.
    ///
    /// ```
    /// use skirmish_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(12345);
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(SimulationConfig::with_seed(seed))
    }

    /// Creates a simulation from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of `config`.
    pub fn with_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        Self {
            scene: Scene::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            physics: PhysicsResolver::new(config.combat),
            combat: CombatResolver::new(config.combat),
            config,
            tick: 0,
        }
    }

    /// Spawns a character and starts its controller.
    ///
    /// # Errors
    ///
    /// Returns the validation failure of `profile`; nothing is spawned.
    pub fn spawn(
        &mut self,
        team: Team,
        position: Vec2,
        profile: CharacterProfile,
        controller: Controller,
    ) -> Result<CharacterId, ConfigError> {
        let id = self.scene.spawn(team, position, profile, self.config.state)?;
        self.set_controller(id, controller);
        Ok(id)
    }

    /// Replaces the controller of a character and starts the new one.
    ///
    /// The previous controller is dropped, which abandons whatever its
    /// routines were waiting on. Returns `false` if the character is gone.
    pub fn set_controller(&mut self, id: CharacterId, mut controller: Controller) -> bool {
        let Some(character) = self.scene.get_mut(id) else {
            return false;
        };
        if let Some(previous) = character.take_controller() {
            debug!(%id, routine = %previous.active(), "controller replaced");
        }
        let mut controls = character.controls;

        let mut ctx = RoutineContext::new(&self.scene, id, &mut controls, 0.0, &mut self.rng);
        controller.start(&mut ctx);

        if let Some(character) = self.scene.get_mut(id) {
            character.controls = controls;
            character.set_controller(controller);
        }
        true
    }

    /// Advances the simulation by `elapsed` real time.
    pub fn step(&mut self, elapsed: f32) {
        let scaled = elapsed * self.scene.speed_ratio();
        self.scene.advance_age(scaled);

        let envelopes = self.cycle_states(scaled);
        let mut ctx = ResolveContext::new(&mut self.scene, &mut self.rng);
        dispatch(&[&self.physics, &self.combat], &envelopes, &mut ctx);

        self.cycle_controllers(scaled);

        PhysicsResolver::integrate(&mut self.scene, scaled);

        for id in self.scene.character_ids() {
            if let Some(character) = self.scene.get_mut(id) {
                character.settle_ledger(scaled, &self.config.combat);
            }
        }
        let slain = self.scene.slay_fallen(&self.config.combat, &mut self.rng);

        self.scene.update(scaled);
        let removed = self.scene.flush_removals();

        self.tick += 1;
        trace!(tick = self.tick, scaled, slain, removed, "tick");
    }

    /// Runs `steps` ticks of `elapsed` each.
    pub fn run(&mut self, steps: u32, elapsed: f32) {
        for _ in 0..steps {
            self.step(elapsed);
        }
    }

    fn cycle_states(&mut self, elapsed: f32) -> Vec<ActionEnvelope> {
        let mut envelopes = Vec::new();
        for id in self.scene.character_ids() {
            let Some(character) = self.scene.get_mut(id) else {
                continue;
            };
            // A state machine emits at most two actions per tick.
            #[allow(clippy::cast_possible_truncation)]
            envelopes.extend(
                character
                    .cycle_state(elapsed)
                    .into_iter()
                    .enumerate()
                    .map(|(sequence, action)| ActionEnvelope::new(id, action, sequence as u32)),
            );
        }
        envelopes
    }

    fn cycle_controllers(&mut self, elapsed: f32) {
        for id in self.scene.character_ids() {
            let Some(character) = self.scene.get_mut(id) else {
                continue;
            };
            let Some(mut controller) = character.take_controller() else {
                continue;
            };
            let mut controls = character.controls;

            let mut ctx = RoutineContext::new(&self.scene, id, &mut controls, elapsed, &mut self.rng);
            controller.cycle(&mut ctx);

            if let Some(character) = self.scene.get_mut(id) {
                character.controls = controls;
                character.restore_controller(controller);
            }
        }
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably. Use for setup and scripted input between ticks.
    #[must_use]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Drains the combat events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        self.scene.take_events()
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed of the random source.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

// =============================================================================
// Tests
// =============================================================================
