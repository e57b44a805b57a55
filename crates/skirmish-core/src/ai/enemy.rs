//! The looping enemy behavior.
//!
//! An enemy repeats forever:
//!
//! 1. a burst of `n` × (light attack, wait 1), with `n` drawn per burst
//! 2. a retreat
//! 3. a wait of 2
//!
//! It keeps its aim on the target every tick, whichever child is current.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Completion, LightAttackRoutine, RetreatRoutine, Routine, RoutineContext, RoutineCore,
    RoutineKind, SignalState, WaitRoutine,
};
use crate::character::CharacterId;

/// How many attacks a burst contains.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstSize {
    /// Drawn uniformly from `min..=max` at the start of every burst.
    Random {
        /// Smallest burst.
        min: u32,
        /// Largest burst.
        max: u32,
    },
    /// Always the same size.
    Fixed(u32),
}

impl BurstSize {
    /// Draws a burst size. Never returns zero.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let size = match *self {
            Self::Random { min, max } => rng.gen_range(min.min(max)..=max.max(min)),
            Self::Fixed(size) => size,
        };
        size.max(1)
    }
}

impl Default for BurstSize {
    fn default() -> Self {
        Self::Random { min: 1, max: 3 }
    }
}

/// Position in the enemy loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum EnemyPhase {
    Attack { remaining: u32 },
    Pause { remaining: u32 },
    Retreat,
    Recover,
}

/// Looping enemy behavior composed of child routines.
#[derive(Debug)]
pub struct EnemyRoutine {
    core: RoutineCore,
    burst: BurstSize,
    pause: f32,
    recover: f32,
    phase: EnemyPhase,
    child: Option<Box<dyn Routine>>,
    child_completion: Option<Completion>,
    last_burst: Option<u32>,
    bursts: u32,
}

impl EnemyRoutine {
    /// Creates an enemy with bursts of 1 to 3 attacks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_burst(BurstSize::default())
    }

    /// Creates an enemy with the given burst size.
    #[must_use]
    pub fn with_burst(burst: BurstSize) -> Self {
        Self {
            core: RoutineCore::default(),
            burst,
            pause: 1.0,
            recover: 2.0,
            phase: EnemyPhase::Recover,
            child: None,
            child_completion: None,
            last_burst: None,
            bursts: 0,
        }
    }

    /// Size of the most recent burst.
    #[must_use]
    pub fn last_burst(&self) -> Option<u32> {
        self.last_burst
    }

    /// Number of bursts started so far.
    #[must_use]
    pub fn bursts(&self) -> u32 {
        self.bursts
    }

    fn begin_burst(&mut self, ctx: &mut RoutineContext<'_>) {
        let size = self.burst.draw(ctx.rng());
        self.last_burst = Some(size);
        self.bursts += 1;
        debug!(entity = %ctx.entity(), size, "enemy burst");
        self.launch(ctx, EnemyPhase::Attack { remaining: size });
    }

    fn advance(&mut self, ctx: &mut RoutineContext<'_>) {
        match self.phase {
            EnemyPhase::Attack { remaining } => self.launch(ctx, EnemyPhase::Pause { remaining }),
            EnemyPhase::Pause { remaining } if remaining > 1 => self.launch(
                ctx,
                EnemyPhase::Attack {
                    remaining: remaining - 1,
                },
            ),
            EnemyPhase::Pause { .. } => self.launch(ctx, EnemyPhase::Retreat),
            EnemyPhase::Retreat => self.launch(ctx, EnemyPhase::Recover),
            EnemyPhase::Recover => self.begin_burst(ctx),
        }
    }

    fn launch(&mut self, ctx: &mut RoutineContext<'_>, phase: EnemyPhase) {
        let mut child: Box<dyn Routine> = match phase {
            EnemyPhase::Attack { .. } => Box::new(LightAttackRoutine::new()),
            EnemyPhase::Pause { .. } => Box::new(WaitRoutine::new(self.pause)),
            EnemyPhase::Retreat => Box::new(RetreatRoutine::new()),
            EnemyPhase::Recover => Box::new(WaitRoutine::new(self.recover)),
        };
        child.bind(ctx.entity());
        let completion = child.start(ctx);
        debug!(entity = %ctx.entity(), routine = %child.kind(), "enemy phase");

        self.phase = phase;
        self.child = Some(child);
        self.child_completion = Some(completion);
    }
}

impl Default for EnemyRoutine {
    fn default() -> Self {
        Self::new()
    }
}

impl Routine for EnemyRoutine {
    fn kind(&self) -> RoutineKind {
        RoutineKind::Enemy
    }

    fn bind(&mut self, entity: CharacterId) {
        self.core.bind(entity);
    }

    fn start(&mut self, ctx: &mut RoutineContext<'_>) -> Completion {
        let completion = self.core.begin();
        if ctx.me().is_some() {
            self.begin_burst(ctx);
        } else {
            self.core.abandon();
        }
        completion
    }

    fn cycle(&mut self, ctx: &mut RoutineContext<'_>) {
        if ctx.me().is_none() {
            self.core.abandon();
            return;
        }
        if let Some(target) = ctx.target() {
            ctx.controls_mut().aim = target.position;
        }

        if let Some(child) = self.child.as_mut() {
            child.cycle(ctx);
        }

        let state = self
            .child_completion
            .as_ref()
            .map_or(SignalState::Resolved, Completion::state);
        match state {
            SignalState::Pending => {}
            SignalState::Resolved => self.advance(ctx),
            SignalState::Abandoned => self.core.abandon(),
        }
    }

    fn active(&self) -> RoutineKind {
        self.child.as_ref().map_or(RoutineKind::Enemy, |child| child.active())
    }

    fn description(&self) -> String {
        match &self.child {
            Some(child) => format!("Enemy > {}", child.description()),
            None => "Enemy".to_string(),
        }
    }
}
