//! Single-resolution completion handles.
//!
//! A [`Signal`] is the writing half, owned by whoever will complete the work
//! (a routine, an interpolator, a delay). A [`Completion`] is the reading half
//! handed to whoever waits on it. The pair settles exactly once: either
//! `Resolved` by the owner or `Abandoned` when the owner gives up or is
//! dropped while still pending.
//!
//! ```
//! use skirmish_core::ai::{Signal, SignalState};
//!
//! let (signal, completion) = Signal::pair();
//! assert!(completion.is_pending());
//!
//! assert!(signal.resolve());
//! assert!(!signal.resolve());
//! assert_eq!(completion.state(), SignalState::Resolved);
//!
//! let (signal, completion) = Signal::pair();
//! drop(signal);
//! assert!(completion.is_abandoned());
//! ```

use std::cell::Cell;
use std::rc::Rc;

/// Settlement state shared by a [`Signal`] and its [`Completion`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalState {
    /// Not settled yet.
    Pending,
    /// The work completed.
    Resolved,
    /// The work will never complete.
    Abandoned,
}

/// Writing half of a completion pair.
#[derive(Debug)]
pub struct Signal {
    state: Rc<Cell<SignalState>>,
}

impl Signal {
    /// Creates a pending pair.
    #[must_use]
    pub fn pair() -> (Self, Completion) {
        let state = Rc::new(Cell::new(SignalState::Pending));
        (
            Self {
                state: Rc::clone(&state),
            },
            Completion { state },
        )
    }

    /// Resolves the pair. Returns `false` if it was already settled.
    pub fn resolve(&self) -> bool {
        self.settle(SignalState::Resolved)
    }

    /// Abandons the pair. Returns `false` if it was already settled.
    pub fn abandon(&self) -> bool {
        self.settle(SignalState::Abandoned)
    }

    /// Returns `true` until settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.get() == SignalState::Pending
    }

    fn settle(&self, outcome: SignalState) -> bool {
        if self.is_pending() {
            self.state.set(outcome);
            true
        } else {
            false
        }
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        self.abandon();
    }
}

/// Reading half of a completion pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Completion {
    state: Rc<Cell<SignalState>>,
}

impl Completion {
    /// A completion that is already resolved.
    #[must_use]
    pub fn resolved() -> Self {
        Self {
            state: Rc::new(Cell::new(SignalState::Resolved)),
        }
    }

    /// A completion that is already abandoned.
    #[must_use]
    pub fn abandoned() -> Self {
        Self {
            state: Rc::new(Cell::new(SignalState::Abandoned)),
        }
    }

    /// Current settlement state.
    #[must_use]
    pub fn state(&self) -> SignalState {
        self.state.get()
    }

    /// Returns `true` until settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == SignalState::Pending
    }

    /// Returns `true` once resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state() == SignalState::Resolved
    }

    /// Returns `true` once abandoned.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.state() == SignalState::Abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exactly_once() {
        let (signal, completion) = Signal::pair();
        assert!(signal.resolve());
        assert!(!signal.resolve());
        assert!(!signal.abandon());
        assert!(completion.is_resolved());
    }

    #[test]
    fn abandon_then_resolve_stays_abandoned() {
        let (signal, completion) = Signal::pair();
        assert!(signal.abandon());
        assert!(!signal.resolve());
        assert!(completion.is_abandoned());
    }

    #[test]
    fn dropping_a_resolved_signal_keeps_it_resolved() {
        let (signal, completion) = Signal::pair();
        signal.resolve();
        drop(signal);
        assert!(completion.is_resolved());
    }

    #[test]
    fn clones_observe_the_same_state() {
        let (signal, completion) = Signal::pair();
        let other = completion.clone();
        signal.resolve();
        assert!(other.is_resolved());
    }

    #[test]
    fn presettled_constructors() {
        assert!(Completion::resolved().is_resolved());
        assert!(Completion::abandoned().is_abandoned());
    }
}
