//! Game phases and the turn-interrupt cache.
//!
//! Every game declares a closed set of phases. Some of them are *turn
//! states*: phases a turn can be suspended in while a sub-resolution (a
//! reveal, a lost influence) runs, and resumed afterwards.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::core::error::{Error, Result};

/// A game's phase enumeration.
pub trait Phase: Copy + Eq + Hash + Debug + Display + 'static {
    /// Every phase, in declaration order.
    const ALL: &'static [Self];

    /// Whether a turn can be suspended in this phase.
    fn is_turn_state(self) -> bool {
        false
    }
}

/// Live phase plus a single-slot cache of the suspended turn state.
///
/// Nesting is one level deep: interrupting from a phase that is not a turn
/// state keeps the cache as it is, so a sub-resolution started from another
/// sub-resolution still returns to the original turn state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnTracker<P: Phase> {
    state: P,
    turn_state: Option<P>,
}

impl<P: Phase> TurnTracker<P> {
    #[must_use]
    pub fn new(initial: P) -> Self {
        Self {
            state: initial,
            turn_state: None,
        }
    }

    /// The live phase.
    #[must_use]
    pub fn state(&self) -> P {
        self.state
    }

    /// The cached turn state, if any.
    #[must_use]
    pub fn turn_state(&self) -> Option<P> {
        self.turn_state
    }

    /// Jump to `state` and forget any cached turn state.
    pub fn reset(&mut self, state: P) {
        self.state = state;
        self.turn_state = None;
    }

    /// Move the turn forward to `next`, which must be a turn state.
    pub fn advance(&mut self, next: P) -> Result<()> {
        if !next.is_turn_state() {
            return Err(Error::game(format!(
                "Attempting to advance to an invalid 'turn_state': {next}"
            )));
        }
        self.state = next;
        self.turn_state = Some(next);
        Ok(())
    }

    /// Suspend the turn and enter `sub`.
    pub fn interrupt(&mut self, sub: P) {
        if self.state.is_turn_state() {
            self.turn_state = Some(self.state);
        }
        self.state = sub;
    }

    /// Leave the sub-resolution and restore the cached turn state.
    pub fn resume(&mut self) -> Result<()> {
        match self.turn_state {
            Some(turn_state) => {
                self.state = turn_state;
                Ok(())
            }
            None => Err(Error::game(format!(
                "Cannot return from '{}': no turn in progress",
                self.state
            ))),
        }
    }
}
