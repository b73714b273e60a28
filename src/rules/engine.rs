//! The trait every game implements, and its continuation table.
//!
//! A game is a plain state object. The runner reads its phase and registry to
//! authorize commands, then calls into it through two tables built once per
//! game type:
//!
//! - a [`CommandTable`] of player-facing commands
//! - a [`ContinuationTable`] mapping each continuation to the function that
//!   receives prompt or interrupt results

use rustc_hash::FxHashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::commands::CommandTable;
use crate::core::config::GameSettings;
use crate::core::error::{Error, Result};
use crate::core::phase::Phase;
use crate::core::player::PlayerRegistry;
use crate::protocol::{InterruptResults, Outcome, PromptResults};

/// Outcome type of game `G`.
pub type GameOutcome<G> = Outcome<<G as Game>::Choice, <G as Game>::Step>;

/// A closed set of continuations a game can suspend on.
pub trait Continuation: Copy + Eq + Hash + Debug + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
}

/// A game driven by the runner.
pub trait Game: Sized + 'static {
    type Phase: Phase;
    /// Options offered by prompts and interrupts.
    type Choice: Clone + Eq + Hash + Debug + Display;
    type Step: Continuation;
    /// Per-player state.
    type Fields;

    fn phase(&self) -> Self::Phase;

    fn settings(&self) -> &GameSettings;

    fn registry(&self) -> &PlayerRegistry<Self::Fields>;

    fn command_table() -> Result<CommandTable<Self>>;

    fn continuation_table() -> Result<ContinuationTable<Self>>;

    /// Tear down any in-progress game.
    fn kill(&mut self) {}

    fn debug(&self) -> bool {
        self.settings().debug
    }
}

pub type PromptHandler<G> = fn(&mut G, PromptResults<<G as Game>::Choice>) -> Result<GameOutcome<G>>;

pub type InterruptHandler<G> =
    fn(&mut G, InterruptResults<<G as Game>::Choice>) -> Result<GameOutcome<G>>;

enum Handler<G: Game> {
    Prompts(PromptHandler<G>),
    Interrupt(InterruptHandler<G>),
}

/// Continuation → handler, fixed when the game type is first used.
pub struct ContinuationTable<G: Game> {
    handlers: FxHashMap<G::Step, Handler<G>>,
}

impl<G: Game> ContinuationTable<G> {
    #[must_use]
    pub fn builder() -> ContinuationTableBuilder<G> {
        ContinuationTableBuilder {
            handlers: FxHashMap::default(),
            problems: Vec::new(),
        }
    }

    pub fn prompt_handler(&self, step: G::Step) -> Result<PromptHandler<G>> {
        match self.handlers.get(&step) {
            Some(Handler::Prompts(f)) => Ok(*f),
            Some(Handler::Interrupt(_)) => Err(Error::game(format!(
                "Continuation '{}' expects interrupt results, not prompt results",
                step.name()
            ))),
            None => Err(unregistered(step)),
        }
    }

    pub fn interrupt_handler(&self, step: G::Step) -> Result<InterruptHandler<G>> {
        match self.handlers.get(&step) {
            Some(Handler::Interrupt(f)) => Ok(*f),
            Some(Handler::Prompts(_)) => Err(Error::game(format!(
                "Continuation '{}' expects prompt results, not interrupt results",
                step.name()
            ))),
            None => Err(unregistered(step)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn unregistered<K: Continuation>(step: K) -> Error {
    Error::game(format!("Continuation '{}' is not registered", step.name()))
}

/// Collects handlers; [`build`](Self::build) rejects duplicates and gaps.
pub struct ContinuationTableBuilder<G: Game> {
    handlers: FxHashMap<G::Step, Handler<G>>,
    problems: Vec<String>,
}

impl<G: Game> ContinuationTableBuilder<G> {
    #[must_use]
    pub fn on_prompts(self, step: G::Step, handler: PromptHandler<G>) -> Self {
        self.register(step, Handler::Prompts(handler))
    }

    #[must_use]
    pub fn on_interrupt(self, step: G::Step, handler: InterruptHandler<G>) -> Self {
        self.register(step, Handler::Interrupt(handler))
    }

    fn register(mut self, step: G::Step, handler: Handler<G>) -> Self {
        if self.handlers.insert(step, handler).is_some() {
            self.problems
                .push(format!("continuation '{}' registered twice", step.name()));
        }
        self
    }

    pub fn build(mut self) -> Result<ContinuationTable<G>> {
        for step in G::Step::ALL {
            if !self.handlers.contains_key(step) {
                self.problems
                    .push(format!("continuation '{}' has no handler", step.name()));
            }
        }
        if !self.problems.is_empty() {
            return Err(Error::game(format!(
                "Invalid continuation table: {}",
                self.problems.join("; ")
            )));
        }
        Ok(ContinuationTable {
            handlers: self.handlers,
        })
    }
}
