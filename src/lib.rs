//! # party-engine
//!
//! An engine for turn-based party games played over a chat transport.
//!
//! ## Design Principles
//!
//! 1. **Gated Commands**: Every command declares which roles may call it in
//!    which phases. Authorization is checked before a handler runs.
//!
//! 2. **One Chain at a Time**: A command may open prompts or an interrupt;
//!    their continuation runs once every answer is in. Only one such chain is
//!    live per game, and a command lock serializes state-changing commands.
//!
//! 3. **Transport Agnostic**: The engine never talks to a chat service. It
//!    returns outputs and requests, and is fed invocations, picks and clock
//!    ticks by whoever hosts it.
//!
//! ## Modules
//!
//! - `core`: identities, players and roles, phases, settings, RNG, errors
//! - `zones`: the shuffled deck with a discard pile
//! - `protocol`: prompts, interrupts, outputs and outcomes
//! - `commands`: command descriptors and the permission table
//! - `rules`: the `Game` trait and continuation tables
//! - `dispatch`: the runner and the command lock
//! - `games`: Coup, Avalon, Rock Paper Scissors

pub mod commands;
pub mod core;
pub mod dispatch;
pub mod games;
pub mod protocol;
pub mod rules;
pub mod zones;

pub use crate::core::{
    Destination, Error, ErrorKind, GameRng, GameSettings, Identity, OptionToggle, Phase, Player,
    PlayerRegistry, Result, Role, Toggles, TurnTracker, PLAYER, USER,
};

pub use crate::zones::{Deck, DeckPosition};

pub use crate::protocol::{
    Interrupt, InterruptResults, Outcome, Output, Prompt, PromptResults, Reply, RichMessage,
    Selection,
};

pub use crate::commands::{Call, CommandDescriptor, CommandTable};

pub use crate::rules::{Continuation, ContinuationTable, Game, GameOutcome};

pub use crate::dispatch::{GameRunner, Invocation, Response};
