//! Game trait and continuation registration.

pub mod engine;

pub use engine::{
    Continuation, ContinuationTable, ContinuationTableBuilder, Game, GameOutcome,
    InterruptHandler, PromptHandler,
};
