//! Turning transport events into game calls.
//!
//! - `GameRunner`: owns a game, authorizes and runs commands, drives prompts
//!   and interrupts to their continuations
//! - `CommandLock`: keeps exclusive commands from interleaving
//! - `Invocation` / `Response`: what goes in and what comes out

pub mod lock;
pub mod runner;

pub use lock::CommandLock;
pub use runner::{ClosedRequest, GameRunner, Invocation, LiveRequest, Response};
