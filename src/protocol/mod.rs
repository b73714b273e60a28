//! Collecting answers from players.
//!
//! Commands and continuations return an [`Outcome`]: plain output, or output
//! plus either a batch of [`Prompt`]s or a single [`Interrupt`]. The runner
//! presents requests through the transport, feeds player picks into the
//! collectors, and calls the continuation once everything resolved.
//!
//! ## Key Types
//!
//! - `Prompt` / `PromptCollector`: one player picks exactly `count` options
//! - `Interrupt` / `InterruptCollector`: any eligible player may answer
//! - `RichMessage`: text and/or image with an optional destination
//! - `Outcome` / `Flow`: a result and its classification

pub mod interrupt;
pub mod outcome;
pub mod output;
pub mod prompt;

pub use interrupt::{Eligible, Interrupt, InterruptCollector, InterruptRequest, InterruptResponse, InterruptResults};
pub use outcome::{Flow, Outcome, Reply};
pub use output::{MessageParts, Output, RichMessage};
pub use prompt::{Prompt, PromptCollector, PromptRequest, PromptResults};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Options picked by one player, in pick order.
pub type Selection<O> = SmallVec<[O; 4]>;

/// Shown in place of a request that expired.
pub const TIMEOUT_NOTICE: &str = "Timed out! Please manually make selection with game commands";

/// Identifier of a live prompt or interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) fn join_options<O: fmt::Display>(options: &[O]) -> String {
    options
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
