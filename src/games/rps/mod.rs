//! Rock Paper Scissors between two players.

pub mod commands;
pub mod game;

pub use game::{RockPaperScissors, RpsSeat};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::core::phase::Phase;
use crate::rules::{Continuation, GameOutcome};

pub const THROW_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpsPhase {
    PlayerSelect,
    Throw,
    Result,
}

impl fmt::Display for RpsPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RpsPhase::PlayerSelect => "player_select",
            RpsPhase::Throw => "throw",
            RpsPhase::Result => "result",
        })
    }
}

impl Phase for RpsPhase {
    const ALL: &'static [Self] = &[RpsPhase::PlayerSelect, RpsPhase::Throw, RpsPhase::Result];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    pub const ALL: [Throw; 3] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    fn rank(self) -> i8 {
        match self {
            Throw::Rock => 0,
            Throw::Paper => 1,
            Throw::Scissors => 2,
        }
    }

    /// Each throw beats the one ranked just below it, cyclically.
    #[must_use]
    pub fn beats(self, other: Throw) -> bool {
        (self.rank() - other.rank()).rem_euclid(3) == 1
    }

    pub fn parse(text: &str) -> Result<Self> {
        Throw::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(text))
            .ok_or_else(|| {
                Error::illegal(format!(
                    "Cannot Throw '{text}'. Throw 'Rock', 'Paper', or 'Scissors'"
                ))
            })
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Throw::Rock => "Rock",
            Throw::Paper => "Paper",
            Throw::Scissors => "Scissors",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpsStep {
    ThrowsMade,
}

impl Continuation for RpsStep {
    const ALL: &'static [Self] = &[RpsStep::ThrowsMade];

    fn name(self) -> &'static str {
        match self {
            RpsStep::ThrowsMade => "throws_made",
        }
    }
}

pub type RpsOutcome = GameOutcome<RockPaperScissors>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beats_is_cyclic() {
        assert!(Throw::Rock.beats(Throw::Scissors));
        assert!(Throw::Paper.beats(Throw::Rock));
        assert!(Throw::Scissors.beats(Throw::Paper));
        assert!(!Throw::Rock.beats(Throw::Paper));
        assert!(!Throw::Rock.beats(Throw::Rock));
    }

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!(Throw::parse("ROCK").unwrap(), Throw::Rock);
        assert_eq!(
            Throw::parse("lizard").unwrap_err().message(),
            "Cannot Throw 'lizard'. Throw 'Rock', 'Paper', or 'Scissors'"
        );
    }
}
