//! Error type shared by the engine and every game.
//!
//! Two failure classes matter to players:
//!
//! - **IllegalMove**: the request was refused (wrong phase, wrong role, bad
//!   target, not enough coins, expired prompt). Game state is untouched.
//! - **Game**: an internal invariant broke. State is suspect and a reset is
//!   recommended.
//!
//! Anything else that escapes a command (a panic) is reported as
//! **Unclassified** by the runner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error. The `Display` form is the text shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Error {
    /// The request is not allowed right now.
    #[error("Illegal Move: {0}")]
    IllegalMove(String),

    /// An internal invariant was violated.
    #[error("Game Error: {0}")]
    Game(String),

    /// Failure that fits neither class, caught at the dispatch boundary.
    #[error("Unrecognized Exception: {0}")]
    Unclassified(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    IllegalMove,
    Game,
    Unclassified,
}

impl Error {
    /// Build an [`Error::IllegalMove`].
    pub fn illegal(message: impl Into<String>) -> Self {
        Self::IllegalMove(message.into())
    }

    /// Build an [`Error::Game`].
    pub fn game(message: impl Into<String>) -> Self {
        Self::Game(message.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalMove(_) => ErrorKind::IllegalMove,
            Self::Game(_) => ErrorKind::Game,
            Self::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    /// Machine-readable code for log records.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::IllegalMove(_) => "ILLEGAL_MOVE",
            Self::Game(_) => "GAME_ERROR",
            Self::Unclassified(_) => "UNCLASSIFIED",
        }
    }

    /// The message without its class prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::IllegalMove(m) | Self::Game(m) | Self::Unclassified(m) => m,
        }
    }

    /// Whether the game can keep going as if nothing happened.
    ///
    /// Only an illegal move leaves the state trustworthy.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IllegalMove(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::illegal("Action: fly not recognized").to_string(),
            "Illegal Move: Action: fly not recognized"
        );
        assert_eq!(
            Error::game("Somehow there's no current player").to_string(),
            "Game Error: Somehow there's no current player"
        );
        assert_eq!(
            Error::Unclassified("boom".into()).to_string(),
            "Unrecognized Exception: boom"
        );
    }

    #[test]
    fn test_kind_and_code() {
        let err = Error::illegal("nope");
        assert_eq!(err.kind(), ErrorKind::IllegalMove);
        assert_eq!(err.code(), "ILLEGAL_MOVE");
        assert!(err.is_recoverable());

        let err = Error::game("broken");
        assert_eq!(err.kind(), ErrorKind::Game);
        assert_eq!(err.message(), "broken");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_serde_roundtrip() {
        let err = Error::game("deck empty");
        let json = serde_json::to_string(&err).unwrap();
        let back: Error = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
