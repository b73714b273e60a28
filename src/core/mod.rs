//! Core engine types: errors, identities, players, phases, RNG, settings.
//!
//! Nothing here knows about a particular game. Games plug their own phase
//! enums, player fields and option tables into these types.

pub mod config;
pub mod error;
pub mod identity;
pub mod phase;
pub mod player;
pub mod rng;

pub use config::{GameSettings, OptionToggle, Toggles};
pub use error::{Error, ErrorKind, Result};
pub use identity::{Destination, Identity};
pub use phase::{Phase, TurnTracker};
pub use player::{Player, PlayerRegistry, Role, PLAYER, USER};
pub use rng::GameRng;
