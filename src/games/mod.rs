//! Games built on the engine.
//!
//! - `coup`: bluffing with hidden influence cards, 3 to 6 players
//! - `avalon`: hidden teams voting on missions, 5 to 10 players
//! - `rps`: Rock Paper Scissors for two

pub mod avalon;
pub mod coup;
pub mod lobby;
pub mod rps;

pub use avalon::Avalon;
pub use coup::Coup;
pub use lobby::Lobby;
pub use rps::RockPaperScissors;
