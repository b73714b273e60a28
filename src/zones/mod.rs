//! Card piles.
//!
//! - `Deck`: draw pile plus discard pile, with optional auto-reshuffle
//! - `DeckPosition`: which end of a pile to draw from or add to

pub mod deck;

pub use deck::{Deck, DeckPosition};
