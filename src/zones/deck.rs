//! A draw pile with a discard pile.
//!
//! Index 0 of each pile is its top card.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::rng::GameRng;

/// Which end of a pile to work from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckPosition {
    Top,
    Bottom,
}

/// Draw pile and discard pile of cards `T`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck<T> {
    cards: Vec<T>,
    discard: Vec<T>,
    /// Recycle the discard pile when a draw would otherwise fail.
    pub autoreshuffle: bool,
}

impl<T: Clone> Deck<T> {
    /// New deck holding `cards`, optionally shuffled.
    pub fn new(cards: Vec<T>, shuffle: Option<&mut GameRng>, autoreshuffle: bool) -> Self {
        let mut deck = Self {
            cards,
            discard: Vec::new(),
            autoreshuffle,
        };
        if let Some(rng) = shuffle {
            deck.shuffle(rng);
        }
        deck
    }

    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }

    /// Draw `count` cards from the top.
    pub fn draw(&mut self, count: usize, rng: &mut GameRng) -> Result<Vec<T>> {
        self.draw_from(count, DeckPosition::Top, rng)
    }

    /// Draw `count` cards from either end.
    pub fn draw_from(&mut self, count: usize, from: DeckPosition, rng: &mut GameRng) -> Result<Vec<T>> {
        if count > self.cards.len() {
            if self.autoreshuffle && count <= self.cards.len() + self.discard.len() {
                let mut recycled = std::mem::take(&mut self.discard);
                rng.shuffle(&mut recycled);
                self.cards.extend(recycled);
            } else {
                return Err(Error::game("Not enough cards to draw from deck"));
            }
        }
        let drawn = match from {
            DeckPosition::Top => self.cards.drain(..count).collect(),
            DeckPosition::Bottom => {
                let start = self.cards.len() - count;
                let mut bottom: Vec<T> = self.cards.drain(start..).collect();
                bottom.reverse();
                bottom
            }
        };
        Ok(drawn)
    }

    /// Draw `count` cards straight onto the discard pile, returning copies.
    pub fn mill(&mut self, count: usize, rng: &mut GameRng) -> Result<Vec<T>> {
        let milled = self.draw(count, rng)?;
        self.add_to_discard(milled.clone());
        Ok(milled)
    }

    /// Look at the top `count` cards without drawing them.
    pub fn peek(&self, count: usize) -> Result<&[T]> {
        self.cards
            .get(..count)
            .ok_or_else(|| Error::game("Not enough cards in deck"))
    }

    /// Put cards back on the deck, keeping their order.
    pub fn add_to_deck(&mut self, cards: Vec<T>, at: DeckPosition) {
        match at {
            DeckPosition::Top => {
                self.cards.splice(0..0, cards);
            }
            DeckPosition::Bottom => self.cards.extend(cards),
        }
    }

    /// Put cards on top of the discard pile.
    pub fn add_to_discard(&mut self, cards: Vec<T>) {
        self.discard.splice(0..0, cards);
    }

    #[must_use]
    pub fn cards(&self) -> &[T] {
        &self.cards
    }

    #[must_use]
    pub fn discard(&self) -> &[T] {
        &self.discard
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(autoreshuffle: bool) -> Deck<u32> {
        Deck::new(vec![1, 2, 3, 4, 5], None, autoreshuffle)
    }

    #[test]
    fn test_draw_top_and_bottom() {
        let mut rng = GameRng::seeded(0);
        let mut d = deck(false);
        assert_eq!(d.draw(2, &mut rng).unwrap(), vec![1, 2]);
        assert_eq!(d.draw_from(2, DeckPosition::Bottom, &mut rng).unwrap(), vec![5, 4]);
        assert_eq!(d.cards(), &[3]);
    }

    #[test]
    fn test_draw_too_many_fails() {
        let mut rng = GameRng::seeded(0);
        let mut d = deck(false);
        let err = d.draw(6, &mut rng).unwrap_err();
        assert_eq!(err, Error::game("Not enough cards to draw from deck"));
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn test_autoreshuffle_recycles_discard() {
        let mut rng = GameRng::seeded(0);
        let mut d = deck(true);
        d.mill(3, &mut rng).unwrap();
        assert_eq!(d.discard(), &[1, 2, 3]);

        let mut drawn = d.draw(4, &mut rng).unwrap();
        assert!(d.discard().is_empty());
        assert_eq!(d.len(), 1);
        drawn.extend_from_slice(d.cards());
        drawn.sort_unstable();
        assert_eq!(drawn, vec![1, 2, 3, 4, 5]);

        assert!(d.draw(2, &mut rng).is_err());
    }

    #[test]
    fn test_peek_and_add() {
        let mut d = deck(false);
        assert_eq!(d.peek(2).unwrap(), &[1, 2]);
        assert!(d.peek(9).is_err());

        d.add_to_deck(vec![8, 9], DeckPosition::Top);
        d.add_to_deck(vec![0], DeckPosition::Bottom);
        assert_eq!(d.cards(), &[8, 9, 1, 2, 3, 4, 5, 0]);

        d.add_to_discard(vec![7]);
        d.add_to_discard(vec![6]);
        assert_eq!(d.discard(), &[6, 7]);
    }

    #[test]
    fn test_new_shuffled_keeps_cards() {
        let mut rng = GameRng::seeded(5);
        let d = Deck::new((0..15).collect::<Vec<u32>>(), Some(&mut rng), false);
        let mut cards = d.cards().to_vec();
        cards.sort_unstable();
        assert_eq!(cards, (0..15).collect::<Vec<_>>());
    }
}
