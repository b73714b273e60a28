//! Court cards and the actions they enable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{Error, Result};

/// A character card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Card {
    Duke,
    Assassin,
    Ambassador,
    Captain,
    Contessa,
}

impl Card {
    pub const ALL: [Card; 5] = [
        Card::Duke,
        Card::Assassin,
        Card::Ambassador,
        Card::Captain,
        Card::Contessa,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Card::Duke => "duke",
            Card::Assassin => "assassin",
            Card::Ambassador => "ambassador",
            Card::Captain => "captain",
            Card::Contessa => "contessa",
        }
    }

    /// The action this card lets its holder claim.
    #[must_use]
    pub fn action(self) -> Option<CoupAction> {
        match self {
            Card::Duke => Some(CoupAction::Tax),
            Card::Assassin => Some(CoupAction::Assassinate),
            Card::Ambassador => Some(CoupAction::Exchange),
            Card::Captain => Some(CoupAction::Steal),
            Card::Contessa => None,
        }
    }

    /// What the card blocks, if anything.
    #[must_use]
    pub fn reaction(self) -> Option<&'static str> {
        match self {
            Card::Duke => Some("Blocks Foreign Aid"),
            Card::Ambassador | Card::Captain => Some("Blocks Steal"),
            Card::Contessa => Some("Blocks Assassination"),
            Card::Assassin => None,
        }
    }

    #[must_use]
    pub fn image(self) -> &'static str {
        match self {
            Card::Duke => "coup/duke.jpg",
            Card::Assassin => "coup/assassin.jpg",
            Card::Ambassador => "coup/ambassador.jpg",
            Card::Captain => "coup/captain.jpg",
            Card::Contessa => "coup/contessa.jpg",
        }
    }

    /// One cheat-sheet line.
    #[must_use]
    pub fn describe(self) -> String {
        let action = self
            .action()
            .map_or_else(|| "-".to_owned(), |a| format!("{}: {}", a.title(), a.effect()));
        format!("{} | {} | {}", self.name(), action, self.reaction().unwrap_or("-"))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let lower = text.to_ascii_lowercase();
        Card::ALL
            .into_iter()
            .find(|c| c.name() == lower)
            .ok_or_else(|| Error::illegal(format!("Card: {text} not recognized")))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something the current player can do on their turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoupAction {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Steal,
    Exchange,
}

impl CoupAction {
    pub const ALL: [CoupAction; 7] = [
        CoupAction::Income,
        CoupAction::ForeignAid,
        CoupAction::Coup,
        CoupAction::Tax,
        CoupAction::Assassinate,
        CoupAction::Steal,
        CoupAction::Exchange,
    ];

    /// Command spelling.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CoupAction::Income => "income",
            CoupAction::ForeignAid => "foreign_aid",
            CoupAction::Coup => "coup",
            CoupAction::Tax => "tax",
            CoupAction::Assassinate => "assassinate",
            CoupAction::Steal => "steal",
            CoupAction::Exchange => "exchange",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            CoupAction::Income => "Income",
            CoupAction::ForeignAid => "Foreign Aid",
            CoupAction::Coup => "Coup",
            CoupAction::Tax => "Tax",
            CoupAction::Assassinate => "Assassinate",
            CoupAction::Steal => "Steal",
            CoupAction::Exchange => "Exchange",
        }
    }

    #[must_use]
    pub fn effect(self) -> &'static str {
        match self {
            CoupAction::Income => "Take 1 coin",
            CoupAction::ForeignAid => "Take 2 coins",
            CoupAction::Coup => "Pay 7 coins: Choose a player to lose an influence",
            CoupAction::Tax => "Take 3 coins",
            CoupAction::Assassinate => "Pay 3 coins: Choose a player to lose an influence",
            CoupAction::Steal => "Take 2 coins from another player",
            CoupAction::Exchange => "Exchange cards with the Court Deck",
        }
    }

    #[must_use]
    pub fn needs_target(self) -> bool {
        matches!(self, CoupAction::Coup | CoupAction::Assassinate | CoupAction::Steal)
    }

    /// Coins paid to take the action.
    #[must_use]
    pub fn cost(self) -> u32 {
        match self {
            CoupAction::Coup => 7,
            CoupAction::Assassinate => 3,
            _ => 0,
        }
    }

    /// The character the actor claims to hold.
    #[must_use]
    pub fn claimed_card(self) -> Option<Card> {
        match self {
            CoupAction::Tax => Some(Card::Duke),
            CoupAction::Assassinate => Some(Card::Assassin),
            CoupAction::Steal => Some(Card::Captain),
            CoupAction::Exchange => Some(Card::Ambassador),
            _ => None,
        }
    }

    /// Cards that can block the action.
    #[must_use]
    pub fn blockers(self) -> &'static [Card] {
        match self {
            CoupAction::ForeignAid => &[Card::Duke],
            CoupAction::Steal => &[Card::Captain, Card::Ambassador],
            CoupAction::Assassinate => &[Card::Contessa],
            _ => &[],
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let lower = text.to_ascii_lowercase();
        CoupAction::ALL
            .into_iter()
            .find(|a| a.name() == lower)
            .ok_or_else(|| Error::illegal(format!("Action: {text} not recognized")))
    }
}

impl fmt::Display for CoupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cheat sheet shown by `check rules`.
#[must_use]
pub fn rules_sheet() -> String {
    let mut lines = vec!["card | action | reaction".to_owned()];
    lines.extend(Card::ALL.into_iter().map(Card::describe));
    for action in [CoupAction::Income, CoupAction::ForeignAid, CoupAction::Coup] {
        lines.push(format!("- | {}: {} | -", action.title(), action.effect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_round_trip_through_cards() {
        for action in CoupAction::ALL {
            if let Some(card) = action.claimed_card() {
                assert_eq!(card.action(), Some(action));
            }
        }
        assert_eq!(Card::Contessa.action(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Card::parse("Duke").unwrap(), Card::Duke);
        assert_eq!(CoupAction::parse("foreign_aid").unwrap(), CoupAction::ForeignAid);
        assert_eq!(
            CoupAction::parse("fly").unwrap_err().message(),
            "Action: fly not recognized"
        );
    }

    #[test]
    fn test_costs_and_targets() {
        assert_eq!(CoupAction::Coup.cost(), 7);
        assert_eq!(CoupAction::Assassinate.cost(), 3);
        assert!(CoupAction::Steal.needs_target());
        assert!(!CoupAction::Tax.needs_target());
        assert_eq!(CoupAction::Steal.blockers(), &[Card::Captain, Card::Ambassador]);
    }

    #[test]
    fn test_rules_sheet() {
        let sheet = rules_sheet();
        assert!(sheet.contains("duke | Tax: Take 3 coins | Blocks Foreign Aid"));
        assert!(sheet.contains("contessa | - | Blocks Assassination"));
        assert!(sheet.contains("Coup: Pay 7 coins"));
    }
}
