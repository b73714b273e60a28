//! Avalon characters and the special-character rule set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::core::error::{Error, Result};
use crate::core::rng::GameRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Good,
    Evil,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Team::Good => "Team Good",
            Team::Evil => "Team Evil",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Character {
    VanillaGood,
    VanillaEvil,
    Merlin,
    Assassin,
    Percival,
    Morgana,
    Mordred,
    Oberon,
    Mordroberon,
}

impl Character {
    pub const ALL: [Character; 9] = [
        Character::VanillaGood,
        Character::VanillaEvil,
        Character::Merlin,
        Character::Assassin,
        Character::Percival,
        Character::Morgana,
        Character::Mordred,
        Character::Oberon,
        Character::Mordroberon,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Character::VanillaGood => "Vanilla Good",
            Character::VanillaEvil => "Vanilla Evil",
            Character::Merlin => "Merlin",
            Character::Assassin => "Assassin",
            Character::Percival => "Percival",
            Character::Morgana => "Morgana",
            Character::Mordred => "Mordred",
            Character::Oberon => "Oberon",
            Character::Mordroberon => "Mordroberon",
        }
    }

    #[must_use]
    pub fn team(self) -> Team {
        match self {
            Character::VanillaGood | Character::Merlin | Character::Percival => Team::Good,
            _ => Team::Evil,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Character::VanillaGood => "Loyal Servant of Arthur (Team Good)",
            Character::VanillaEvil => "Minion of Mordred (Team Evil)",
            Character::Merlin => "Knows Evil",
            Character::Assassin => "Attempts to Assassinate Merlin",
            Character::Percival => "Knows Merlin",
            Character::Morgana => "Appears as Merlin to Percival",
            Character::Mordred => "Unknown to Merlin",
            Character::Oberon => "Unknown to Evil",
            Character::Mordroberon => "Unknown to Merlin or Evil",
        }
    }

    /// Vanilla characters fill the teams and cannot be added as rules.
    #[must_use]
    pub fn is_special(self) -> bool {
        !matches!(self, Character::VanillaGood | Character::VanillaEvil)
    }

    /// Characters added along with this one.
    #[must_use]
    pub fn requires(self) -> &'static [Character] {
        use Character::*;
        match self {
            Merlin => &[Assassin],
            Assassin => &[Merlin],
            Percival => &[Merlin, Assassin],
            Morgana => &[Merlin, Assassin, Percival],
            Mordred | Oberon | Mordroberon => &[Merlin, Assassin],
            VanillaGood | VanillaEvil => &[],
        }
    }

    /// Characters removed when this one is added.
    #[must_use]
    pub fn prohibits(self) -> &'static [Character] {
        use Character::*;
        match self {
            Mordred | Oberon => &[Mordroberon],
            Mordroberon => &[Mordred, Oberon],
            _ => &[],
        }
    }

    /// Characters removed along with this one.
    #[must_use]
    pub fn required_by(self) -> &'static [Character] {
        use Character::*;
        match self {
            Merlin => &[Assassin, Percival, Morgana, Mordred, Oberon, Mordroberon],
            Assassin => &[Merlin, Percival, Morgana, Mordred, Oberon, Mordroberon],
            Percival => &[Morgana],
            _ => &[],
        }
    }

    #[must_use]
    pub fn hidden_from_merlin(self) -> bool {
        matches!(self, Character::Mordred | Character::Mordroberon)
    }

    #[must_use]
    pub fn hidden_from_evil(self) -> bool {
        matches!(self, Character::Oberon | Character::Mordroberon)
    }

    /// Card art for the character. Vanilla characters have several.
    #[must_use]
    pub fn cards(self) -> &'static [&'static str] {
        match self {
            Character::VanillaGood => &[
                "avalon/characters/Servant1.jpg",
                "avalon/characters/Servant2.jpg",
                "avalon/characters/Servant3.jpg",
                "avalon/characters/Servant4.jpg",
                "avalon/characters/Servant5.jpg",
            ],
            Character::VanillaEvil => &[
                "avalon/characters/Minion1.jpg",
                "avalon/characters/Minion2.jpg",
                "avalon/characters/Minion3.jpg",
            ],
            Character::Merlin => &["avalon/characters/Merlin.jpg"],
            Character::Assassin => &["avalon/characters/Assassin.jpg"],
            Character::Percival => &["avalon/characters/Percival.jpg"],
            Character::Morgana => &["avalon/characters/Morgana.jpg"],
            Character::Mordred => &["avalon/characters/Mordred.jpg"],
            Character::Oberon => &["avalon/characters/Oberon.jpg"],
            Character::Mordroberon => &["avalon/characters/Mordroberon.jpg"],
        }
    }

    pub fn random_card(self, rng: &mut GameRng) -> &'static str {
        rng.choose(self.cards())
            .copied()
            .unwrap_or("avalon/characters/unknown.jpg")
    }

    /// Look a special character up by name, ignoring case.
    pub fn parse_special(text: &str) -> Option<Self> {
        Character::ALL
            .into_iter()
            .filter(|c| c.is_special())
            .find(|c| c.name().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn names(characters: &[Character]) -> String {
    characters.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
}

/// Special characters chosen for the next game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSet {
    chosen: BTreeSet<Character>,
}

impl CharacterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `character` plus whatever it requires, dropping what it prohibits.
    pub fn add(&mut self, character: Character) -> Result<Vec<String>> {
        if !character.is_special() {
            return Err(Error::illegal(format!("{character} is not a special character")));
        }
        if !self.chosen.insert(character) {
            return Err(Error::illegal(format!("{character} is already in the game!")));
        }
        let mut messages = vec![format!("Added {character} to the game.")];

        let to_add: Vec<_> = character
            .requires()
            .iter()
            .copied()
            .filter(|c| !self.chosen.contains(c))
            .collect();
        let to_remove: Vec<_> = character
            .prohibits()
            .iter()
            .copied()
            .filter(|c| self.chosen.contains(c))
            .collect();
        self.chosen.extend(to_add.iter().copied());
        for c in &to_remove {
            self.chosen.remove(c);
        }

        if !to_add.is_empty() {
            messages.push(format!(
                "Also added the following dependant characters: {}",
                names(&to_add)
            ));
        }
        if !to_remove.is_empty() {
            messages.push(format!(
                "Removed the following characters prohibited by {character}: {}",
                names(&to_remove)
            ));
        }
        Ok(messages)
    }

    /// Remove `character` and every character that requires it.
    pub fn remove(&mut self, character: Character) -> Result<Vec<String>> {
        if !self.chosen.remove(&character) {
            return Err(Error::illegal(format!("{character} is not in the game!")));
        }
        let mut messages = vec![format!("Removed {character} from the game")];
        let to_remove: Vec<_> = character
            .required_by()
            .iter()
            .copied()
            .filter(|c| self.chosen.contains(c))
            .collect();
        for c in &to_remove {
            self.chosen.remove(c);
        }
        if !to_remove.is_empty() {
            messages.push(format!(
                "Removed the following characters that require {character}: {}",
                names(&to_remove)
            ));
        }
        Ok(messages)
    }

    #[must_use]
    pub fn contains(&self, character: Character) -> bool {
        self.chosen.contains(&character)
    }

    pub fn iter(&self) -> impl Iterator<Item = Character> + '_ {
        self.chosen.iter().copied()
    }

    #[must_use]
    pub fn count(&self, team: Team) -> usize {
        self.chosen.iter().filter(|c| c.team() == team).count()
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_pulls_in_requirements() {
        let mut set = CharacterSet::new();
        let messages = set.add(Character::Morgana).unwrap();
        assert!(set.contains(Character::Merlin));
        assert!(set.contains(Character::Assassin));
        assert!(set.contains(Character::Percival));
        assert_eq!(messages.len(), 2);
        assert_eq!(set.count(Team::Evil), 2);
    }

    #[test]
    fn test_add_drops_prohibited() {
        let mut set = CharacterSet::new();
        set.add(Character::Mordred).unwrap();
        set.add(Character::Oberon).unwrap();
        let messages = set.add(Character::Mordroberon).unwrap();
        assert!(!set.contains(Character::Mordred));
        assert!(!set.contains(Character::Oberon));
        assert_eq!(
            messages.last().unwrap(),
            "Removed the following characters prohibited by Mordroberon: Mordred, Oberon"
        );
    }

    #[test]
    fn test_remove_cascades() {
        let mut set = CharacterSet::new();
        set.add(Character::Morgana).unwrap();
        set.remove(Character::Merlin).unwrap();
        assert_eq!(set.iter().count(), 0);
        assert_eq!(
            set.remove(Character::Merlin).unwrap_err().message(),
            "Merlin is not in the game!"
        );
    }

    #[test]
    fn test_duplicates_and_vanilla_rejected() {
        let mut set = CharacterSet::new();
        set.add(Character::Merlin).unwrap();
        assert!(set.add(Character::Merlin).is_err());
        assert!(set.add(Character::VanillaGood).is_err());
    }

    #[test]
    fn test_parse_special() {
        assert_eq!(Character::parse_special("merlin"), Some(Character::Merlin));
        assert_eq!(Character::parse_special("Vanilla Good"), None);
    }

    #[test]
    fn test_visibility() {
        assert!(Character::Mordred.hidden_from_merlin());
        assert!(!Character::Mordred.hidden_from_evil());
        assert!(Character::Mordroberon.hidden_from_merlin() && Character::Mordroberon.hidden_from_evil());
        assert_eq!(Character::Percival.team(), Team::Good);
    }
}
