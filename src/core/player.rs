//! Players and the per-game player registry.
//!
//! ## Player
//!
//! A registered participant: the identity that owns them, a unique display
//! name, a mutable role set, and game-specific fields `F`.
//!
//! ## PlayerRegistry
//!
//! Insertion-ordered storage with O(1) lookup by name. Each game instance owns
//! exactly one registry.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::path::PathBuf;

use crate::core::error::{Error, Result};
use crate::core::identity::{Destination, Identity};
use crate::protocol::RichMessage;

/// A role name such as `"player"`, `"leader"` or `"current_player"`.
pub type Role = &'static str;

/// Role held implicitly by every identity, registered or not.
pub const USER: Role = "user";

/// Role given to every registered participant.
pub const PLAYER: Role = "player";

/// A registered participant.
#[derive(Clone, Debug)]
pub struct Player<F> {
    identity: Identity,
    name: String,
    roles: SmallVec<[Role; 4]>,
    /// Game-specific state (hand, coins, votes...).
    pub fields: F,
}

impl<F> Player<F> {
    /// Create a player. The name defaults to the identity token.
    pub fn new(identity: Identity, name: Option<String>, fields: F) -> Self {
        let name = name.unwrap_or_else(|| identity.as_str().to_owned());
        Self {
            identity,
            name,
            roles: SmallVec::new(),
            fields,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Add a role. Giving a role twice is a no-op.
    pub fn give_role(&mut self, role: Role) {
        if !self.has_role(role) {
            self.roles.push(role);
        }
    }

    /// Remove a role if held.
    pub fn remove_role(&mut self, role: Role) {
        self.roles.retain(|r| *r != role);
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// A private message to this player's identity.
    pub fn message(&self, text: impl Into<String>) -> RichMessage {
        RichMessage::text(text).to(Destination::Direct(self.identity.clone()))
    }

    /// A private message carrying an image and optional text.
    pub fn message_with_image(
        &self,
        text: impl Into<String>,
        image: impl Into<PathBuf>,
        send_both: bool,
    ) -> RichMessage {
        RichMessage::image(image)
            .with_text(text)
            .send_both(send_both)
            .to(Destination::Direct(self.identity.clone()))
    }
}

/// Insertion-ordered set of players keyed by display name.
#[derive(Clone, Debug)]
pub struct PlayerRegistry<F> {
    players: Vec<Player<F>>,
    by_name: FxHashMap<String, usize>,
}

impl<F> Default for PlayerRegistry<F> {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }
}

impl<F> PlayerRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player; names are unique within a registry.
    pub fn register(&mut self, player: Player<F>) -> Result<&mut Player<F>> {
        if self.by_name.contains_key(player.name()) {
            return Err(Error::illegal(format!(
                "Cannot register player with name '{}'. Name already registered",
                player.name()
            )));
        }
        let idx = self.players.len();
        self.by_name.insert(player.name().to_owned(), idx);
        self.players.push(player);
        Ok(&mut self.players[idx])
    }

    /// Remove a player by name, returning them if present.
    pub fn remove(&mut self, name: &str) -> Option<Player<F>> {
        let idx = self.by_name.remove(name)?;
        let player = self.players.remove(idx);
        for slot in self.by_name.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(player)
    }

    /// Drop every player.
    pub fn clear(&mut self) {
        self.players.clear();
        self.by_name.clear();
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Player<F>> {
        self.by_name
            .get(name)
            .map(|&idx| &self.players[idx])
            .ok_or_else(|| not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Player<F>> {
        match self.by_name.get(name) {
            Some(&idx) => Ok(&mut self.players[idx]),
            None => Err(not_found(name)),
        }
    }

    /// Players owned by an identity, in registration order.
    pub fn owned_by<'a>(&'a self, identity: &'a Identity) -> impl Iterator<Item = &'a Player<F>> + 'a {
        self.players.iter().filter(move |p| p.identity() == identity)
    }

    /// Players holding a role, in registration order.
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &Player<F>> + '_ {
        self.players.iter().filter(move |p| p.has_role(role))
    }

    /// The single player holding `role`.
    ///
    /// Zero or several holders is an invariant violation.
    pub fn sole_with_role(&self, role: Role) -> Result<&Player<F>> {
        let mut holders = self.with_role(role);
        match (holders.next(), holders.next()) {
            (Some(player), None) => Ok(player),
            (None, _) => Err(Error::game(format!("Somehow there's no {role}"))),
            (Some(_), Some(_)) => Err(Error::game(format!("Somehow there's more than one {role}"))),
        }
    }

    /// Strip `role` from every player.
    pub fn revoke_role(&mut self, role: Role) {
        for player in &mut self.players {
            player.remove_role(role);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player<F>> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player<F>> {
        self.players.iter_mut()
    }

    /// Display names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name().to_owned()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

fn not_found(name: &str) -> Error {
    Error::illegal(format!("Cannot find player in registry with name '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, name: &str) -> Player<u32> {
        Player::new(Identity::new(id), Some(name.to_owned()), 0)
    }

    #[test]
    fn test_name_defaults_to_identity() {
        let p: Player<()> = Player::new(Identity::new("u-7"), None, ());
        assert_eq!(p.name(), "u-7");
    }

    #[test]
    fn test_roles_are_a_set() {
        let mut p = player("a", "alice");
        p.give_role(PLAYER);
        p.give_role(PLAYER);
        p.give_role("leader");
        assert_eq!(p.roles(), &[PLAYER, "leader"]);

        p.remove_role(PLAYER);
        assert!(!p.has_role(PLAYER));
        assert!(p.has_role("leader"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut reg = PlayerRegistry::new();
        reg.register(player("a", "alice")).unwrap();
        let err = reg.register(player("b", "alice")).unwrap_err();
        assert_eq!(
            err,
            Error::illegal("Cannot register player with name 'alice'. Name already registered")
        );
    }

    #[test]
    fn test_remove_keeps_lookup_consistent() {
        let mut reg = PlayerRegistry::new();
        for (id, name) in [("a", "alice"), ("b", "bob"), ("c", "carol")] {
            reg.register(player(id, name)).unwrap();
        }

        assert!(reg.remove("alice").is_some());
        assert_eq!(reg.names(), vec!["bob", "carol"]);
        assert_eq!(reg.get("carol").unwrap().identity().as_str(), "c");
        assert!(reg.remove("alice").is_none());

        // The freed name can be registered again.
        reg.register(player("a", "alice")).unwrap();
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_missing_player_is_illegal_move() {
        let reg: PlayerRegistry<u32> = PlayerRegistry::new();
        let err = reg.get("ghost").unwrap_err();
        assert_eq!(err.message(), "Cannot find player in registry with name 'ghost'");
    }

    #[test]
    fn test_owned_by_and_sole_role() {
        let mut reg = PlayerRegistry::new();
        reg.register(player("a", "alice")).unwrap().give_role("leader");
        reg.register(player("a", "alt")).unwrap();
        reg.register(player("b", "bob")).unwrap();

        let owner = Identity::new("a");
        let owned: Vec<_> = reg.owned_by(&owner).map(Player::name).collect();
        assert_eq!(owned, vec!["alice", "alt"]);

        assert_eq!(reg.sole_with_role("leader").unwrap().name(), "alice");
        reg.get_mut("bob").unwrap().give_role("leader");
        assert!(reg.sole_with_role("leader").is_err());

        reg.revoke_role("leader");
        assert_eq!(
            reg.sole_with_role("leader").unwrap_err(),
            Error::game("Somehow there's no leader")
        );
    }

    #[test]
    fn test_private_message_targets_identity() {
        let p = player("a", "alice");
        let msg = p.message("your cards");
        assert_eq!(msg.destination, Some(Destination::Direct(Identity::new("a"))));
        assert_eq!(msg.text.as_deref(), Some("your cards"));
    }
}
