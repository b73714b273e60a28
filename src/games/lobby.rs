//! Seating shared by every game: join, kick, and which player an identity
//! is currently acting as.

use rustc_hash::FxHashMap;

use crate::core::error::{Error, Result};
use crate::core::identity::Identity;
use crate::core::player::{Player, PlayerRegistry, PLAYER};

/// Player names are ASCII letters and digits, stored lowercase.
pub fn normalize_name(name: &str) -> Result<String> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::illegal(format!(
            "Invalid player name '{name}'. Use only letters and numbers"
        )));
    }
    Ok(name.to_ascii_lowercase())
}

/// Which player each identity controls.
#[derive(Clone, Debug, Default)]
pub struct Lobby {
    controls: FxHashMap<Identity, String>,
}

impl Lobby {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new player for `identity`.
    ///
    /// Outside debug mode an identity may only own one player.
    pub fn join<F>(
        &mut self,
        registry: &mut PlayerRegistry<F>,
        identity: &Identity,
        name: &str,
        fields: F,
        debug: bool,
    ) -> Result<String> {
        let name = normalize_name(name)?;
        if !debug && registry.owned_by(identity).next().is_some() {
            return Err(Error::illegal(format!("{identity} already has a player in this game")));
        }
        let player = registry.register(Player::new(identity.clone(), Some(name.clone()), fields))?;
        player.give_role(PLAYER);
        self.controls.insert(identity.clone(), name.clone());
        Ok(format!("{identity} joined as {name}"))
    }

    /// Remove a player and forget any control over them.
    pub fn kick<F>(&mut self, registry: &mut PlayerRegistry<F>, name: &str) -> Result<Player<F>> {
        let player = registry
            .remove(name)
            .ok_or_else(|| Error::illegal(format!("{name} not found")))?;
        self.controls.retain(|_, controlled| controlled != name);
        Ok(player)
    }

    /// Switch `identity` to another player it owns.
    pub fn control<F>(&mut self, registry: &PlayerRegistry<F>, identity: &Identity, name: &str) -> Result<String> {
        let player = registry.get(name)?;
        if player.identity() != identity {
            return Err(Error::illegal(format!("{identity} does not own {name}")));
        }
        self.controls.insert(identity.clone(), name.to_owned());
        Ok(format!("{identity} now controls {name}"))
    }

    #[must_use]
    pub fn check_control(&self, identity: &Identity) -> String {
        match self.controls.get(identity) {
            Some(name) => format!("{identity} controls {name}"),
            None => format!("{identity} does not control a player"),
        }
    }

    /// Name of the player `identity` acts as.
    pub fn controlled<F>(&self, registry: &PlayerRegistry<F>, identity: &Identity) -> Result<String> {
        if let Some(name) = self.controls.get(identity) {
            if registry.contains(name) {
                return Ok(name.clone());
            }
        }
        registry
            .owned_by(identity)
            .next()
            .map(|p| p.name().to_owned())
            .ok_or_else(|| Error::illegal(format!("{identity} is not playing")))
    }

    pub fn clear(&mut self) {
        self.controls.clear();
    }
}
