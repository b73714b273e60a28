//! Per-game command tables and authorization.

use rustc_hash::FxHashMap;

use crate::commands::descriptor::{CatalogEntry, CommandDescriptor};
use crate::core::error::{Error, Result};
use crate::core::identity::{Destination, Identity};
use crate::core::player::{Player, Role};
use crate::rules::{Game, GameOutcome};

/// Function run for a command.
pub type CommandHandler<G> = fn(&mut G, &Call<'_, G>) -> Result<GameOutcome<G>>;

/// Everything a command handler may want to know about its invocation.
pub struct Call<'a, G: Game> {
    pub identity: &'a Identity,
    /// Where the command was issued.
    pub channel: &'a Destination,
    pub args: &'a [String],
    pub commands: &'a CommandTable<G>,
}

impl<'a, G: Game> Call<'a, G> {
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    /// Argument `index`, or an illegal move naming what was expected.
    pub fn required(&self, index: usize, what: &str) -> Result<&'a str> {
        self.arg(index)
            .ok_or_else(|| Error::illegal(format!("Missing argument: {what}")))
    }
}

/// A registered command.
pub struct Command<G: Game> {
    pub descriptor: CommandDescriptor<G::Phase>,
    pub handler: CommandHandler<G>,
}

/// Immutable table of a game's commands.
pub struct CommandTable<G: Game> {
    commands: Vec<Command<G>>,
    by_name: FxHashMap<&'static str, usize>,
}

impl<G: Game> CommandTable<G> {
    #[must_use]
    pub fn builder() -> CommandTableBuilder<G> {
        CommandTableBuilder {
            commands: Vec::new(),
        }
    }

    /// Find a command visible in this debug mode.
    pub fn lookup(&self, name: &str, debug: bool) -> Result<&Command<G>> {
        self.by_name
            .get(name)
            .map(|&idx| &self.commands[idx])
            .filter(|cmd| debug || !cmd.descriptor.is_debug_only())
            .ok_or_else(|| Error::illegal(format!("Command '{name}' not recognized")))
    }

    /// Check that `identity` may run `name` in the game's current phase.
    pub fn authorize(&self, game: &G, identity: &Identity, name: &str) -> Result<&Command<G>> {
        let cmd = self.lookup(name, game.debug())?;
        let phase = game.phase();
        let allowed = cmd.descriptor.open_to_users(phase)
            || game
                .registry()
                .owned_by(identity)
                .any(|p| cmd.descriptor.has_permission(p, phase));
        if allowed {
            Ok(cmd)
        } else {
            Err(Error::illegal(format!(
                "Cannot call '{name}' from state: {phase}. Requires any of the following roles: {:?}",
                cmd.descriptor.permitted_roles(phase)
            )))
        }
    }

    /// Visible commands callable by someone in `phase`, with the roles that may call them.
    #[must_use]
    pub fn current_commands(&self, phase: G::Phase, debug: bool) -> Vec<(&CommandDescriptor<G::Phase>, Vec<Role>)> {
        self.visible(debug)
            .filter_map(|d| {
                let roles = d.permitted_roles(phase);
                (!roles.is_empty()).then_some((d, roles))
            })
            .collect()
    }

    /// Visible commands `player` may call in `phase`.
    #[must_use]
    pub fn player_current_commands(
        &self,
        player: &Player<G::Fields>,
        phase: G::Phase,
        debug: bool,
    ) -> Vec<&CommandDescriptor<G::Phase>> {
        self.visible(debug)
            .filter(|d| d.has_permission(player, phase))
            .collect()
    }

    /// One `name | help | roles` line per current command.
    #[must_use]
    pub fn describe_current(&self, phase: G::Phase, debug: bool) -> String {
        self.current_commands(phase, debug)
            .iter()
            .map(|(d, roles)| format!("{} | {} | {}", d.name(), d.help_text(), roles.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every visible command.
    #[must_use]
    pub fn catalog(&self, debug: bool) -> Vec<CatalogEntry> {
        self.visible(debug).map(CommandDescriptor::catalog_entry).collect()
    }

    fn visible(&self, debug: bool) -> impl Iterator<Item = &CommandDescriptor<G::Phase>> {
        self.commands
            .iter()
            .map(|c| &c.descriptor)
            .filter(move |d| debug || !d.is_debug_only())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Builder for a [`CommandTable`].
pub struct CommandTableBuilder<G: Game> {
    commands: Vec<Command<G>>,
}

impl<G: Game> CommandTableBuilder<G> {
    #[must_use]
    pub fn command(mut self, descriptor: CommandDescriptor<G::Phase>, handler: CommandHandler<G>) -> Self {
        self.commands.push(Command { descriptor, handler });
        self
    }

    /// Freeze the table. Duplicate names are rejected.
    pub fn build(self) -> Result<CommandTable<G>> {
        let mut by_name = FxHashMap::default();
        for (idx, cmd) in self.commands.iter().enumerate() {
            if by_name.insert(cmd.descriptor.name(), idx).is_some() {
                return Err(Error::game(format!(
                    "Command '{}' registered twice",
                    cmd.descriptor.name()
                )));
            }
        }
        Ok(CommandTable {
            commands: self.commands,
            by_name,
        })
    }
}
