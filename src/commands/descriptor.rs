//! Declarative command permissions.

use serde::Serialize;

use crate::core::phase::Phase;
use crate::core::player::{Player, Role, USER};

/// Name, help text and the roles allowed to run a command in each phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandDescriptor<P> {
    name: &'static str,
    help: &'static str,
    grants: Vec<(Role, Vec<P>)>,
    requires_lock: bool,
    debug_only: bool,
}

impl<P: Phase> CommandDescriptor<P> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            help: "",
            grants: Vec::new(),
            requires_lock: false,
            debug_only: false,
        }
    }

    #[must_use]
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Let `role` run the command in `phases`.
    #[must_use]
    pub fn allow(mut self, role: Role, phases: &[P]) -> Self {
        match self.grants.iter_mut().find(|(r, _)| *r == role) {
            Some((_, existing)) => {
                for phase in phases {
                    if !existing.contains(phase) {
                        existing.push(*phase);
                    }
                }
            }
            None => self.grants.push((role, phases.to_vec())),
        }
        self
    }

    /// Let `role` run the command in every phase.
    #[must_use]
    pub fn allow_always(self, role: Role) -> Self {
        self.allow(role, P::ALL)
    }

    #[must_use]
    pub fn requires_lock(mut self) -> Self {
        self.requires_lock = true;
        self
    }

    #[must_use]
    pub fn debug_only(mut self) -> Self {
        self.debug_only = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn help_text(&self) -> &'static str {
        self.help
    }

    #[must_use]
    pub fn is_locking(&self) -> bool {
        self.requires_lock
    }

    #[must_use]
    pub fn is_debug_only(&self) -> bool {
        self.debug_only
    }

    /// Roles allowed to run the command in `phase`.
    #[must_use]
    pub fn permitted_roles(&self, phase: P) -> Vec<Role> {
        self.grants
            .iter()
            .filter(|(_, phases)| phases.contains(&phase))
            .map(|(role, _)| *role)
            .collect()
    }

    /// Whether anyone at all may run the command in `phase`.
    #[must_use]
    pub fn open_to_users(&self, phase: P) -> bool {
        self.permitted_roles(phase).contains(&USER)
    }

    /// Whether `player` may run the command in `phase`.
    #[must_use]
    pub fn has_permission<F>(&self, player: &Player<F>, phase: P) -> bool {
        self.permitted_roles(phase)
            .iter()
            .any(|role| *role == USER || player.has_role(*role))
    }

    /// Serializable view for help surfaces.
    #[must_use]
    pub fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            name: self.name,
            help: self.help,
            permissions: self
                .grants
                .iter()
                .map(|(role, phases)| (*role, phases.iter().map(ToString::to_string).collect()))
                .collect(),
            requires_lock: self.requires_lock,
            debug_only: self.debug_only,
        }
    }
}

/// A command as listed in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub help: &'static str,
    pub permissions: Vec<(Role, Vec<String>)>,
    pub requires_lock: bool,
    pub debug_only: bool,
}
