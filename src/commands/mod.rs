//! Role- and phase-gated commands.
//!
//! Each game registers its commands once through [`CommandTableBuilder`].
//! A command may run when a player owned by the caller holds one of the roles
//! allowed in the current phase, or when the universal `user` role is allowed.

pub mod descriptor;
pub mod table;

pub use descriptor::{CatalogEntry, CommandDescriptor};
pub use table::{Call, Command, CommandHandler, CommandTable, CommandTableBuilder};
