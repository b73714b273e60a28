//! The per-game command lock.

use crate::core::error::{Error, Result};

/// Serializes commands that must not interleave.
///
/// Held from the moment an exclusive command starts until its whole
/// continuation chain has finished, successfully or not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandLock {
    holder: Option<&'static str>,
}

impl CommandLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `command`.
    pub fn acquire(&mut self, command: &'static str) -> Result<()> {
        if self.holder.is_some() {
            return Err(Error::illegal(format!(
                "Another command currently has the Game Lock. Cannot call '{command}'"
            )));
        }
        self.holder = Some(command);
        Ok(())
    }

    /// Release the lock, returning who held it.
    pub fn release(&mut self) -> Option<&'static str> {
        self.holder.take()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    #[must_use]
    pub fn holder(&self) -> Option<&'static str> {
        self.holder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_holder() {
        let mut lock = CommandLock::new();
        lock.acquire("start").unwrap();
        assert_eq!(lock.holder(), Some("start"));

        let err = lock.acquire("action").unwrap_err();
        assert_eq!(
            err.message(),
            "Another command currently has the Game Lock. Cannot call 'action'"
        );
        assert_eq!(lock.holder(), Some("start"));

        assert_eq!(lock.release(), Some("start"));
        assert!(!lock.is_held());
        lock.acquire("action").unwrap();
    }
}
