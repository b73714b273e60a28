//! External chat identities and message destinations.
//!
//! The engine never interprets an identity beyond equality. The transport
//! decides what the token means (a user id, a handle, a test fixture).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque external identity of whoever issued a command.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Where a message should go.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// A shared channel, named by the transport.
    Channel(String),
    /// A private message to one identity.
    Direct(Identity),
}

impl Destination {
    #[must_use]
    pub fn channel(name: impl Into<String>) -> Self {
        Self::Channel(name.into())
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality_only() {
        let a = Identity::new("u-1");
        let b: Identity = "u-1".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "u-1");
        assert_ne!(a, Identity::new("u-2"));
    }

    #[test]
    fn test_destination_kind() {
        assert!(Destination::Direct(Identity::new("x")).is_direct());
        assert!(!Destination::channel("game").is_direct());
    }
}
