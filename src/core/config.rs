//! Instance settings and per-game rule toggles.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::{Error, Result};

/// Settings a game instance is created with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Expose debug-only commands and allow one identity to run several players.
    pub debug: bool,

    /// Fixed shuffle seed. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Whether the transport can render images.
    /// When false, rich messages fall back to their text.
    pub use_images: bool,

    /// Override for every prompt timeout the game would pick.
    pub prompt_timeout: Option<Duration>,

    /// Override for every interrupt timeout the game would pick.
    pub interrupt_timeout: Option<Duration>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            debug: false,
            seed: None,
            use_images: true,
            prompt_timeout: None,
            interrupt_timeout: None,
        }
    }
}

impl GameSettings {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_images(mut self, use_images: bool) -> Self {
        self.use_images = use_images;
        self
    }

    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = Some(timeout);
        self
    }

    pub fn with_interrupt_timeout(mut self, timeout: Duration) -> Self {
        self.interrupt_timeout = Some(timeout);
        self
    }

    /// The prompt timeout to use given a game's own default.
    #[must_use]
    pub fn prompt_timeout_or(&self, default: Duration) -> Duration {
        self.prompt_timeout.unwrap_or(default)
    }

    /// The interrupt timeout to use given a game's own default.
    #[must_use]
    pub fn interrupt_timeout_or(&self, default: Duration) -> Duration {
        self.interrupt_timeout.unwrap_or(default)
    }
}

/// A named on/off rule a game exposes to its players.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionToggle {
    pub key: &'static str,
    pub description: &'static str,
    pub enable_message: &'static str,
    pub disable_message: &'static str,
    pub default: bool,
}

/// Current values of a game's [`OptionToggle`]s.
#[derive(Clone, Debug)]
pub struct Toggles {
    table: &'static [OptionToggle],
    values: FxHashMap<&'static str, bool>,
}

impl Toggles {
    /// All toggles at their defaults.
    #[must_use]
    pub fn new(table: &'static [OptionToggle]) -> Self {
        let values = table.iter().map(|t| (t.key, t.default)).collect();
        Self { table, values }
    }

    #[must_use]
    pub fn is_enabled(&self, key: &str) -> bool {
        self.values.get(key).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn knows(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Apply `"enable"` or `"disable"` to a toggle, answering with its message.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&'static str> {
        let toggle = self
            .table
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| Error::illegal(format!("option '{key}' not recognized")))?;
        let (enabled, message) = match value {
            "enable" => (true, toggle.enable_message),
            "disable" => (false, toggle.disable_message),
            other => {
                return Err(Error::illegal(format!(
                    "'{other}' not recognized. Use 'enable' or 'disable'"
                )))
            }
        };
        self.values.insert(toggle.key, enabled);
        Ok(message)
    }

    /// Restore every default.
    pub fn reset(&mut self) {
        *self = Self::new(self.table);
    }

    /// One line per toggle: `key | description | enabled`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.table
            .iter()
            .map(|t| format!("{} | {} | enabled: {}", t.key, t.description, self.is_enabled(t.key)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
