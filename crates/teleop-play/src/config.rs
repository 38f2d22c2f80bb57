//! Configuration loader for play sessions

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use teleop_core::EnvironmentConfig;

use crate::controller::KeyBindings;
use crate::input::HoldWindows;

/// Environment flown when nothing else is configured
pub const DEFAULT_ENV_ID: &str = "LunarLander-v2";

/// Session configuration.
///
/// Every field is optional in the TOML file:
///
/// ```toml
/// env_id = "LunarLander-v3"
/// first_hold_ms = 600
/// hold_ms = 120
///
/// [keys]
/// reset = "r"
///
/// [environment]
/// seed = 42
/// bridge = ["python3", "-u", "scripts/gym_bridge.py"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Registry id of the environment
    pub env_id: String,
    /// Control keys
    pub keys: KeyBindings,
    /// How long a fresh press counts as held on terminals that do not
    /// report releases; must outlast the OS auto-repeat delay
    pub first_hold_ms: u64,
    /// How long a key counts as held after each auto-repeat
    pub hold_ms: u64,
    /// Passed through to the environment constructor
    pub environment: EnvironmentConfig,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            env_id: DEFAULT_ENV_ID.to_string(),
            keys: KeyBindings::default(),
            first_hold_ms: 600,
            hold_ms: 120,
            environment: EnvironmentConfig::default(),
        }
    }
}

impl PlayConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse TOML")?;
        config.keys.validate()?;
        Ok(config)
    }

    /// Hold windows for the terminal keyboard
    #[must_use]
    pub fn hold(&self) -> HoldWindows {
        HoldWindows {
            first: Duration::from_millis(self.first_hold_ms),
            repeat: Duration::from_millis(self.hold_ms),
        }
    }
}
