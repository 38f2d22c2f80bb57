//! Key bindings and the per-frame key → command mapping

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use teleop_core::LanderAction;

use crate::input::Keyboard;

/// What the loop does with the environment this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a new episode instead of stepping
    Reset,
    /// Advance the simulation with this action
    Step(LanderAction),
}

/// Keys driving the lander
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Restart the episode
    pub reset: char,
    /// Fire the main engine
    pub thrust: char,
    /// Rotate clockwise
    pub rotate_right: char,
    /// Rotate counter-clockwise
    pub rotate_left: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            reset: 'q',
            thrust: 'w',
            rotate_right: 'd',
            rotate_left: 'a',
        }
    }
}

impl KeyBindings {
    /// Bound keys in polling order: reset, thrust, rotate right, rotate left
    #[must_use]
    pub fn keys(&self) -> [char; 4] {
        [self.reset, self.thrust, self.rotate_right, self.rotate_left]
    }

    /// Reject bindings that map two controls to the same key
    pub fn validate(&self) -> Result<()> {
        let keys = self.keys().map(|k| k.to_ascii_lowercase());
        for (i, key) in keys.iter().enumerate() {
            if keys[i + 1..].contains(key) {
                bail!("key '{key}' is bound to more than one control");
            }
        }
        Ok(())
    }
}

/// Pressed state of the four bound keys, sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedKeys {
    /// Reset key held
    pub reset: bool,
    /// Thrust key held
    pub thrust: bool,
    /// Rotate-right key held
    pub rotate_right: bool,
    /// Rotate-left key held
    pub rotate_left: bool,
}

impl PressedKeys {
    /// Ask the keyboard about each bound key exactly once
    pub fn poll<K: Keyboard + ?Sized>(keyboard: &K, bindings: &KeyBindings) -> Self {
        Self {
            reset: keyboard.is_pressed(bindings.reset),
            thrust: keyboard.is_pressed(bindings.thrust),
            rotate_right: keyboard.is_pressed(bindings.rotate_right),
            rotate_left: keyboard.is_pressed(bindings.rotate_left),
        }
    }

    /// Map held keys to a command.
    ///
    /// Reset beats everything. Movement keys are checked thrust, right,
    /// left and the last one held wins, so left beats right beats thrust.
    #[must_use]
    pub fn command(self) -> Command {
        if self.reset {
            return Command::Reset;
        }

        let mut action = LanderAction::Noop;
        if self.thrust {
            action = LanderAction::Thrust;
        }
        if self.rotate_right {
            action = LanderAction::RotateRight;
        }
        if self.rotate_left {
            action = LanderAction::RotateLeft;
        }
        Command::Step(action)
    }
}
