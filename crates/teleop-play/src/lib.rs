//! Keyboard teleoperation for simulated landers
//!
//! Samples four keys every frame, turns them into a lander action and
//! forwards it to an environment created through the `teleop-env`
//! registry.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod control_loop;
pub mod controller;
pub mod input;
pub mod logging;

use anyhow::{Context, Result};

pub use config::{PlayConfig, DEFAULT_ENV_ID};
pub use control_loop::{ControlLoop, EnvSession, LoopStats};
pub use controller::{Command, KeyBindings, PressedKeys};
pub use input::{HoldWindows, KeyTracker, Keyboard, TerminalKeyboard};

/// Create the configured environment and fly it from the terminal until
/// Ctrl-C or Esc.
pub fn play(config: &PlayConfig) -> Result<LoopStats> {
    let env = teleop_env::make_env(&config.env_id, config.environment.clone())
        .with_context(|| format!("failed to create environment {}", config.env_id))?;

    tracing::info!(
        env = %config.env_id,
        reset = %config.keys.reset,
        thrust = %config.keys.thrust,
        rotate_right = %config.keys.rotate_right,
        rotate_left = %config.keys.rotate_left,
        "press Esc or Ctrl-C to quit"
    );

    let keyboard = TerminalKeyboard::new(config.hold())?;
    ControlLoop::new(env, keyboard, config.keys.clone()).run()
}
