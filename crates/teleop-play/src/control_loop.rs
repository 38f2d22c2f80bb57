//! The interactive control loop.
//!
//! One frame is: refresh input, sample the four bound keys, render, then
//! exactly one of `reset` or `step`. The loop only stops when the keyboard
//! reports an interrupt or something fails.

use anyhow::{Context, Result};
use teleop_core::{Environment, LanderAction, Observation, TrackedEnvironment};

use crate::controller::{Command, KeyBindings, PressedKeys};
use crate::input::Keyboard;

/// Owns an environment and closes it exactly once.
///
/// An explicit [`EnvSession::close`] is the normal path; dropping an
/// unclosed session closes it as well so early returns still release the
/// backend.
pub struct EnvSession<E: Environment> {
    env: E,
    closed: bool,
}

impl<E: Environment> EnvSession<E> {
    /// Take ownership of `env`
    pub fn new(env: E) -> Self {
        Self { env, closed: false }
    }

    /// The wrapped environment
    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The wrapped environment, mutably
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Close the environment; later calls do nothing
    pub fn close(&mut self) -> teleop_core::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.env.close()
    }

    /// Whether [`EnvSession::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<E: Environment> Drop for EnvSession<E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to close environment: {e}");
        }
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames completed
    pub frames: u64,
    /// Frames that stepped the environment
    pub steps: u64,
    /// Frames that reset the environment
    pub resets: u64,
}

/// Keyboard-driven control loop over one environment
pub struct ControlLoop<E, K>
where
    E: Environment,
{
    session: EnvSession<TrackedEnvironment<E>>,
    keyboard: K,
    bindings: KeyBindings,
}

impl<E, K> ControlLoop<E, K>
where
    E: Environment,
    E::Action: From<LanderAction>,
    K: Keyboard,
{
    /// Build a loop; nothing touches the environment until [`ControlLoop::run`]
    pub fn new(env: E, keyboard: K, bindings: KeyBindings) -> Self {
        Self {
            session: EnvSession::new(TrackedEnvironment::new(env)),
            keyboard,
            bindings,
        }
    }

    /// Run until interrupted, then close the environment.
    ///
    /// # Errors
    ///
    /// Any environment or input failure ends the loop and is returned as
    /// is. The environment is still closed once on that path.
    pub fn run(mut self) -> Result<LoopStats> {
        let (observation, _info) = self
            .session
            .env_mut()
            .reset()
            .context("failed to reset environment")?;
        tracing::info!(observation_shape = ?observation.shape(), "control loop started");

        let mut stats = LoopStats::default();
        loop {
            self.keyboard.refresh()?;
            if self.keyboard.interrupt_requested() {
                break;
            }

            let command = PressedKeys::poll(&self.keyboard, &self.bindings).command();
            let env = self.session.env_mut();

            env.render().context("failed to render frame")?;
            match command {
                Command::Reset => {
                    env.reset().context("failed to reset environment")?;
                    stats.resets += 1;
                    tracing::debug!(frame = stats.frames, "environment reset");
                }
                Command::Step(action) => {
                    env.step(action.into())
                        .with_context(|| format!("failed to step with {action}"))?;
                    stats.steps += 1;
                    tracing::trace!(frame = stats.frames, %action, "step");
                }
            }
            stats.frames += 1;
        }

        self.session.close().context("failed to close environment")?;
        tracing::info!(
            frames = stats.frames,
            steps = stats.steps,
            resets = stats.resets,
            "control loop stopped"
        );
        Ok(stats)
    }
}
