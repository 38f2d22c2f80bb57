//! Core environment traits and types for lander-teleop
//!
//! This crate provides the abstractions the control loop talks to:
//! discrete actions, observations, rewards and the synchronous
//! [`Environment`] trait implemented by simulator backends.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod observation;
pub mod reward;

// Re-export core traits and types
pub use action::{Action, DiscreteAction, DiscreteSpace, LanderAction};
pub use environment::{Environment, EnvironmentConfig, Episode, Step, StepInfo, TrackedEnvironment};
pub use error::{EnvError, Result};
pub use observation::{Observation, VectorObservation};
pub use reward::Reward;
