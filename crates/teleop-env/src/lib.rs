//! Environment backends for lander-teleop
//!
//! This crate provides:
//! - a registry mapping environment ids to constructors
//! - a bridge that drives a gym-compatible simulator in a child process

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
mod protocol;
pub mod registry;

pub use bridge::{BridgeParams, GymBridgeEnv, CLOSE_GRACE, DEFAULT_BRIDGE_COMMAND};
pub use registry::{list_envs, make_env, register_env, DynEnvironment, EnvRegistry, GYM_BRIDGE_IDS};

// Re-export core types
pub use teleop_core::{
    DiscreteAction, EnvError, Environment, EnvironmentConfig, Step, StepInfo, VectorObservation,
};
