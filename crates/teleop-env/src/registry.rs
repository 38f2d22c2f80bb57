//! Environment registry for creating environments by id

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use teleop_core::{DiscreteAction, EnvError, Environment, EnvironmentConfig, Result, VectorObservation};

use crate::GymBridgeEnv;

/// Environment as handed out by the registry
pub type DynEnvironment = Box<dyn Environment<Observation = VectorObservation, Action = DiscreteAction>>;

type EnvConstructor = Box<dyn Fn(EnvironmentConfig) -> Result<DynEnvironment> + Send + Sync>;

/// Ids served by the gym bridge out of the box
pub const GYM_BRIDGE_IDS: [&str; 2] = ["LunarLander-v2", "LunarLander-v3"];

lazy_static::lazy_static! {
    static ref REGISTRY: Mutex<EnvRegistry> = Mutex::new(EnvRegistry::with_defaults());
}

/// Maps environment ids to constructors
pub struct EnvRegistry {
    envs: HashMap<String, EnvConstructor>,
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            envs: HashMap::new(),
        }
    }

    /// Create a registry with the gym bridge ids registered
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in GYM_BRIDGE_IDS {
            registry.register(id, move |config| {
                GymBridgeEnv::spawn(id, &config).map(|env| Box::new(env) as DynEnvironment)
            });
        }
        registry
    }

    /// Register an environment, replacing any previous constructor for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(EnvironmentConfig) -> Result<DynEnvironment> + Send + Sync + 'static,
    {
        self.envs.insert(name.into(), Box::new(constructor));
    }

    /// Create an environment by name
    pub fn make(&self, name: &str, config: EnvironmentConfig) -> Result<DynEnvironment> {
        let constructor = self
            .envs
            .get(name)
            .ok_or_else(|| EnvError::UnknownEnvironment(name.to_string()))?;

        tracing::debug!(env = name, "creating environment");
        constructor(config)
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.envs.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.envs.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Register an environment in the process registry
pub fn register_env<F>(name: impl Into<String>, constructor: F)
where
    F: Fn(EnvironmentConfig) -> Result<DynEnvironment> + Send + Sync + 'static,
{
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, constructor);
}

/// Create an environment from the process registry
pub fn make_env(name: &str, config: EnvironmentConfig) -> Result<DynEnvironment> {
    REGISTRY
        .lock()
        .map_err(|_| EnvError::Environment("environment registry poisoned".to_string()))?
        .make(name, config)
}

/// List all environments in the process registry
#[must_use]
pub fn list_envs() -> Vec<String> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner).list()
}
