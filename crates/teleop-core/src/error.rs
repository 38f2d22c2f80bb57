//! Error types for environment operations

use thiserror::Error;

/// Error type for environment operations
#[derive(Error, Debug)]
pub enum EnvError {
    /// The backend reported a failure
    #[error("Environment error: {0}")]
    Environment(String),

    /// No constructor is registered under this id
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Action outside the environment's action space
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// The backend sent something we could not understand
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation attempted on a closed environment
    #[error("Environment already closed")]
    Closed,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for environment operations
pub type Result<T> = std::result::Result<T, EnvError>;
