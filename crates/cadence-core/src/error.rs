//! Error types for Cadence

use crate::id::ComponentId;
use thiserror::Error;

/// The main error type for Cadence operations
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown component handle: {0}")]
    UnknownHandle(ComponentId),

    #[error("Recursive instantiation overflow: depth {depth} exceeds limit {limit}")]
    RecursiveInstantiationOverflow { depth: usize, limit: usize },

    #[error("Simulation is not running")]
    NotRunning,

    #[error("Callback error: {0}")]
    Callback(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl CadenceError {
    /// Convenience constructor for failures raised by component code
    pub fn callback(message: impl Into<String>) -> Self {
        CadenceError::Callback(message.into())
    }

    /// True for conditions that must never be swallowed by a per-callback isolation policy
    pub fn is_fatal(&self) -> bool {
        matches!(self, CadenceError::RecursiveInstantiationOverflow { .. })
    }
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;

impl From<toml::de::Error> for CadenceError {
    fn from(err: toml::de::Error) -> Self {
        CadenceError::TomlParseError(err.to_string())
    }
}
