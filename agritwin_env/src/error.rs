//! Error types for the AgriTwin environment abstraction.

use thiserror::Error;

/// Errors that can occur at the environment boundary.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The persistence sink rejected or failed to store a record
    #[error("Sink error: {0}")]
    SinkError(String),

    /// The sink is unreachable (connection closed, service down)
    #[error("Sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Record serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SinkUnavailable(msg.into())
    }
}
