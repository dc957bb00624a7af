//! Error types for runbox-runtime.

use thiserror::Error;

/// Result type alias for runbox-runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur during container runtime operations.
///
/// Each lifecycle primitive has its own variant so callers can tell a
/// failed create apart from a failed exec without string matching.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Failed to reach the container daemon
    #[error("failed to connect to container runtime: {0}")]
    Connect(String),

    /// Failed to create the container
    #[error("failed to create container: {0}")]
    Create(String),

    /// Failed to start the container
    #[error("failed to start container: {0}")]
    Start(String),

    /// Failed to inspect container state
    #[error("failed to inspect container: {0}")]
    Inspect(String),

    /// Failed to copy the payload archive into the container
    #[error("failed to inject archive: {0}")]
    Inject(String),

    /// Failed to run a command inside the container
    #[error("exec failed: {0}")]
    Exec(String),

    /// Failed to read the container's resource counters
    #[error("failed to read stats: {0}")]
    Stats(String),

    /// Failed to kill the container
    #[error("failed to kill container: {0}")]
    Kill(String),

    /// Failed to remove the container
    #[error("failed to remove container: {0}")]
    Remove(String),

    /// Image is not present locally and could not be pulled
    #[error("image not available: {reference}")]
    ImageMissing {
        /// Image reference that could not be resolved
        reference: String,
    },

    /// Underlying Docker API error
    #[error("docker API error: {0}")]
    Api(#[from] bollard::errors::Error),
}
