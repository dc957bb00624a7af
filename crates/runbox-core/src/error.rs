//! Error types for runbox-core.

use runbox_runtime::RuntimeError;
use thiserror::Error;

/// Result type alias for runbox-core operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors surfaced by the execution pool.
///
/// A failing user program is not an error: it comes back as a normal
/// [`ExecutionResult`](crate::ExecutionResult) with its exit code. These
/// variants cover registry misses and runtime-layer faults only.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Requested language is not in the registry. No runtime call is made.
    #[error("unknown language: {language}")]
    UnknownLanguage {
        /// The language identifier that was requested
        language: String,
    },

    /// Required image is neither present locally nor pullable.
    #[error("image {image} for {language} is not available: {source}")]
    ImagePullFailure {
        /// Language the image belongs to
        language: String,
        /// Image reference that could not be resolved
        image: String,
        /// Underlying pull failure
        #[source]
        source: RuntimeError,
    },

    /// Sandbox creation or start failed. The pool entry for the language
    /// stays absent, so the next call retries creation.
    #[error("sandbox for {language} unavailable: {source}")]
    SandboxUnavailable {
        /// Language whose sandbox could not be brought up
        language: String,
        /// Underlying create/start failure
        #[source]
        source: RuntimeError,
    },

    /// Injection, command execution, or telemetry collection failed. The
    /// pool entry is left as-is; the sandbox may still serve the next call.
    #[error("execution failed for {language}: {message}")]
    SandboxExecutionError {
        /// Language the execution was for
        language: String,
        /// Underlying runtime error message
        message: String,
    },

    /// Any other runtime-layer fault (for example an image inspection
    /// error that is neither "present" nor "missing").
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
