//! Container runtime trait.

use crate::error::Result;
use crate::models::{ContainerHandle, ContainerStatus, CreateSpec, ExecOutput, StatsSnapshot};
use async_trait::async_trait;

/// Trait for the container-level primitives the execution pool is built on.
///
/// This abstraction allows different container backends (Docker via
/// bollard, a remote engine, an in-memory fake for tests) to be swapped
/// without changing the pool logic. Every method is a blocking call from
/// the pool's point of view; implementations must not require cooperative
/// yielding between the call and its completion.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Check that the runtime daemon is reachable.
    ///
    /// # Errors
    /// Returns an error if the daemon does not answer.
    async fn ping(&self) -> Result<()>;

    /// Check whether an image is present locally.
    ///
    /// # Errors
    /// Returns an error only for runtime faults; a missing image is
    /// `Ok(false)`, not an error.
    async fn image_exists(&self, reference: &str) -> Result<bool>;

    /// Pull an image from its registry.
    ///
    /// # Errors
    /// Returns an error if the pull does not complete.
    async fn pull_image(&self, reference: &str) -> Result<()>;

    /// Create a container according to `spec`.
    ///
    /// The container is created but not started.
    ///
    /// # Returns
    /// A handle identifying the new container.
    ///
    /// # Errors
    /// Returns an error if creation fails (name collision, missing image,
    /// daemon fault).
    async fn create(&self, spec: &CreateSpec) -> Result<ContainerHandle>;

    /// Start a created container.
    ///
    /// # Errors
    /// Returns an error if the container cannot be started.
    async fn start(&self, handle: &ContainerHandle) -> Result<()>;

    /// Re-read the container's live status from the runtime.
    ///
    /// Never served from a cache; this is the health re-check the pool
    /// relies on before every execution.
    ///
    /// # Errors
    /// Returns an error if the container cannot be inspected (for example
    /// because it no longer exists).
    async fn reload_status(&self, handle: &ContainerHandle) -> Result<ContainerStatus>;

    /// Unpack a tar archive into `target_dir` inside the container.
    ///
    /// # Arguments
    /// * `target_dir` - Absolute directory inside the container
    /// * `archive` - Uncompressed tar bytes
    ///
    /// # Errors
    /// Returns an error if the archive cannot be written.
    async fn inject_archive(
        &self,
        handle: &ContainerHandle,
        target_dir: &str,
        archive: Vec<u8>,
    ) -> Result<()>;

    /// Run a command inside the container and wait for it to finish.
    ///
    /// Captures stdout and stderr as a single combined stream in arrival
    /// order, non-interactive and non-streaming. No extra environment
    /// variables are injected and the command runs unprivileged.
    ///
    /// # Arguments
    /// * `command` - argv to run
    /// * `working_dir` - Working directory for the command
    ///
    /// # Returns
    /// The verbatim exit code and the combined output bytes.
    ///
    /// # Errors
    /// Returns an error for runtime faults only; a non-zero exit code is a
    /// normal result.
    async fn exec(
        &self,
        handle: &ContainerHandle,
        command: &[String],
        working_dir: &str,
    ) -> Result<ExecOutput>;

    /// Take one non-streaming snapshot of the container's resource counters.
    ///
    /// # Errors
    /// Returns an error if the counters cannot be read.
    async fn stats_snapshot(&self, handle: &ContainerHandle) -> Result<StatsSnapshot>;

    /// Kill the container's init process.
    ///
    /// # Errors
    /// Returns an error if the kill fails (already stopped, gone).
    async fn kill(&self, handle: &ContainerHandle) -> Result<()>;

    /// Force-remove the container.
    ///
    /// # Errors
    /// Returns an error if removal fails.
    async fn remove(&self, handle: &ContainerHandle) -> Result<()>;
}
