//! Per-language sandbox pool: lifecycle, health checks, and bookkeeping.
//!
//! The pool keeps at most one long-lived sandbox per language. A sandbox
//! is created on first use (or eagerly via [`ExecutionPool::warm_all`]),
//! health-checked against the runtime before every execution, and
//! recreated whenever the live check reports anything but running.

use crate::error::{PoolError, Result};
use crate::registry::{LanguageRegistry, LanguageSpec};
use chrono::{DateTime, Utc};
use rand::Rng;
use runbox_runtime::{ContainerHandle, ContainerRuntime, CreateSpec};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Scratch directory inside every sandbox; injected files land here and
/// commands run from here.
pub const SANDBOX_WORKDIR: &str = "/tmp";

/// Memory ceiling per sandbox.
const MEMORY_LIMIT_BYTES: i64 = 256 * 1024 * 1024;
/// CPU quota per scheduling period: half of one core.
const CPU_QUOTA: i64 = 50_000;
/// CPU scheduling period in microseconds.
const CPU_PERIOD: i64 = 100_000;

/// Per-language pool record.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    /// Handle of the live sandbox for this language.
    pub handle: ContainerHandle,
    /// Timestamp of the last execution (or creation).
    pub last_used: DateTime<Utc>,
}

/// Sandboxed execution pool, one sandbox slot per registered language.
///
/// # Thread Safety
///
/// The pool is safe to share across tasks (`Arc<ExecutionPool>`). The
/// entry map is guarded by an async `RwLock`; lifecycle operations take
/// the write lock only around the map mutation itself, never across a
/// runtime call, so a slow operation on one language does not stall
/// status reads or executions for another.
///
/// Concurrent `execute` calls for the *same* language are deliberately not
/// serialized: they share the language's one sandbox (and its CPU/memory
/// quota), each with its own uniquely named injected file.
pub struct ExecutionPool {
    pub(crate) runtime: Arc<dyn ContainerRuntime>,
    pub(crate) registry: LanguageRegistry,
    pub(crate) entries: Arc<RwLock<HashMap<String, PoolEntry>>>,
    started_at: Instant,
}

impl ExecutionPool {
    /// Create a pool on top of a container runtime and a language registry.
    pub fn new(runtime: Arc<dyn ContainerRuntime>, registry: LanguageRegistry) -> Self {
        tracing::info!(languages = registry.len(), "Execution pool initialized");
        Self {
            runtime,
            registry,
            entries: Arc::new(RwLock::new(HashMap::new())),
            started_at: Instant::now(),
        }
    }

    /// The registry this pool serves.
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Check that the container runtime daemon answers.
    pub async fn runtime_available(&self) -> bool {
        match self.runtime.ping().await {
            Ok(()) => {
                tracing::info!("Container runtime is available");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Container runtime not available");
                false
            }
        }
    }

    /// Return a validated handle for `language`, creating or recreating
    /// the sandbox as needed.
    ///
    /// The cached handle is never trusted: its status is re-read from the
    /// runtime, and anything but "running" (including a failing re-check)
    /// tears the sandbox down and creates a fresh one.
    ///
    /// # Errors
    /// [`PoolError::UnknownLanguage`] for unregistered languages,
    /// [`PoolError::ImagePullFailure`] or [`PoolError::SandboxUnavailable`]
    /// when a fresh sandbox cannot be brought up.
    pub async fn ensure_available(&self, language: &str) -> Result<ContainerHandle> {
        let spec = self.registry.spec(language)?;

        let existing = {
            let entries = self.entries.read().await;
            entries.get(language).map(|entry| entry.handle.clone())
        };

        if let Some(handle) = existing {
            match self.runtime.reload_status(&handle).await {
                Ok(status) if status.is_running() => return Ok(handle),
                Ok(status) => {
                    tracing::warn!(
                        language = %language,
                        container_id = %handle,
                        status = %status,
                        "Sandbox is not running, recreating"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        language = %language,
                        container_id = %handle,
                        error = %e,
                        "Sandbox health check failed, recreating"
                    );
                }
            }
            self.destroy(language).await;
        }

        self.create_sandbox(spec).await
    }

    /// Create, start, and register a fresh sandbox for `spec`.
    async fn create_sandbox(&self, spec: &LanguageSpec) -> Result<ContainerHandle> {
        self.ensure_image(spec).await?;

        let name = generate_container_name(&spec.id);
        tracing::info!(
            language = %spec.id,
            container = %name,
            image = %spec.image,
            "Creating sandbox"
        );

        let create_spec = CreateSpec {
            image: spec.image.clone(),
            name,
            command: vec!["/bin/sh".to_string()], // no-op foreground, keeps it alive
            working_dir: SANDBOX_WORKDIR.to_string(),
            network_disabled: true,
            memory_bytes: MEMORY_LIMIT_BYTES,
            cpu_quota: CPU_QUOTA,
            cpu_period: CPU_PERIOD,
            tty: true,
            open_stdin: true,
        };

        let handle = self.runtime.create(&create_spec).await.map_err(|e| {
            tracing::error!(language = %spec.id, error = %e, "Failed to create sandbox");
            PoolError::SandboxUnavailable {
                language: spec.id.clone(),
                source: e,
            }
        })?;

        if let Err(e) = self.runtime.start(&handle).await {
            tracing::error!(language = %spec.id, container_id = %handle, error = %e, "Failed to start sandbox");
            if let Err(remove_err) = self.runtime.remove(&handle).await {
                tracing::warn!(container_id = %handle, error = %remove_err, "Error removing unstartable sandbox");
            }
            return Err(PoolError::SandboxUnavailable {
                language: spec.id.clone(),
                source: e,
            });
        }

        {
            let mut entries = self.entries.write().await;
            entries.insert(
                spec.id.clone(),
                PoolEntry {
                    handle: handle.clone(),
                    last_used: Utc::now(),
                },
            );
        }

        tracing::info!(
            language = %spec.id,
            container_id = %handle,
            "Sandbox created and started"
        );
        Ok(handle)
    }

    /// Make sure the runtime image for `spec` is locally present, pulling
    /// it if missing.
    ///
    /// A failed pull is tolerated when a re-check finds the image present
    /// anyway (another process may have won the pull race); a failed pull
    /// with the image still absent is fatal for the language.
    async fn ensure_image(&self, spec: &LanguageSpec) -> Result<()> {
        if self.runtime.image_exists(&spec.image).await? {
            tracing::debug!(image = %spec.image, "Image already present");
            return Ok(());
        }

        tracing::info!(language = %spec.id, image = %spec.image, "Image missing, pulling");
        if let Err(pull_err) = self.runtime.pull_image(&spec.image).await {
            if matches!(self.runtime.image_exists(&spec.image).await, Ok(true)) {
                tracing::warn!(
                    image = %spec.image,
                    error = %pull_err,
                    "Pull failed but image is now present, continuing"
                );
                return Ok(());
            }
            tracing::error!(
                language = %spec.id,
                image = %spec.image,
                error = %pull_err,
                "Failed to pull image and image not found"
            );
            return Err(PoolError::ImagePullFailure {
                language: spec.id.clone(),
                image: spec.image.clone(),
                source: pull_err,
            });
        }
        Ok(())
    }

    /// Tear down the sandbox for `language`, if any.
    ///
    /// Best-effort: the pool entry is cleared first so subsequent calls
    /// observe "needs creation" regardless of runtime outcomes, then kill
    /// and forced removal are attempted independently.
    pub async fn destroy(&self, language: &str) {
        let entry = {
            let mut entries = self.entries.write().await;
            entries.remove(language)
        };
        let Some(entry) = entry else {
            return;
        };

        tracing::info!(
            language = %language,
            container_id = %entry.handle,
            "Cleaning up sandbox"
        );
        self.teardown(&entry.handle).await;
        tracing::info!(language = %language, "Sandbox cleaned up");
    }

    /// Tear down every tracked sandbox. Called at process shutdown.
    pub async fn destroy_all(&self) {
        let drained = {
            let mut entries = self.entries.write().await;
            std::mem::take(&mut *entries)
        };

        tracing::info!(count = drained.len(), "Cleaning up all sandboxes");
        for (language, entry) in drained {
            tracing::debug!(language = %language, container_id = %entry.handle, "Cleaning up sandbox");
            self.teardown(&entry.handle).await;
        }
        tracing::info!("All sandboxes cleaned up");
    }

    /// Kill then force-remove, each step independently fault-tolerant.
    async fn teardown(&self, handle: &ContainerHandle) {
        if let Err(e) = self.runtime.kill(handle).await {
            tracing::warn!(container_id = %handle, error = %e, "Error killing container");
        } else {
            tracing::debug!(container_id = %handle, "Container killed");
        }

        if let Err(e) = self.runtime.remove(handle).await {
            tracing::warn!(container_id = %handle, error = %e, "Error removing container");
        } else {
            tracing::debug!(container_id = %handle, "Container removed");
        }
    }

    /// Eagerly create one sandbox per registered language, so the first
    /// real request pays no cold-start latency.
    ///
    /// # Errors
    /// The first language whose image cannot be resolved or whose sandbox
    /// cannot be brought up aborts the warm-up and propagates.
    pub async fn warm_all(&self) -> Result<()> {
        let languages: Vec<String> = self
            .registry
            .languages()
            .map(|language| language.to_string())
            .collect();

        tracing::info!(count = languages.len(), "Warming sandboxes for all languages");
        for language in languages {
            self.ensure_available(&language).await?;
        }
        Ok(())
    }

    /// Live status word for `language`.
    ///
    /// `"stopped"` when no sandbox is tracked, the runtime's own status
    /// word after a live re-check otherwise, `"error"` when the re-check
    /// itself fails.
    pub async fn status(&self, language: &str) -> String {
        let handle = {
            let entries = self.entries.read().await;
            entries.get(language).map(|entry| entry.handle.clone())
        };
        let Some(handle) = handle else {
            return "stopped".to_string();
        };

        match self.runtime.reload_status(&handle).await {
            Ok(status) => status.as_str().to_string(),
            Err(e) => {
                tracing::debug!(language = %language, error = %e, "Status re-check failed");
                "error".to_string()
            }
        }
    }

    /// Status of every registered language, for the health collaborator.
    pub async fn status_all(&self) -> Vec<(String, String)> {
        let languages: Vec<String> = self
            .registry
            .languages()
            .map(|language| language.to_string())
            .collect();

        let mut statuses = Vec::with_capacity(languages.len());
        for language in languages {
            let status = self.status(&language).await;
            statuses.push((language, status));
        }
        statuses
    }

    /// Seconds since the pool was constructed. Monotonic.
    pub fn uptime(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Timestamp of the last execution for `language`, if it has a
    /// tracked sandbox.
    pub async fn last_used(&self, language: &str) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().await;
        entries.get(language).map(|entry| entry.last_used)
    }
}

/// Container name unique within the runtime namespace: language prefix
/// plus a random hex suffix, so repeated create/destroy cycles and
/// concurrent process instances never collide.
fn generate_container_name(language: &str) -> String {
    let suffix: u16 = rand::rng().random();
    format!("code-runner-{language}-{suffix:04x}")
}
