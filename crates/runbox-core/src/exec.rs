//! Execution engine: payload injection, command launch, output capture.

use crate::archive;
use crate::error::{PoolError, Result};
use crate::pool::{ExecutionPool, SANDBOX_WORKDIR};
use crate::registry::FILEPATH_PLACEHOLDER;
use crate::telemetry::{round2, ResourceUsage};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// Ceiling on captured output, in bytes.
pub const MAX_OUTPUT_SIZE: usize = 10 * 1024;

/// Marker appended when captured output exceeds [`MAX_OUTPUT_SIZE`].
pub const TRUNCATION_MARKER: &str = "\n[Output truncated at 10KB limit]";

/// Outcome of one code execution.
///
/// Immutable value object; not persisted by this crate. `stderr` is empty
/// by convention: stdout and stderr are captured as one combined stream
/// (see [`ExecutionPool::execute`]) and the whole of it is reported as
/// `stdout`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Combined captured output, capped at [`MAX_OUTPUT_SIZE`].
    pub stdout: String,
    /// Always empty; kept for the result contract.
    pub stderr: String,
    /// Verbatim process exit code, including non-zero and signal-derived
    /// codes.
    pub exit_code: i64,
    /// Wall-clock time from just before sandbox acquisition to just after
    /// command completion, in milliseconds.
    pub execution_time_ms: f64,
    /// Short ID of the sandbox the code ran in.
    pub sandbox_id: String,
    /// Language the code ran as.
    pub language: String,
    /// Image the sandbox was created from.
    pub image_name: String,
    /// Working-set memory in MB, from a post-execution snapshot.
    pub memory_used_mb: f64,
    /// CPU utilization percentage, from a post-execution snapshot.
    pub cpu_percent: f64,
    /// Absolute in-sandbox path of the injected source file.
    pub file_path: String,
}

impl ExecutionPool {
    /// Execute `code` as `language` inside the language's pooled sandbox.
    ///
    /// The source is packaged into a single-file archive, injected into
    /// the sandbox's scratch directory under a process-unique name, and
    /// launched with the language's command template. Output is captured
    /// as one combined stdout+stderr stream - a deliberate choice that
    /// eliminates interleaving races between the two descriptors at the
    /// cost of an always-empty `stderr` field - and truncated at
    /// [`MAX_OUTPUT_SIZE`].
    ///
    /// Concurrent calls for the same language share one sandbox and its
    /// resource quota; they are not serialized against each other. There
    /// is no execution deadline: a non-terminating submission blocks its
    /// caller until the runtime itself intervenes.
    ///
    /// # Errors
    /// [`PoolError::UnknownLanguage`] before any runtime call for
    /// unregistered languages; [`PoolError::ImagePullFailure`] /
    /// [`PoolError::SandboxUnavailable`] when no sandbox can be brought
    /// up; [`PoolError::SandboxExecutionError`] for injection, exec, or
    /// telemetry faults. A non-zero exit code from the user's program is
    /// a normal result, not an error.
    pub async fn execute(&self, language: &str, code: &str) -> Result<ExecutionResult> {
        let spec = self.registry.spec(language)?.clone();

        let started = Instant::now();
        tracing::debug!(language = %language, code_len = code.len(), "Executing code");

        let handle = self.ensure_available(language).await?;

        {
            let mut entries = self.entries.write().await;
            if let Some(entry) = entries.get_mut(language) {
                entry.last_used = Utc::now();
            }
        }

        let filename = format!("exec_{}{}", Uuid::new_v4(), spec.extension);
        let file_path = format!("{SANDBOX_WORKDIR}/{filename}");
        tracing::debug!(
            language = %language,
            container_id = %handle,
            path = %file_path,
            "Injecting source file"
        );

        let payload = archive::package(&filename, code.as_bytes())
            .map_err(|e| execution_error(language, format!("failed to package payload: {e}")))?;
        self.runtime
            .inject_archive(&handle, SANDBOX_WORKDIR, payload)
            .await
            .map_err(|e| execution_error(language, e.to_string()))?;

        let command: Vec<String> = spec
            .command
            .iter()
            .map(|part| {
                if part.contains(FILEPATH_PLACEHOLDER) {
                    part.replace(FILEPATH_PLACEHOLDER, &file_path)
                } else {
                    part.clone()
                }
            })
            .collect();
        tracing::debug!(language = %language, command = %command.join(" "), "Running command");

        let exec = self
            .runtime
            .exec(&handle, &command, SANDBOX_WORKDIR)
            .await
            .map_err(|e| execution_error(language, e.to_string()))?;

        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let combined = String::from_utf8_lossy(&exec.output).into_owned();
        tracing::debug!(language = %language, output_len = combined.len(), "Captured combined output");
        let stdout = truncate_output(&combined);
        // stderr stays empty by convention; everything arrived on the
        // combined stream above.
        let stderr = String::new();

        let snapshot = self
            .runtime
            .stats_snapshot(&handle)
            .await
            .map_err(|e| execution_error(language, e.to_string()))?;
        let usage = ResourceUsage::from_snapshot(&snapshot);

        tracing::info!(
            language = %language,
            exit_code = exec.exit_code,
            elapsed_ms = round2(execution_time_ms),
            memory_mb = usage.memory_used_mb,
            "Execution completed"
        );

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code: exec.exit_code,
            execution_time_ms: round2(execution_time_ms),
            sandbox_id: handle.short_id().to_string(),
            language: spec.id,
            image_name: spec.image,
            memory_used_mb: usage.memory_used_mb,
            cpu_percent: usage.cpu_percent,
            file_path,
        })
    }
}

/// Wrap a runtime fault from the execution path. The pool entry is left
/// untouched: the sandbox may still serve the next call.
fn execution_error(language: &str, message: String) -> PoolError {
    tracing::error!(language = %language, error = %message, "Error executing code in sandbox");
    PoolError::SandboxExecutionError {
        language: language.to_string(),
        message,
    }
}

/// Cap `output` at [`MAX_OUTPUT_SIZE`] bytes, backing off to the nearest
/// UTF-8 boundary, and append [`TRUNCATION_MARKER`] when anything was cut.
fn truncate_output(output: &str) -> String {
    if output.len() <= MAX_OUTPUT_SIZE {
        return output.to_string();
    }

    let mut end = MAX_OUTPUT_SIZE;
    while !output.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = String::with_capacity(end + TRUNCATION_MARKER.len());
    truncated.push_str(&output[..end]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
