//! Data models shared between the runtime trait and its implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a container managed by a [`ContainerRuntime`].
///
/// [`ContainerRuntime`]: crate::ContainerRuntime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHandle {
    /// Full container ID as reported by the runtime.
    pub id: String,
    /// Name the container was created under.
    pub name: String,
}

impl ContainerHandle {
    /// Create a handle from a runtime-assigned ID and creation name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Short (12 character) form of the container ID, as shown in logs
    /// and execution results.
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(12);
        &self.id[..end]
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Lifecycle status of a container, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Created but never started.
    Created,
    /// Running.
    Running,
    /// Paused.
    Paused,
    /// Restarting.
    Restarting,
    /// Exited.
    Exited,
    /// Dead.
    Dead,
    /// Any status word this crate does not model explicitly.
    Unknown(String),
}

impl ContainerStatus {
    /// Parse the runtime's lowercase status word.
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The runtime's wire word for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Unknown(s) => s,
        }
    }

    /// Whether the container can accept exec calls.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a container.
///
/// The sandbox pool always creates containers with the same isolation
/// envelope: no network device, bounded memory, a bounded CPU share, and a
/// no-op foreground command so the container stays alive between exec
/// calls.
#[derive(Debug, Clone)]
pub struct CreateSpec {
    /// Image reference to run.
    pub image: String,
    /// Name for the container, unique within the runtime namespace.
    pub name: String,
    /// Foreground command that keeps the container alive.
    pub command: Vec<String>,
    /// Working directory inside the container.
    pub working_dir: String,
    /// Whether to create the container without a network device.
    pub network_disabled: bool,
    /// Memory ceiling in bytes.
    pub memory_bytes: i64,
    /// CPU quota in microseconds per period.
    pub cpu_quota: i64,
    /// CPU period in microseconds.
    pub cpu_period: i64,
    /// Allocate a pseudo-TTY.
    pub tty: bool,
    /// Keep stdin open.
    pub open_stdin: bool,
}

/// Result of running a command inside a container.
///
/// Output is the combined stdout+stderr byte stream in arrival order; the
/// two descriptors are deliberately not demultiplexed.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Verbatim process exit code (-1 if the process could not be started).
    pub exit_code: i64,
    /// Combined captured output.
    pub output: Vec<u8>,
}

/// Point-in-time memory counters for a container.
///
/// Fields the runtime omits deserialize to `None` and are treated as zero
/// by consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCounters {
    /// Working-set usage in bytes.
    #[serde(default)]
    pub usage: Option<u64>,
}

/// Point-in-time CPU counters for a container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuCounters {
    /// Total CPU time consumed by the container, in nanoseconds.
    #[serde(default)]
    pub total_usage: u64,
    /// Total CPU time consumed by the host, in nanoseconds.
    #[serde(default)]
    pub system_usage: Option<u64>,
    /// Number of online CPUs. Absent on some runtimes.
    #[serde(default)]
    pub online_cpus: Option<u64>,
}

/// One non-streaming sample of a container's resource counters.
///
/// `cpu` and `precpu` are the runtime's current and previous samples; the
/// delta between them is what CPU utilization is derived from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Memory counters at sample time.
    #[serde(default)]
    pub memory: MemoryCounters,
    /// CPU counters at sample time.
    #[serde(default)]
    pub cpu: CpuCounters,
    /// CPU counters from the runtime's previous sample.
    #[serde(default)]
    pub precpu: CpuCounters,
}
