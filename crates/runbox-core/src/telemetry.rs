//! Resource telemetry derived from one post-execution counter snapshot.

use runbox_runtime::StatsSnapshot;
use serde::Serialize;

/// Round to two decimals, matching the precision of the result contract.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Point-in-time resource usage for a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceUsage {
    /// Working-set memory in MB.
    pub memory_used_mb: f64,
    /// CPU utilization percentage (can exceed 100 on multi-core hosts).
    pub cpu_percent: f64,
}

impl ResourceUsage {
    /// Derive usage from a single snapshot taken after command completion.
    ///
    /// This is a coarse single-sample approximation: the CPU figure comes
    /// from the delta between the runtime's current and previous counter
    /// samples rather than being integrated over the execution window, so
    /// it undercounts very short executions. Counters the runtime omits
    /// count as zero; an absent online-CPU count counts as one.
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let memory_used_mb = snapshot.memory.usage.unwrap_or(0) as f64 / (1024.0 * 1024.0);

        let cpu_delta = snapshot.cpu.total_usage as i128 - snapshot.precpu.total_usage as i128;
        let system_delta = snapshot.cpu.system_usage.unwrap_or(0) as i128
            - snapshot.precpu.system_usage.unwrap_or(0) as i128;

        let mut cpu_percent = 0.0;
        if cpu_delta > 0 && system_delta > 0 {
            let online_cpus = snapshot.cpu.online_cpus.unwrap_or(1) as f64;
            cpu_percent = (cpu_delta as f64 / system_delta as f64) * online_cpus * 100.0;
        }

        Self {
            memory_used_mb: round2(memory_used_mb),
            cpu_percent: round2(cpu_percent),
        }
    }
}
