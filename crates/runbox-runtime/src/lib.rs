//! # runbox-runtime
//!
//! Container runtime layer for runbox sandboxes.
//!
//! This crate defines the [`ContainerRuntime`] trait - the small set of
//! container primitives the execution pool is built on (create, start,
//! status reload, archive injection, exec, stats, kill, remove) - together
//! with the data models those primitives exchange, and a [`DockerRuntime`]
//! implementation backed by the Docker Engine API via bollard.
//!
//! Keeping the trait in its own crate lets the orchestration layer be
//! tested against an in-memory fake and lets the backend be swapped
//! without touching pool logic.

mod docker;
mod error;
mod models;
mod runtime;

pub use docker::DockerRuntime;
pub use error::{Result, RuntimeError};
pub use models::{
    ContainerHandle, ContainerStatus, CpuCounters, CreateSpec, ExecOutput, MemoryCounters,
    StatsSnapshot,
};
pub use runtime::ContainerRuntime;
