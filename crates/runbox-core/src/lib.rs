//! # runbox-core
//!
//! Per-language sandboxed execution pool.
//!
//! This crate accepts untrusted source snippets, runs them to completion
//! inside resource-constrained, network-isolated containers, and returns
//! captured output plus point-in-time resource telemetry. It keeps one
//! long-lived sandbox per language, re-validates it against the runtime
//! before every execution, and recreates it transparently when it has
//! stopped or crashed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     runbox-core                         │
//! ├─────────────────────────────────────────────────────────┤
//! │                                                         │
//! │  ┌──────────────────┐    ┌───────────────────────────┐  │
//! │  │  ExecutionPool   │───▶│  HashMap<language,        │  │
//! │  │   - execute()    │    │          PoolEntry>       │  │
//! │  │   - status()     │    └───────────────────────────┘  │
//! │  │   - warm_all()   │                                   │
//! │  │   - destroy_all()│    ┌───────────────────────────┐  │
//! │  └────────┬─────────┘───▶│  LanguageRegistry         │  │
//! │           │              │  (image, extension, cmd)  │  │
//! │           ▼              └───────────────────────────┘  │
//! │  ┌──────────────────┐                                   │
//! │  │ ContainerRuntime │  create / start / reload_status   │
//! │  │ (runbox-runtime) │  inject / exec / stats / remove   │
//! │  └──────────────────┘                                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use runbox_core::{ExecutionPool, LanguageRegistry};
//! use runbox_runtime::DockerRuntime;
//! use std::sync::Arc;
//!
//! # async fn example() -> runbox_core::Result<()> {
//! let runtime = Arc::new(DockerRuntime::connect()?);
//! let pool = ExecutionPool::new(runtime, LanguageRegistry::with_defaults());
//!
//! // Eagerly create sandboxes so the first request is not cold.
//! pool.warm_all().await?;
//!
//! let result = pool.execute("python", "print('hello world')").await?;
//! assert_eq!(result.stdout, "hello world\n");
//! assert_eq!(result.exit_code, 0);
//!
//! // Orderly shutdown.
//! pool.destroy_all().await;
//! # Ok(())
//! # }
//! ```

pub mod archive;
mod error;
mod exec;
mod pool;
mod registry;
mod telemetry;

pub use error::{PoolError, Result};
pub use exec::{ExecutionResult, MAX_OUTPUT_SIZE, TRUNCATION_MARKER};
pub use pool::{ExecutionPool, PoolEntry, SANDBOX_WORKDIR};
pub use registry::{LanguageRegistry, LanguageSpec, FILEPATH_PLACEHOLDER};
pub use telemetry::ResourceUsage;

// Runtime-layer types consumers need to construct or fake a pool.
pub use runbox_runtime::{ContainerHandle, ContainerRuntime, ContainerStatus, RuntimeError};
