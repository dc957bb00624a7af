//! Docker implementation of [`ContainerRuntime`] using bollard.

use crate::error::{Result, RuntimeError};
use crate::models::{ContainerHandle, ContainerStatus, CreateSpec, ExecOutput, StatsSnapshot};
use crate::models::{CpuCounters, MemoryCounters};
use crate::runtime::ContainerRuntime;
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, KillContainerOptions,
    RemoveContainerOptions, StartContainerOptions, Stats, StatsOptions, UploadToContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::service::HostConfig;
use bollard::Docker;
use futures::StreamExt;

/// [`ContainerRuntime`] backed by the local Docker daemon.
///
/// Connects over the platform's default transport (Unix socket on Linux,
/// named pipe on Windows). The client is cheap to clone; all calls go
/// through the Docker Engine API.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local Docker daemon.
    ///
    /// # Errors
    /// Returns an error if the client cannot be constructed. Reachability
    /// of the daemon itself is verified by [`ContainerRuntime::ping`].
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connect(e.to_string()))?;
        tracing::debug!("Docker client connected with local defaults");
        Ok(Self { docker })
    }

    /// Wrap an existing bollard client.
    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

fn map_cpu(cpu: &bollard::container::CPUStats) -> CpuCounters {
    CpuCounters {
        total_usage: cpu.cpu_usage.total_usage,
        system_usage: cpu.system_cpu_usage,
        online_cpus: cpu.online_cpus,
    }
}

fn map_stats(stats: Stats) -> StatsSnapshot {
    StatsSnapshot {
        memory: MemoryCounters {
            usage: stats.memory_stats.usage,
        },
        cpu: map_cpu(&stats.cpu_stats),
        precpu: map_cpu(&stats.precpu_stats),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .map_err(|e| RuntimeError::Connect(e.to_string()))?;
        Ok(())
    }

    async fn image_exists(&self, reference: &str) -> Result<bool> {
        match self.docker.inspect_image(reference).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn pull_image(&self, reference: &str) -> Result<()> {
        tracing::info!(image = %reference, "Pulling image");
        let options = CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        };
        let mut progress = std::pin::pin!(self.docker.create_image(Some(options), None, None));
        while let Some(step) = progress.next().await {
            step?;
        }
        tracing::info!(image = %reference, "Image pulled");
        Ok(())
    }

    async fn create(&self, spec: &CreateSpec) -> Result<ContainerHandle> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };
        let host_config = HostConfig {
            network_mode: spec.network_disabled.then(|| "none".to_string()),
            memory: Some(spec.memory_bytes),
            cpu_quota: Some(spec.cpu_quota),
            cpu_period: Some(spec.cpu_period),
            privileged: Some(false),
            ..Default::default()
        };
        let config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.working_dir.clone()),
            tty: Some(spec.tty),
            open_stdin: Some(spec.open_stdin),
            network_disabled: Some(spec.network_disabled),
            host_config: Some(host_config),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| RuntimeError::Create(e.to_string()))?;

        for warning in &created.warnings {
            tracing::warn!(container = %spec.name, warning = %warning, "Create warning");
        }

        Ok(ContainerHandle::new(created.id, spec.name.clone()))
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<()> {
        self.docker
            .start_container(&handle.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| RuntimeError::Start(e.to_string()))
    }

    async fn reload_status(&self, handle: &ContainerHandle) -> Result<ContainerStatus> {
        let inspect = self
            .docker
            .inspect_container(&handle.id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| RuntimeError::Inspect(e.to_string()))?;

        let word = inspect
            .state
            .and_then(|state| state.status)
            .map(|status| status.to_string())
            .unwrap_or_default();
        Ok(ContainerStatus::parse(&word))
    }

    async fn inject_archive(
        &self,
        handle: &ContainerHandle,
        target_dir: &str,
        archive: Vec<u8>,
    ) -> Result<()> {
        let options = UploadToContainerOptions {
            path: target_dir.to_string(),
            ..Default::default()
        };
        self.docker
            .upload_to_container(&handle.id, Some(options), archive.into())
            .await
            .map_err(|e| RuntimeError::Inject(e.to_string()))
    }

    async fn exec(
        &self,
        handle: &ContainerHandle,
        command: &[String],
        working_dir: &str,
    ) -> Result<ExecOutput> {
        let exec = self
            .docker
            .create_exec(
                &handle.id,
                CreateExecOptions {
                    cmd: Some(command.to_vec()),
                    working_dir: Some(working_dir.to_string()),
                    env: Some(Vec::new()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    attach_stdin: Some(false),
                    tty: Some(false),
                    privileged: Some(false),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| RuntimeError::Exec(e.to_string()))?;

        // Single combined buffer: chunks from both descriptors are appended
        // in arrival order, never demultiplexed.
        let mut output = Vec::new();
        let started = self
            .docker
            .start_exec(&exec.id, None)
            .await
            .map_err(|e| RuntimeError::Exec(e.to_string()))?;
        if let StartExecResults::Attached {
            output: mut stream, ..
        } = started
        {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| RuntimeError::Exec(e.to_string()))?;
                output.extend_from_slice(&chunk.into_bytes());
            }
        }

        let inspect = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| RuntimeError::Exec(e.to_string()))?;
        let exit_code = inspect.exit_code.unwrap_or(-1);

        Ok(ExecOutput { exit_code, output })
    }

    async fn stats_snapshot(&self, handle: &ContainerHandle) -> Result<StatsSnapshot> {
        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let mut samples = std::pin::pin!(self.docker.stats(&handle.id, Some(options)));
        let sample = samples
            .next()
            .await
            .ok_or_else(|| RuntimeError::Stats("no sample returned".to_string()))?
            .map_err(|e| RuntimeError::Stats(e.to_string()))?;
        Ok(map_stats(sample))
    }

    async fn kill(&self, handle: &ContainerHandle) -> Result<()> {
        self.docker
            .kill_container(&handle.id, None::<KillContainerOptions<String>>)
            .await
            .map_err(|e| RuntimeError::Kill(e.to_string()))
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<()> {
        self.docker
            .remove_container(
                &handle.id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| RuntimeError::Remove(e.to_string()))
    }
}
