//! Integration tests for runbox-runtime.
//!
//! These tests require a running Docker daemon and the `alpine:3.19`
//! image (pulled on first run).
//!
//! Run with: `cargo test -p runbox-runtime -- --ignored`

use runbox_runtime::{ContainerRuntime, CreateSpec, DockerRuntime};

fn alpine_spec(name: &str) -> CreateSpec {
    CreateSpec {
        image: "alpine:3.19".to_string(),
        name: name.to_string(),
        command: vec!["/bin/sh".to_string()],
        working_dir: "/tmp".to_string(),
        network_disabled: true,
        memory_bytes: 256 * 1024 * 1024,
        cpu_quota: 50_000,
        cpu_period: 100_000,
        tty: true,
        open_stdin: true,
    }
}

/// Full lifecycle: create -> start -> running -> kill -> remove.
#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_container_lifecycle() {
    let runtime = DockerRuntime::connect().expect("connect to Docker");
    runtime.ping().await.expect("daemon reachable");

    if !runtime.image_exists("alpine:3.19").await.expect("inspect") {
        runtime.pull_image("alpine:3.19").await.expect("pull");
    }

    let handle = runtime
        .create(&alpine_spec("runbox-test-lifecycle"))
        .await
        .expect("create container");
    runtime.start(&handle).await.expect("start container");

    let status = runtime.reload_status(&handle).await.expect("status");
    assert!(status.is_running());

    runtime.kill(&handle).await.expect("kill container");
    runtime.remove(&handle).await.expect("remove container");
}

/// Exec captures combined output and the verbatim exit code.
#[tokio::test]
#[ignore = "requires a running Docker daemon"]
async fn test_exec_combined_output() {
    let runtime = DockerRuntime::connect().expect("connect to Docker");

    if !runtime.image_exists("alpine:3.19").await.expect("inspect") {
        runtime.pull_image("alpine:3.19").await.expect("pull");
    }

    let handle = runtime
        .create(&alpine_spec("runbox-test-exec"))
        .await
        .expect("create container");
    runtime.start(&handle).await.expect("start container");

    let cmd = vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        "echo out; echo err 1>&2; exit 7".to_string(),
    ];
    let result = runtime.exec(&handle, &cmd, "/tmp").await.expect("exec");
    let text = String::from_utf8_lossy(&result.output);

    assert_eq!(result.exit_code, 7);
    assert!(text.contains("out"));
    assert!(text.contains("err"));

    runtime.kill(&handle).await.ok();
    runtime.remove(&handle).await.expect("remove container");
}
