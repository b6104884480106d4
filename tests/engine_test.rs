mod helpers;

use std::sync::Arc;

use helpers::{RecordingExecutor, ScriptedResponse};
use stackops::engine::{ContainerEngine, RunSpec, Runtime};

#[test]
fn registry_login_builds_expected_argv() {
    let executor = Arc::new(RecordingExecutor::succeeding());
    let engine = ContainerEngine::new(Runtime::Podman, executor.clone());

    engine
        .registry_login("registry.example.com", "robot", "hunter2")
        .expect("login should succeed");

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "podman");
    assert_eq!(
        calls[0].args,
        vec![
            "login",
            "--username",
            "robot",
            "--password",
            "hunter2",
            "registry.example.com",
        ]
    );
}

#[test]
fn registry_login_masks_password_in_command_line() {
    let executor = Arc::new(RecordingExecutor::succeeding());
    let engine = ContainerEngine::new(Runtime::Podman, executor.clone());

    engine
        .registry_login("registry.example.com", "robot", "hunter2")
        .expect("login should succeed");

    let line = &executor.command_lines()[0];
    assert!(!line.contains("hunter2"), "password leaked: {}", line);
    assert!(line.contains("***"));
}

#[test]
fn registry_login_failure_is_an_error() {
    let executor = Arc::new(RecordingExecutor::with_responses(vec![ScriptedResponse {
        op: "login",
        exit_code: 1,
        stdout: String::new(),
    }]));
    let engine = ContainerEngine::new(Runtime::Podman, executor);

    let err = engine
        .registry_login("registry.example.com", "robot", "wrong")
        .unwrap_err();
    assert!(err.to_string().contains("registry.example.com"));
}

#[test]
fn pull_image_uses_full_reference() {
    let executor = Arc::new(RecordingExecutor::succeeding());
    let engine = ContainerEngine::new(Runtime::Docker, executor.clone());

    engine
        .pull_image("registry.example.com/cloud-ops/ops-image", "2.4.20230630")
        .expect("pull should succeed");

    let calls = executor.calls();
    assert_eq!(calls[0].command, "docker");
    assert_eq!(
        calls[0].args,
        vec!["pull", "registry.example.com/cloud-ops/ops-image:2.4.20230630"]
    );
}

#[test]
fn run_builds_env_volumes_and_command() {
    let executor = Arc::new(RecordingExecutor::succeeding());
    let engine = ContainerEngine::new(Runtime::Podman, executor.clone());

    let spec = RunSpec {
        name: "demo-backup-stack-0a1b2c3d".to_string(),
        image: "registry.example.com/cloud-ops/ops-image:2.4.20230630".to_string(),
        command: vec![
            "redhat.ansible_on_clouds.aws_backup_stack".to_string(),
            "-e".to_string(),
            "aws_region=us-east-1".to_string(),
        ],
        env: vec![("PLATFORM".to_string(), "AWS".to_string())],
        volumes: vec!["/tmp/creds:/home/runner/.aws/credentials:ro".to_string()],
    };

    let run = engine.run(&spec).expect("run should succeed");
    assert!(run.success);

    let calls = executor.calls();
    assert_eq!(
        calls[0].args,
        vec![
            "run",
            "--name",
            "demo-backup-stack-0a1b2c3d",
            "--env",
            "PLATFORM=AWS",
            "--volume",
            "/tmp/creds:/home/runner/.aws/credentials:ro",
            "registry.example.com/cloud-ops/ops-image:2.4.20230630",
            "redhat.ansible_on_clouds.aws_backup_stack",
            "-e",
            "aws_region=us-east-1",
        ]
    );
}

#[test]
fn run_reports_container_failure_without_error() {
    let executor = Arc::new(RecordingExecutor::with_responses(vec![ScriptedResponse {
        op: "run",
        exit_code: 2,
        stdout: "fatal: playbook failed".to_string(),
    }]));
    let engine = ContainerEngine::new(Runtime::Podman, executor);

    let spec = RunSpec {
        name: "demo".to_string(),
        image: "image:latest".to_string(),
        command: vec!["playbook".to_string()],
        env: Vec::new(),
        volumes: Vec::new(),
    };

    let run = engine.run(&spec).expect("non-zero exit is not an engine error");
    assert!(!run.success);
    assert_eq!(run.exit_code, Some(2));
    assert_eq!(run.output, "fatal: playbook failed");
}

#[test]
fn remove_container_forces_removal() {
    let executor = Arc::new(RecordingExecutor::succeeding());
    let engine = ContainerEngine::new(Runtime::Podman, executor.clone());

    engine
        .remove_container("demo-backup-stack-0a1b2c3d")
        .expect("removal should succeed");

    let calls = executor.calls();
    assert_eq!(
        calls[0].args,
        vec!["rm", "--force", "demo-backup-stack-0a1b2c3d"]
    );
}
