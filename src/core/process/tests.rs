// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::builder::{ProcessBuilder, ProcessFlags};
use crate::error::ProcessError;

#[cfg(not(windows))]
fn sh(script: &str) -> ProcessBuilder {
    ProcessBuilder::new("sh").args(["-c", script])
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_echo() {
    let output = ProcessBuilder::new("echo")
        .arg("hello")
        .capture_output()
        .run()
        .await
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout().trim(), @"hello");
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_exit_code_allowed() {
    let output = sh("exit 42")
        .flag(ProcessFlags::ALLOW_FAILURE)
        .run()
        .await
        .expect("process should complete");

    assert_eq!(output.exit_code(), 42);
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_exit_code_rejected() {
    let err = sh("exit 3")
        .name("failing")
        .run()
        .await
        .expect_err("non-zero exit should fail");

    match err.downcast_ref::<ProcessError>() {
        Some(ProcessError::NonZeroExit { command, code }) => {
            assert_eq!(command, "failing");
            assert_eq!(*code, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_success_codes() {
    let output = sh("exit 1")
        .success_codes([0, 1])
        .run()
        .await
        .expect("exit 1 is accepted");
    assert_eq!(output.exit_code(), 1);
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_output_is_logged_unless_captured() {
    let logged = sh("echo out; echo err >&2")
        .run()
        .await
        .expect("process should succeed");
    assert_eq!(logged.stdout(), "");
    assert_eq!(logged.stderr(), "");

    let captured = sh("echo out; echo err >&2")
        .capture_output()
        .run()
        .await
        .expect("process should succeed");
    assert_eq!(captured.stdout(), "out");
    assert_eq!(captured.stderr(), "err");
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_env() {
    let output = sh("echo $SPLINES_TEST_VAR")
        .env("SPLINES_TEST_VAR", "test_value")
        .capture_stdout()
        .run()
        .await
        .expect("process should succeed");

    insta::assert_snapshot!(output.stdout().trim(), @"test_value");
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let output = ProcessBuilder::new("pwd")
        .cwd(dir.path())
        .capture_stdout()
        .run()
        .await
        .expect("pwd should succeed");

    let reported = std::path::PathBuf::from(output.stdout().trim());
    assert_eq!(
        reported.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_timeout() {
    let err = sh("sleep 5")
        .timeout(Duration::from_millis(100))
        .run()
        .await
        .expect_err("sleep should time out");

    assert!(matches!(
        err.downcast_ref::<ProcessError>(),
        Some(ProcessError::Timeout { .. })
    ));
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_process_cancellation() {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let output = sh("sleep 5")
        .run_with_cancellation(token)
        .await
        .expect("cancelled process is not an error");

    assert!(output.is_interrupted());
}

#[tokio::test]
async fn test_process_already_cancelled_does_not_spawn() {
    let token = CancellationToken::new();
    token.cancel();

    let output = ProcessBuilder::new("nonexistent_program_12345")
        .run_with_cancellation(token)
        .await
        .expect("nothing is spawned");
    assert!(output.is_interrupted());
}

#[tokio::test]
async fn test_process_spawn_failure() {
    let err = ProcessBuilder::new("nonexistent_program_12345")
        .run()
        .await
        .expect_err("spawn should fail");

    assert!(matches!(
        err.downcast_ref::<ProcessError>(),
        Some(ProcessError::SpawnFailed { .. })
    ));
}

#[test]
fn test_command_line_quotes_spaces() {
    let builder = ProcessBuilder::new("cmake").args(["-G", "MinGW Makefiles"]);
    insta::assert_snapshot!(builder.command_line(), @r#"cmake -G "MinGW Makefiles""#);
}

#[test]
fn test_configured_executable() {
    let explicit = ProcessBuilder::configured(std::path::Path::new("/opt/cmake/bin/cmake"), "cmake")
        .expect("explicit path is used as given");
    assert_eq!(
        explicit.program(),
        &std::path::PathBuf::from("/opt/cmake/bin/cmake")
    );

    let missing = ProcessBuilder::configured(std::path::Path::new(""), "nonexistent_program_12345");
    assert!(matches!(
        missing,
        Err(ProcessError::ExecutableNotFound { .. })
    ));
}

#[test]
fn test_executable_lookup_not_found() {
    let program = "nonexistent_program_12345";

    let which_result = ProcessBuilder::which(program);
    assert!(which_result.is_err());
    let err_msg = format!("{}", which_result.unwrap_err());
    assert!(err_msg.contains(program), "error should mention the program: {err_msg}");

    assert!(ProcessBuilder::find(program).is_none());
}

#[cfg(not(windows))]
#[test]
fn test_executable_lookup_found() {
    let path = ProcessBuilder::find("sh").expect("sh should be found");
    assert!(path.exists());
    assert!(ProcessBuilder::which("sh").is_ok());
}
