//! Real [`CommandRunner`] backed by `tokio::process`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::contract::{CommandRunner, ProcessOutput, TransferError};

/// Spawns the command as a child process, captures its output and kills it if
/// it outlives the timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

async fn read_all<R>(pipe: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        command: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, TransferError> {
        let Some((program, args)) = command.split_first() else {
            return Err(TransferError::BadResponse {
                code: None,
                reason: "empty command".to_string(),
            });
        };
        debug!(command = %command.join(" "), timeout_secs = timeout.as_secs(), "Running command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!(error = ?e, program = %program, "Failed to launch command");
                TransferError::BadResponse {
                    code: None,
                    reason: format!("failed to launch {program}: {e}"),
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // The bound covers draining the pipes too: a background process left
        // behind by the tool can keep them open after the child exits.
        let finished = async {
            tokio::join!(child.wait(), read_all(stdout), read_all(stderr))
        };

        let (status, stdout, stderr) = match tokio::time::timeout(timeout, finished).await {
            Ok((Ok(status), stdout, stderr)) => (status, stdout, stderr),
            Ok((Err(e), _, _)) => {
                error!(error = ?e, program = %program, "Failed to wait for command");
                let _ = child.kill().await;
                return Err(TransferError::BadResponse {
                    code: None,
                    reason: format!("failed to wait for {program}: {e}"),
                });
            }
            Err(_) => {
                warn!(
                    program = %program,
                    timeout_secs = timeout.as_secs(),
                    "Command expired by timeout, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(error = ?e, program = %program, "Failed to kill timed out command");
                }
                return Err(TransferError::Timeout { timeout });
            }
        };

        let output = ProcessOutput {
            code: status.code(),
            stdout,
            stderr,
        };

        if !status.success() {
            warn!(
                program = %program,
                status = %status,
                stderr = %output.stderr_lossy().trim(),
                "Command returned a bad exit status"
            );
            debug!(stdout = %output.stdout_lossy(), "Captured stdout of failed command");
            return Err(TransferError::BadResponse {
                code: output.code,
                reason: format!("{program} exited with {status}"),
            });
        }

        debug!(
            program = %program,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Command completed"
        );
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let output = ProcessRunner::new()
            .run(&sh("echo listing; echo noise >&2"), Duration::from_secs(10))
            .await
            .expect("command should succeed");
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout_lossy().trim(), "listing");
        assert_eq!(output.stderr_lossy().trim(), "noise");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_bad_response() {
        let err = ProcessRunner::new()
            .run(&sh("exit 3"), Duration::from_secs(10))
            .await
            .unwrap_err();
        match err {
            TransferError::BadResponse { code, .. } => assert_eq!(code, Some(3)),
            other => panic!("expected BadResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_bad_response() {
        let command = vec!["ferry-test-no-such-tool".to_string()];
        let err = ProcessRunner::new()
            .run(&command, Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(err.is_bad_response(), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_command_is_a_bad_response() {
        let err = ProcessRunner::new()
            .run(&[], Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(err.is_bad_response(), "got {err:?}");
    }

    #[tokio::test]
    async fn background_process_holding_output_open_times_out() {
        let started = std::time::Instant::now();
        let err = ProcessRunner::new()
            .run(&sh("sleep 4 & echo hi"), Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn overrunning_command_times_out_and_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 2; touch '{}'", marker.display());

        let started = std::time::Instant::now();
        let err = ProcessRunner::new()
            .run(&sh(&script), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(2));

        // A surviving shell would create the marker once its sleep ends.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "timed out command kept running");
    }
}
