//! Caller side: run the `scenerun` binary and read back its result record.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use scenerun_common::error::describe_duration;
use tokio::process::Command;

use crate::outcome::{RenderOutcome, RenderRequest};

/// Render timeout plus headroom for interpreter startup and cleanup.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(330);

/// Invokes the runner binary as a child process.
#[derive(Debug, Clone)]
pub struct RunnerClient {
    binary: PathBuf,
    timeout: Duration,
    envs: Vec<(OsString, OsString)>,
}

impl RunnerClient {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_CLIENT_TIMEOUT,
            envs: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an environment variable for the runner process.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run one render through the binary. Never fails; problems come back as
    /// failure records.
    pub async fn render(&self, request: &RenderRequest) -> RenderOutcome {
        tracing::info!(
            binary = %self.binary.display(),
            scene = %request.scene,
            output = %request.output_path.display(),
            quality = %request.quality,
            "Starting runner process"
        );

        let mut cmd = Command::new(&self.binary);
        cmd.arg(&request.script)
            .arg(&request.scene)
            .arg(&request.output_path)
            .arg(request.quality.as_str())
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(error = %err, "Runner process failed to start");
                return RenderOutcome::failure(format!(
                    "Runner process failed to start: {err}"
                ));
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return RenderOutcome::failure(format!("Failed to wait on runner process: {err}"))
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Runner process timed out"
                );
                return RenderOutcome::failure(format!(
                    "Runner process timed out after {}",
                    describe_duration(self.timeout)
                ));
            }
        };

        tracing::info!(exit_code = ?output.status.code(), "Runner process exited");
        parse_runner_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            output.status.code(),
        )
    }
}

/// Recover the result record from the runner's stdout.
///
/// The record is the last non-empty line; anything before it is ignored.
pub fn parse_runner_output(stdout: &str, stderr: &str, exit_code: Option<i32>) -> RenderOutcome {
    let last_line = stdout.lines().map(str::trim).rfind(|line| !line.is_empty());

    match last_line.map(serde_json::from_str::<RenderOutcome>) {
        Some(Ok(outcome)) => outcome,
        parsed => {
            if let Some(Err(err)) = parsed {
                tracing::warn!(error = %err, "Failed to parse runner output");
            }
            let code = exit_code.map_or_else(|| "unknown".to_string(), |c| c.to_string());
            RenderOutcome::failure(format!(
                "Failed to parse runner output. Exit code: {code}. Stdout: {stdout}. Stderr: {stderr}"
            ))
        }
    }
}
