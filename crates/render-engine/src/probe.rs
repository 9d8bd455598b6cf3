//! Renderer setup check.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use scenerun_common::config::RendererConfig;
use scenerun_common::error::describe_duration;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Upper bound for `--version` to answer.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Whether the configured interpreter can start the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupReport {
    pub ready: bool,
    pub interpreter: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ask the renderer for its version using the configured interpreter.
pub async fn probe_renderer(config: &RendererConfig) -> SetupReport {
    probe_with_timeout(config, PROBE_TIMEOUT).await
}

pub(crate) async fn probe_with_timeout(config: &RendererConfig, limit: Duration) -> SetupReport {
    let mut report = SetupReport {
        ready: false,
        interpreter: config.python.clone(),
        version: None,
        error: None,
    };

    let mut cmd = Command::new(&config.python);
    cmd.args(&config.program_args)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            report.error = Some(format!(
                "Failed to start {}: {err}",
                config.python.display()
            ));
            return report;
        }
    };

    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            report.error = Some(format!("Failed to wait on renderer: {err}"));
            return report;
        }
        Err(_) => {
            report.error = Some(format!(
                "Renderer did not answer --version within {}",
                describe_duration(limit)
            ));
            return report;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if output.status.success() {
        report.ready = true;
        report.version = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        tracing::info!(version = ?report.version, "Renderer is available");
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        report.error = Some(format!(
            "Renderer version check failed (status {}): {}",
            output.status,
            stderr.trim()
        ));
        tracing::warn!(status = %output.status, "Renderer version check failed");
    }

    report
}
