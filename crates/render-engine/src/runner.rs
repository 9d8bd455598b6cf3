//! Manim runner: writes the script to a scratch file, runs the renderer
//! against it and turns the process result into a [`RenderOutcome`].

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use scenerun_common::config::RendererConfig;
use scenerun_common::error::{describe_duration, RunnerError, RunnerResult};
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::outcome::{RenderOutcome, RenderRequest};

/// Runs the external renderer for one request at a time.
#[derive(Debug, Clone)]
pub struct ManimRunner {
    config: RendererConfig,
    timeout: Duration,
}

impl ManimRunner {
    pub fn new(config: RendererConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self { config, timeout }
    }

    /// Override the render timeout taken from the config.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Failure message reported when a render exceeds the timeout.
    pub fn timeout_message(&self) -> String {
        format!(
            "Manim execution timed out ({})",
            describe_duration(self.timeout)
        )
    }

    /// Arguments passed to the interpreter for `request`, with the script at `script_path`.
    pub fn build_args(&self, script_path: &Path, request: &RenderRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.config.program_args.iter().map(OsString::from).collect();
        args.push(script_path.as_os_str().to_owned());
        args.push(OsString::from(&request.scene));
        args.push(OsString::from("--format"));
        args.push(OsString::from(&self.config.format));
        args.push(OsString::from("--output_file"));
        args.push(request.output_path.as_os_str().to_owned());
        args.push(OsString::from(request.quality.flag()));
        if self.config.disable_caching {
            args.push(OsString::from("--disable_caching"));
        }
        args
    }

    /// Render `request`. Every failure is folded into the returned record.
    pub async fn run(&self, request: &RenderRequest) -> RenderOutcome {
        match self.try_run(request).await {
            Ok(outcome) => outcome,
            Err(RunnerError::Timeout { limit }) => {
                tracing::warn!(
                    timeout_secs = limit.as_secs_f64(),
                    scene = %request.scene,
                    "Renderer timed out"
                );
                RenderOutcome::failure(self.timeout_message())
            }
            Err(err) => {
                tracing::error!(error = %err, scene = %request.scene, "Render failed");
                RenderOutcome::failure(format!("Runner error: {err}"))
            }
        }
    }

    async fn try_run(&self, request: &RenderRequest) -> RunnerResult<RenderOutcome> {
        let started = Instant::now();

        // Dropping the handle on any early return also deletes the file.
        let script = self.write_script(&request.script)?;
        tracing::info!(
            script = %script.path().display(),
            scene = %request.scene,
            output = %request.output_path.display(),
            quality = %request.quality,
            "Created temporary script"
        );

        if let Some(parent) = request
            .output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }

        let result = self.execute(script.path(), request).await;
        remove_script(script);
        let output = result?;

        let exit_code = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::info!(
            exit_code = ?exit_code,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Renderer finished"
        );
        tracing::debug!(stdout = %stdout.trim_end(), "Renderer stdout");
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim_end(), "Renderer stderr");
        }

        if output.status.success() {
            match std::fs::metadata(&request.output_path) {
                Ok(meta) if meta.is_file() => {
                    tracing::info!(
                        output = %request.output_path.display(),
                        file_size = meta.len(),
                        "Render complete"
                    );
                    return Ok(RenderOutcome::rendered(
                        request.output_path.clone(),
                        meta.len(),
                        stdout,
                        stderr,
                    ));
                }
                _ => tracing::warn!(
                    output = %request.output_path.display(),
                    "Renderer exited cleanly but produced no output file"
                ),
            }
        }

        Ok(RenderOutcome::renderer_failed(exit_code, stdout, stderr))
    }

    fn write_script(&self, source: &str) -> RunnerResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scenerun-").suffix(".py");

        let mut file = match &self.config.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(source.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    async fn execute(
        &self,
        script_path: &Path,
        request: &RenderRequest,
    ) -> RunnerResult<std::process::Output> {
        let args = self.build_args(script_path, request);
        tracing::debug!(
            command = %command_line(&self.config.python, &args),
            "Running renderer"
        );

        let mut cmd = Command::new(&self.config.python);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| RunnerError::spawn(&self.config.python, e))?;
        tracing::info!(
            pid = ?child.id(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Renderer process started"
        );

        // On elapse the child is dropped, and kill_on_drop terminates it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(RunnerError::timeout(self.timeout)),
        }
    }
}

/// Best-effort removal of the scratch script.
fn remove_script(script: NamedTempFile) {
    let path = script.path().to_path_buf();
    match script.close() {
        Ok(()) => tracing::debug!(script = %path.display(), "Cleaned up temporary script"),
        Err(err) => tracing::warn!(
            script = %path.display(),
            error = %err,
            "Failed to remove temporary script"
        ),
    }
}

fn command_line(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
