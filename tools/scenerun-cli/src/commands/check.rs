//! Check that the configured interpreter can start the renderer.

use std::io::Write;
use std::process::ExitCode;

use scenerun_common::config::RendererConfig;
use scenerun_render_engine::probe_renderer;

pub async fn run(config: &RendererConfig) -> anyhow::Result<ExitCode> {
    let report = probe_renderer(config).await;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
    stdout.flush()?;

    Ok(if report.ready {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
