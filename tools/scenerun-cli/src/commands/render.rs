//! Render a scene and print the result record.

use std::process::ExitCode;

use scenerun_common::config::RendererConfig;
use scenerun_render_engine::{ManimRunner, RenderRequest};

/// A failed render still exits 0; the failure is in the record.
pub async fn run(config: RendererConfig, request: RenderRequest) -> anyhow::Result<ExitCode> {
    tracing::info!(
        scene = %request.scene,
        output = %request.output_path.display(),
        quality = %request.quality,
        interpreter = %config.python.display(),
        "Rendering scene"
    );

    let runner = ManimRunner::new(config);
    let outcome = runner.run(&request).await;
    super::emit(&outcome)?;

    Ok(ExitCode::SUCCESS)
}
