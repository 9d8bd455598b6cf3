//! scenerun CLI — render one Manim scene and print the result as JSON.
//!
//! Usage:
//!   scenerun <SCRIPT_CONTENT> <SCENE_NAME> <OUTPUT_PATH> <QUALITY>
//!   scenerun --check
//!
//! Standard output carries exactly one JSON object; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use scenerun_common::config::AppConfig;
use scenerun_render_engine::{Quality, RenderOutcome, RenderRequest};

mod commands;

const USAGE: &str = "Usage: scenerun <script_content> <scene_name> <output_path> <quality>";

#[derive(Parser)]
#[command(
    name = "scenerun",
    about = "Render a Manim scene and report the result as JSON",
    version,
    author
)]
struct Cli {
    /// Python source of the Manim script
    #[arg(required_unless_present = "check", allow_hyphen_values = true)]
    script_content: Option<String>,

    /// Scene class to render
    #[arg(required_unless_present = "check", allow_hyphen_values = true)]
    scene_name: Option<String>,

    /// Where the rendered video is written
    #[arg(required_unless_present = "check", allow_hyphen_values = true)]
    output_path: Option<PathBuf>,

    /// Render quality: low or high
    #[arg(required_unless_present = "check", allow_hyphen_values = true)]
    quality: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON on stderr
    #[arg(long)]
    log_json: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/scenerun/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Python interpreter that hosts Manim
    #[arg(long, value_name = "PATH")]
    python: Option<PathBuf>,

    /// Render timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Check that the renderer can be started, then exit
    #[arg(long, conflicts_with = "script_content")]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            commands::emit(&RenderOutcome::failure(USAGE))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            commands::emit(&RenderOutcome::failure(format!("Runner error: {e}")))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(python) = cli.python {
        config.renderer.python = python;
    }
    if let Some(secs) = cli.timeout_secs {
        config.renderer.timeout_secs = secs;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.log_json {
        config.logging.json = true;
    }

    scenerun_common::logging::init_logging(&config.logging);

    if cli.check {
        return commands::check::run(&config.renderer).await;
    }

    // clap enforces all four positionals when --check is absent.
    let (Some(script), Some(scene), Some(output_path), Some(quality)) = (
        cli.script_content,
        cli.scene_name,
        cli.output_path,
        cli.quality,
    ) else {
        commands::emit(&RenderOutcome::failure(USAGE))?;
        return Ok(ExitCode::FAILURE);
    };

    let request = RenderRequest {
        script,
        scene,
        output_path,
        quality: Quality::parse(&quality),
    };
    commands::render::run(config.renderer, request).await
}
