pub mod check;
pub mod render;

use std::io::Write;

use scenerun_render_engine::RenderOutcome;

/// Print a result record as the single line of stdout.
pub fn emit(outcome: &RenderOutcome) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", outcome.to_json_line())?;
    stdout.flush()?;
    Ok(())
}
