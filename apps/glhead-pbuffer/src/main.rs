use anyhow::{Context, Result};
use clap::Parser;
use glhead_common::{OUTPUT_FILE, PBUFFER_RESOLUTION};
use glhead_scene::{GlRenderer, Renderer, Scene, ViewportPolicy};
use glhead_surface::EglSession;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Some EGL stacks misreport `GL_VIEWPORT` on pbuffers yet render fine.
const VIEWPORT_POLICY: ViewportPolicy = ViewportPolicy::Warn;

#[derive(Parser)]
#[command(
    name = "glhead-pbuffer",
    about = "Render a triangle off-screen with EGL and dump it to triangle.raw"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    run(Path::new(OUTPUT_FILE))
}

fn run(output: &Path) -> Result<()> {
    let size = PBUFFER_RESOLUTION;
    let session = EglSession::pbuffer(size).context("setting up the EGL pbuffer")?;
    let gl = session.load_gl();
    let renderer = GlRenderer::new(&gl);

    renderer.configure_viewport(size).enforce(VIEWPORT_POLICY)?;

    let frame = renderer
        .render(&Scene::triangle(), size)
        .context("rendering the triangle")?;

    match frame.write_raw(output) {
        Ok(()) => info!("wrote {} bytes to {}", frame.as_bytes().len(), output.display()),
        Err(err) => error!("failed to write {}: {err}", output.display()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use glhead_common::Resolution;
    use glhead_scene::ViewportReport;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn viewport_mismatch_only_warns() {
        let report = ViewportReport {
            requested: PBUFFER_RESOLUTION,
            reported: Resolution::new(0, 0),
        };
        assert!(report.enforce(VIEWPORT_POLICY).is_ok());
    }

    #[test]
    #[ignore = "requires an EGL device"]
    fn run_writes_an_800x600_dump() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join(OUTPUT_FILE);

        run(&output).unwrap();
        assert_eq!(std::fs::metadata(&output).unwrap().len(), 800 * 600 * 3);
    }
}
