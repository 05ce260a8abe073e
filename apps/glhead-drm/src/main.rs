use anyhow::{Context, Result};
use clap::Parser;
use glhead_common::{DRM_DEVICE, OUTPUT_FILE};
use glhead_display::ScanoutTarget;
use glhead_scene::{GlRenderer, Renderer, Scene, ViewportPolicy};
use glhead_surface::EglSession;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// A scanout viewport that disagrees with the mode is not worth dumping.
const VIEWPORT_POLICY: ViewportPolicy = ViewportPolicy::Require;

#[derive(Parser)]
#[command(
    name = "glhead-drm",
    about = "Render a triangle on the first connected monitor via DRM/GBM/EGL and dump it to triangle.raw"
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

    run(Path::new(DRM_DEVICE), Path::new(OUTPUT_FILE))
}

/// Errors before the frame is read back abort the run and leave `output`
/// alone. Failing to write the dump or to present it is only logged.
fn run(device: &Path, output: &Path) -> Result<()> {
    // Locals drop in reverse: GL, then EGL, then GBM and the CRTC restore.
    let target = ScanoutTarget::open(device)
        .with_context(|| format!("preparing a scanout surface on {}", device.display()))?;
    let size = target.resolution();
    let session = EglSession::window(&target).context("setting up EGL on the GBM surface")?;
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

    // Needs DRM master; without it the dump above is still a valid result.
    if let Err(err) = target.present(&session) {
        error!("failed to present the frame on {}: {err}", device.display());
    }

    Ok(())
}
