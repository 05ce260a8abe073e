use anyhow::{Context, Result, bail};
use clap::Parser;
use glhead_common::{OUTPUT_FILE, PBUFFER_RESOLUTION, Resolution};
use glhead_scene::{Frame, ReferenceRenderer, Renderer, Scene};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "glhead-inspect",
    about = "Check a raw RGB dump against the reference triangle"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Raw RGB888 dump to check
    #[arg(default_value = OUTPUT_FILE)]
    path: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value_t = PBUFFER_RESOLUTION.width)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = PBUFFER_RESOLUTION.height)]
    height: u32,

    /// Largest per-channel difference still counted as a match
    #[arg(short, long, default_value = "1")]
    tolerance: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let size = Resolution::new(cli.width, cli.height);
    if size.is_empty() {
        bail!("cannot inspect a {size} frame");
    }

    let dump = Frame::read_raw(&cli.path, size)
        .with_context(|| format!("reading {}", cli.path.display()))?;
    let reference = ReferenceRenderer::new()
        .render(&Scene::triangle(), size)
        .context("rendering the reference frame")?;

    let [bottom_left, bottom_right, top_left, top_right] = dump.corners();
    info!("{}: {size}, {} bytes", cli.path.display(), dump.as_bytes().len());
    info!("corners: bl={bottom_left:?} br={bottom_right:?} tl={top_left:?} tr={top_right:?}");
    info!("centre: {:?}", dump.center());

    let cmp = dump.compare(&reference, cli.tolerance)?;
    info!(
        "{} of {} pixels differ from the reference (max channel delta {})",
        cmp.differing,
        size.pixel_count(),
        cmp.max_delta
    );

    let expected = reference.corners();
    let mut failures = Vec::new();
    if !close(dump.center(), reference.center(), cli.tolerance) {
        failures.push(format!(
            "centre is {:?}, expected {:?}",
            dump.center(),
            reference.center()
        ));
    }
    for (name, got, want) in [("top-left", top_left, expected[2]), ("top-right", top_right, expected[3])] {
        if !close(got, want, cli.tolerance) {
            failures.push(format!("{name} corner is {got:?}, expected {want:?}"));
        }
    }

    if cmp.is_identical() {
        debug!("dump matches the reference exactly within tolerance");
    } else if failures.is_empty() {
        warn!("edge pixels differ; the triangle itself matches");
    }

    if !failures.is_empty() {
        bail!("{} does not show the triangle: {}", cli.path.display(), failures.join("; "));
    }
    info!("OK");
    Ok(())
}

fn close(a: [u8; 3], b: [u8; 3], tolerance: u8) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_the_pbuffer_dump() {
        let cli = Cli::parse_from(["glhead-inspect"]);
        assert_eq!(cli.path, PathBuf::from("triangle.raw"));
        assert_eq!((cli.width, cli.height), (800, 600));
        assert_eq!(cli.tolerance, 1);
    }

    #[test]
    fn close_respects_tolerance() {
        assert!(close([255, 0, 128], [255, 0, 127], 1));
        assert!(!close([255, 0, 128], [255, 0, 126], 1));
    }
}
