//! GPU tests: need an EGL implementation with pbuffer support.
//! Run with `cargo xtask hardware`.

use glhead_common::{PBUFFER_RESOLUTION, Resolution};
use glhead_scene::{Frame, GlRenderer, ReferenceRenderer, Renderer, Scene};
use glhead_surface::EglSession;

fn render_pbuffer(size: Resolution) -> Frame {
    let session = EglSession::pbuffer(size).expect("EGL pbuffer session");
    let gl = session.load_gl();
    let renderer = GlRenderer::new(&gl);
    assert!(renderer.configure_viewport(size).matches());
    renderer.render(&Scene::triangle(), size).unwrap()
}

fn render_reference(size: Resolution) -> Frame {
    ReferenceRenderer::new()
        .render(&Scene::triangle(), size)
        .unwrap()
}

/// Channel-wise distance of at most 1, to allow for colour rounding.
fn assert_close(gpu: [u8; 3], expected: [u8; 3], what: &str) {
    let delta = gpu.iter().zip(expected).map(|(g, e)| g.abs_diff(e)).max();
    assert!(
        delta <= Some(1),
        "{what} is {gpu:?}, expected {expected:?}"
    );
}

#[test]
#[ignore = "requires an EGL device"]
fn pbuffer_frame_is_800x600_rgb() {
    let frame = render_pbuffer(PBUFFER_RESOLUTION);
    assert_eq!(frame.as_bytes().len(), 800 * 600 * 3);
    assert_close(frame.center(), [255, 0, 128], "centre");
}

#[test]
#[ignore = "requires an EGL device"]
fn pbuffer_frame_matches_reference() {
    let gpu = render_pbuffer(PBUFFER_RESOLUTION);
    let cpu = render_reference(PBUFFER_RESOLUTION);

    assert_close(gpu.center(), cpu.center(), "centre");
    assert_eq!(gpu.corners()[2], [0, 0, 0]);
    assert_eq!(gpu.corners()[3], [0, 0, 0]);

    // Rasterization rules may differ on edge pixels only.
    let cmp = gpu.compare(&cpu, 1).unwrap();
    assert!(cmp.differing < 2 * 600, "{} pixels differ", cmp.differing);
}

#[test]
#[ignore = "requires an EGL device"]
fn two_runs_are_byte_identical() {
    let a = render_pbuffer(PBUFFER_RESOLUTION);
    let b = render_pbuffer(PBUFFER_RESOLUTION);
    assert_close(a.center(), [255, 0, 128], "centre");
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
#[ignore = "requires an EGL device"]
fn odd_width_reads_back_without_padding() {
    let size = Resolution::new(333, 101);
    let gpu = render_pbuffer(size);
    let cpu = render_reference(size);
    assert_eq!(gpu.as_bytes().len(), 333 * 101 * 3);
    assert_close(gpu.center(), cpu.center(), "centre");

    // Padded rows would shift every upper row sideways.
    assert_close(gpu.pixel(195, 75), cpu.pixel(195, 75), "pixel (195, 75)");
    assert_eq!(gpu.pixel(332, 100), [0, 0, 0]);
    let cmp = gpu.compare(&cpu, 1).unwrap();
    assert!(cmp.differing < 2 * 101, "{} pixels differ", cmp.differing);
}
