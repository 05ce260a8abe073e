use crate::frame::Frame;
use crate::gl::SceneError;
use crate::scene::Scene;
use glam::{Vec2, Vec4};
use glhead_common::Resolution;

/// Renderer-agnostic interface. Both the GPU path and the CPU reference
/// implement this, so their output can be compared byte for byte.
pub trait Renderer {
    /// Clear, draw `scene` once, and read the result back at `size`.
    fn render(&self, scene: &Scene, size: Resolution) -> Result<Frame, SceneError>;
}

/// CPU rasterizer producing the frame a conforming GLES implementation should
/// read back for a [`Scene`].
///
/// Samples at pixel centres, treats pixels exactly on an edge as covered, and
/// converts colours with `round(c * 255)`.
#[derive(Debug, Default)]
pub struct ReferenceRenderer;

impl ReferenceRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for ReferenceRenderer {
    fn render(&self, scene: &Scene, size: Resolution) -> Result<Frame, SceneError> {
        let mut frame = Frame::blank(size);
        let clear = to_rgb8(scene.clear_color);
        let fill = to_rgb8(scene.color);
        let [a, b, c] = scene.vertices.map(|v| v.truncate());

        // Winding decides which side of each edge is inside.
        let sign = if edge(a, b, c) < 0.0 { -1.0 } else { 1.0 };

        for y in 0..size.height {
            for x in 0..size.width {
                let p = pixel_center_ndc(x, y, size);
                let inside = sign * edge(a, b, p) >= 0.0
                    && sign * edge(b, c, p) >= 0.0
                    && sign * edge(c, a, p) >= 0.0;
                frame.set_pixel(x, y, if inside { fill } else { clear });
            }
        }
        Ok(frame)
    }
}

/// Twice the signed area of the triangle `a`, `b`, `p`.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

fn pixel_center_ndc(x: u32, y: u32, size: Resolution) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / size.width as f32 * 2.0 - 1.0,
        (y as f32 + 0.5) / size.height as f32 * 2.0 - 1.0,
    )
}

fn to_rgb8(color: Vec4) -> [u8; 3] {
    let c = (color.truncate().clamp(glam::Vec3::ZERO, glam::Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8]
}
