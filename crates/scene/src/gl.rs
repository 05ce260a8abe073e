use crate::frame::{Frame, FrameError};
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::shaders::{COLOR_UNIFORM, FRAGMENT_SHADER, POSITION_ATTRIBUTE, VERTEX_SHADER};
use glhead_common::Resolution;
use glow::HasContext;
use tracing::{debug, info, warn};

/// Upper bound on stale error flags drained before reading pixels back.
const MAX_PENDING_ERRORS: usize = 16;

/// Errors from the GL renderer.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to create GL {what}: {reason}")]
    Create { what: &'static str, reason: String },
    #[error("glReadPixels failed with GL error {code:#06x}")]
    Readback { code: u32 },
    #[error("glViewport returned incorrect values: asked for {requested}, got {reported}")]
    Viewport {
        requested: Resolution,
        reported: Resolution,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Viewport requested from GL versus what `GL_VIEWPORT` reports back.
///
/// Broken EGL stacks accept `glViewport` but report something else, so the
/// demos check this before trusting any output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportReport {
    pub requested: Resolution,
    pub reported: Resolution,
}

/// What a program does when `GL_VIEWPORT` disagrees with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportPolicy {
    /// Log a warning and keep rendering.
    Warn,
    /// Refuse to render.
    Require,
}

impl ViewportReport {
    pub fn matches(&self) -> bool {
        self.requested == self.reported
    }

    /// Apply `policy` to a mismatch. A matching viewport is always accepted.
    pub fn enforce(&self, policy: ViewportPolicy) -> Result<(), SceneError> {
        if self.matches() {
            return Ok(());
        }
        match policy {
            ViewportPolicy::Warn => {
                warn!(
                    "glViewport returned incorrect values: asked for {}, got {}",
                    self.requested, self.reported
                );
                Ok(())
            }
            ViewportPolicy::Require => Err(SceneError::Viewport {
                requested: self.requested,
                reported: self.reported,
            }),
        }
    }
}

/// OpenGL ES 2 renderer drawing into whatever surface is current.
pub struct GlRenderer<'gl> {
    gl: &'gl glow::Context,
}

impl<'gl> GlRenderer<'gl> {
    pub fn new(gl: &'gl glow::Context) -> Self {
        Self { gl }
    }

    /// Set the viewport to cover `size` and read it back.
    pub fn configure_viewport(&self, size: Resolution) -> ViewportReport {
        let mut viewport = [0i32; 4];
        unsafe {
            self.gl
                .viewport(0, 0, size.width as i32, size.height as i32);
            self.gl
                .get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);
        }
        let reported = Resolution::new(viewport[2].max(0) as u32, viewport[3].max(0) as u32);
        info!("GL Viewport size: {reported}");

        ViewportReport {
            requested: size,
            reported,
        }
    }
}

impl Renderer for GlRenderer<'_> {
    fn render(&self, scene: &Scene, size: Resolution) -> Result<Frame, SceneError> {
        let gl = self.gl;

        let frame = unsafe {
            let clear = scene.clear_color;
            gl.clear_color(clear.x, clear.y, clear.z, clear.w);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            // Compile and link status are not checked: a broken shader shows
            // up as a frame without the triangle.
            let program = gl.create_program().map_err(|reason| SceneError::Create {
                what: "program",
                reason,
            })?;
            let vert = compile(gl, glow::VERTEX_SHADER, VERTEX_SHADER)?;
            let frag = compile(gl, glow::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
            gl.attach_shader(program, frag);
            gl.attach_shader(program, vert);
            gl.link_program(program);
            gl.use_program(Some(program));
            debug!("shader program linked");

            let vbo = gl.create_buffer().map_err(|reason| SceneError::Create {
                what: "vertex buffer",
                reason,
            })?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&scene.vertices),
                glow::STATIC_DRAW,
            );

            let color = gl.get_uniform_location(program, COLOR_UNIFORM);
            let c = scene.color;
            gl.uniform_4_f32(color.as_ref(), c.x, c.y, c.z, c.w);

            match gl.get_attrib_location(program, POSITION_ATTRIBUTE) {
                Some(pos) => {
                    gl.enable_vertex_attrib_array(pos);
                    gl.vertex_attrib_pointer_f32(pos, 3, glow::FLOAT, false, 3 * 4, 0);
                }
                None => warn!("attribute `{POSITION_ATTRIBUTE}` not found; the program did not link"),
            }

            gl.draw_arrays(glow::TRIANGLES, 0, scene.vertices.len() as i32);

            // Errors raised while drawing are not ours to report; clear them so
            // the check below only sees the readback.
            for _ in 0..MAX_PENDING_ERRORS {
                match gl.get_error() {
                    glow::NO_ERROR => break,
                    code => debug!("GL error {code:#06x} pending before readback"),
                }
            }

            // RGBA/UNSIGNED_BYTE is the one readback format GLES guarantees.
            let mut rgba = vec![0u8; size.pixel_count() * 4];
            gl.read_pixels(
                0,
                0,
                size.width as i32,
                size.height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut rgba),
            );
            let readback = gl.get_error();

            gl.use_program(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.delete_buffer(vbo);
            gl.delete_shader(vert);
            gl.delete_shader(frag);
            gl.delete_program(program);

            if readback != glow::NO_ERROR {
                return Err(SceneError::Readback { code: readback });
            }
            Frame::from_rgba(size, &rgba)?
        };

        debug!("read back {} bytes", frame.as_bytes().len());
        Ok(frame)
    }
}

unsafe fn compile(
    gl: &glow::Context,
    kind: u32,
    source: &str,
) -> Result<glow::Shader, SceneError> {
    unsafe {
        let shader = gl.create_shader(kind).map_err(|reason| SceneError::Create {
            what: "shader",
            reason,
        })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_report_matches_only_on_equal_sizes() {
        let ok = ViewportReport {
            requested: Resolution::new(800, 600),
            reported: Resolution::new(800, 600),
        };
        assert!(ok.matches());

        let broken = ViewportReport {
            requested: Resolution::new(800, 600),
            reported: Resolution::new(0, 0),
        };
        assert!(!broken.matches());
    }

    #[test]
    fn warn_policy_accepts_a_mismatch() {
        let broken = ViewportReport {
            requested: Resolution::new(800, 600),
            reported: Resolution::new(0, 0),
        };
        assert!(broken.enforce(ViewportPolicy::Warn).is_ok());
    }

    #[test]
    fn require_policy_rejects_a_mismatch() {
        let broken = ViewportReport {
            requested: Resolution::new(1920, 1080),
            reported: Resolution::new(800, 600),
        };
        match broken.enforce(ViewportPolicy::Require) {
            Err(SceneError::Viewport {
                requested,
                reported,
            }) => {
                assert_eq!(requested, Resolution::new(1920, 1080));
                assert_eq!(reported, Resolution::new(800, 600));
            }
            other => panic!("expected Viewport error, got: {other:?}"),
        }
    }

    #[test]
    fn both_policies_accept_a_match() {
        let ok = ViewportReport {
            requested: Resolution::new(1366, 768),
            reported: Resolution::new(1366, 768),
        };
        assert!(ok.enforce(ViewportPolicy::Warn).is_ok());
        assert!(ok.enforce(ViewportPolicy::Require).is_ok());
    }

    #[test]
    fn readback_error_reports_the_gl_code() {
        let err = SceneError::Readback {
            code: glow::INVALID_OPERATION,
        };
        assert_eq!(
            err.to_string(),
            "glReadPixels failed with GL error 0x0502"
        );
    }

    #[test]
    fn create_error_names_the_object() {
        let err = SceneError::Create {
            what: "shader",
            reason: "out of memory".into(),
        };
        assert_eq!(err.to_string(), "failed to create GL shader: out of memory");
    }
}
