//! Scene Renderer and Frame Dumper: one fixed triangle, drawn either by the
//! GPU through OpenGL ES 2 or on the CPU as a reference, read back as a tightly
//! packed RGB888 frame.
//!
//! # Invariants
//! - A [`Frame`] always holds exactly `width * height * 3` bytes.
//! - Row 0 of a frame is the bottom row, matching `glReadPixels`.
//! - Rendering is deterministic: the same scene and size give the same bytes.

mod frame;
mod gl;
mod renderer;
mod scene;
mod shaders;

pub use frame::{Frame, FrameComparison, FrameError};
pub use gl::{GlRenderer, SceneError, ViewportPolicy, ViewportReport};
pub use renderer::{ReferenceRenderer, Renderer};
pub use scene::Scene;
pub use shaders::{FRAGMENT_SHADER, VERTEX_SHADER};
