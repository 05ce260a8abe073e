//! Surface Initializer: negotiates an EGL display, config, drawable and an
//! OpenGL ES 2 context without any windowing system.
//!
//! # Invariants
//! - A session is current on the calling thread from construction until drop.
//! - Teardown runs in reverse acquisition order on every path, including
//!   sessions that failed half-way through construction.
//! - A window-backed session cannot outlive the native window it draws into.

mod diagnostic;
mod session;

pub use diagnostic::Diagnostic;
pub use session::{EglSession, NativeWindow, SurfaceError};
