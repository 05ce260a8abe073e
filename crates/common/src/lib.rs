//! Shared types and fixed constants for the headless triangle demos.
//!
//! # Invariants
//! - Nothing here is configurable at runtime: paths and sizes are constants.

pub mod types;

pub use types::Resolution;

/// File the demos dump their rendered frame into. Overwritten on every run.
pub const OUTPUT_FILE: &str = "triangle.raw";

/// DRM device node opened by the display-backed demo.
/// `/dev/dri/card0` is the other common choice on boards with a render-only GPU.
pub const DRM_DEVICE: &str = "/dev/dri/card1";

/// Size of the off-screen pixel buffer.
pub const PBUFFER_RESOLUTION: Resolution = Resolution::new(800, 600);
