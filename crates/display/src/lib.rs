//! Display Driver Bridge: turns a DRM card into a native window EGL can draw
//! into, and puts the rendered frame on the monitor.
//!
//! # Invariants
//! - Exactly one connector is driven: the first one reporting `Connected`.
//! - The CRTC configuration found at open time is restored on drop.
//! - At most one buffer is held for scanout at any time.

mod card;
mod scanout;
mod select;

pub use card::Card;
pub use scanout::{DisplayError, ScanoutTarget};
