use std::fmt;

/// Bytes per pixel of an RGB888 dump.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Width and height of a drawable, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of a tightly packed RGB888 buffer of this size.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * RGB_BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u16, u16)> for Resolution {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(width.into(), height.into())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
