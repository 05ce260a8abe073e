use glhead_common::Resolution;
use glhead_common::types::RGB_BYTES_PER_PIXEL;
use std::path::Path;

const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Errors from building, reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame size mismatch: {resolution} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        resolution: Resolution,
        expected: usize,
        actual: usize,
    },
    #[error("cannot compare a {left} frame with a {right} frame")]
    ResolutionMismatch { left: Resolution, right: Resolution },
}

/// A tightly packed RGB888 image, bottom row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    resolution: Resolution,
    pixels: Vec<u8>,
}

/// Result of comparing two frames of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComparison {
    /// Pixels with at least one channel off by more than the tolerance.
    pub differing: usize,
    /// Largest per-channel difference seen anywhere.
    pub max_delta: u8,
}

impl FrameComparison {
    pub fn is_identical(&self) -> bool {
        self.differing == 0
    }
}

impl Frame {
    /// All-black frame.
    pub fn blank(resolution: Resolution) -> Self {
        Self {
            resolution,
            pixels: vec![0; resolution.byte_len()],
        }
    }

    pub fn from_raw(resolution: Resolution, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let expected = resolution.byte_len();
        if pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                resolution,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { resolution, pixels })
    }

    /// Pack an RGBA8888 readback into RGB888, dropping alpha.
    pub fn from_rgba(resolution: Resolution, rgba: &[u8]) -> Result<Self, FrameError> {
        let expected = resolution.pixel_count() * RGBA_BYTES_PER_PIXEL;
        if rgba.len() != expected {
            return Err(FrameError::SizeMismatch {
                resolution,
                expected,
                actual: rgba.len(),
            });
        }
        let pixels = rgba
            .chunks_exact(RGBA_BYTES_PER_PIXEL)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Ok(Self { resolution, pixels })
    }

    /// Read a headerless dump previously written by [`Frame::write_raw`].
    pub fn read_raw(path: impl AsRef<Path>, resolution: Resolution) -> Result<Self, FrameError> {
        let pixels = std::fs::read(path)?;
        Self::from_raw(resolution, pixels)
    }

    /// Write the pixels verbatim, replacing any existing file.
    pub fn write_raw(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        std::fs::write(path, &self.pixels)?;
        Ok(())
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB at column `x`, row `y` counted from the bottom.
    ///
    /// Panics if the coordinate is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.pixels[i..i + RGB_BYTES_PER_PIXEL].copy_from_slice(&rgb);
    }

    /// Colours of the bottom-left, bottom-right, top-left and top-right pixels.
    pub fn corners(&self) -> [[u8; 3]; 4] {
        let (right, top) = self.last_coords();
        [
            self.pixel(0, 0),
            self.pixel(right, 0),
            self.pixel(0, top),
            self.pixel(right, top),
        ]
    }

    /// Colour of the pixel at the centre of the frame.
    pub fn center(&self) -> [u8; 3] {
        self.pixel(self.resolution.width / 2, self.resolution.height / 2)
    }

    pub fn compare(&self, other: &Frame, tolerance: u8) -> Result<FrameComparison, FrameError> {
        if self.resolution != other.resolution {
            return Err(FrameError::ResolutionMismatch {
                left: self.resolution,
                right: other.resolution,
            });
        }

        let mut result = FrameComparison {
            differing: 0,
            max_delta: 0,
        };
        for (a, b) in self
            .pixels
            .chunks_exact(RGB_BYTES_PER_PIXEL)
            .zip(other.pixels.chunks_exact(RGB_BYTES_PER_PIXEL))
        {
            let delta = a
                .iter()
                .zip(b)
                .map(|(x, y)| x.abs_diff(*y))
                .max()
                .unwrap_or(0);
            result.max_delta = result.max_delta.max(delta);
            if delta > tolerance {
                result.differing += 1;
            }
        }
        Ok(result)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.resolution.width && y < self.resolution.height,
            "pixel ({x}, {y}) outside {} frame",
            self.resolution
        );
        (y as usize * self.resolution.width as usize + x as usize) * RGB_BYTES_PER_PIXEL
    }

    fn last_coords(&self) -> (u32, u32) {
        (
            self.resolution.width.saturating_sub(1),
            self.resolution.height.saturating_sub(1),
        )
    }
}
