use crate::card::Card;
use crate::select::{Candidate, Selection, first_connected};
use drm::control::{Device as ControlDevice, Mode, connector, crtc, encoder, framebuffer};
use gbm::{AsRaw, BufferObject, BufferObjectFlags, Format};
use glhead_common::Resolution;
use glhead_surface::{EglSession, NativeWindow, SurfaceError};
use std::cell::Cell;
use std::ffi::c_void;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Make the kernel re-detect each connector instead of returning its cached
/// state, which is stale on boards booted without a console.
const REDETECT_CONNECTORS: bool = true;

/// Pixel format of the GBM surface, and the EGL native visual it must match.
pub const SCANOUT_FORMAT: Format = Format::Xrgb8888;

/// Errors from DRM/KMS setup and presentation.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to open DRM device {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to get DRM resources: {0}")]
    Resources(#[source] io::Error),
    #[error("unable to get connector: none is connected")]
    NoConnector,
    #[error("connector {0:?} is connected but reports no modes")]
    NoMode(connector::Handle),
    #[error("unable to get encoder for connector {0:?}")]
    NoEncoder(connector::Handle),
    #[error("encoder {0:?} is not driving a CRTC")]
    NoCrtc(encoder::Handle),
    #[error("DRM request failed: {0}")]
    Drm(#[from] io::Error),
    #[error("failed to create GBM {what}: {source}")]
    Gbm {
        what: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to lock GBM front buffer: {0}")]
    FrontBuffer(#[from] gbm::FrontBufferError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// A buffer currently being scanned out, with its DRM framebuffer.
struct Scanout {
    bo: BufferObject<()>,
    fb: framebuffer::Handle,
}

/// GBM surface sized to the first connected monitor's preferred mode.
///
/// Fields drop in declaration order: the scanout buffer goes back to the
/// surface before the surface is destroyed, and the surface before the device.
pub struct ScanoutTarget {
    front: Cell<Option<Scanout>>,
    surface: gbm::Surface<()>,
    gbm: gbm::Device<Card>,
    connector: connector::Handle,
    mode: Mode,
    resolution: Resolution,
    saved_crtc: crtc::Info,
}

impl ScanoutTarget {
    /// Open the DRM device at `path` and prepare a scanout surface on its
    /// first connected connector.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DisplayError> {
        let path = path.as_ref();
        let card = Card::open(path).map_err(|source| DisplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened {}", path.display());

        let resources = card.resource_handles().map_err(DisplayError::Resources)?;
        let candidates = resources.connectors().iter().filter_map(|&handle| {
            match card.get_connector(handle, REDETECT_CONNECTORS) {
                Ok(info) => Some(Candidate {
                    connected: info.state() == connector::State::Connected,
                    first_mode: info.modes().first().copied(),
                    connector: info,
                }),
                Err(err) => {
                    warn!("skipping connector {handle:?}: {err}");
                    None
                }
            }
        });
        let (connector, mode) = match first_connected(candidates) {
            Selection::Chosen { connector, mode } => (connector, mode),
            Selection::NoMode(connector) => return Err(DisplayError::NoMode(connector.handle())),
            Selection::NoneConnected => return Err(DisplayError::NoConnector),
        };
        let resolution = Resolution::from(mode.size());
        info!("resolution: {resolution}");

        let encoder = connector
            .current_encoder()
            .ok_or(DisplayError::NoEncoder(connector.handle()))?;
        let encoder = card.get_encoder(encoder)?;
        let crtc = encoder.crtc().ok_or(DisplayError::NoCrtc(encoder.handle()))?;
        let saved_crtc = card.get_crtc(crtc)?;
        debug!(
            "connector {:?} via encoder {:?} on crtc {:?}",
            connector.handle(),
            encoder.handle(),
            crtc
        );

        let gbm = gbm::Device::new(card).map_err(|source| DisplayError::Gbm {
            what: "device",
            source,
        })?;
        let surface = gbm
            .create_surface::<()>(
                resolution.width,
                resolution.height,
                SCANOUT_FORMAT,
                BufferObjectFlags::SCANOUT | BufferObjectFlags::RENDERING,
            )
            .map_err(|source| DisplayError::Gbm {
                what: "surface",
                source,
            })?;

        Ok(Self {
            front: Cell::new(None),
            surface,
            gbm,
            connector: connector.handle(),
            mode,
            resolution,
            saved_crtc,
        })
    }

    /// Size of the selected mode, which is also the surface size.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Swap `session`'s buffers and scan the new front buffer out on the
    /// connector. The previously presented buffer is released.
    pub fn present(&self, session: &EglSession<'_>) -> Result<(), DisplayError> {
        session.swap_buffers()?;

        // SAFETY: eglSwapBuffers has just been called on this surface.
        let bo = unsafe { self.surface.lock_front_buffer() }?;
        let fb = self.gbm.add_framebuffer(&bo, 24, 32)?;
        if let Err(err) = self.gbm.set_crtc(
            self.saved_crtc.handle(),
            Some(fb),
            (0, 0),
            &[self.connector],
            Some(self.mode),
        ) {
            let _ = self.gbm.destroy_framebuffer(fb);
            return Err(err.into());
        }
        debug!("scanning out framebuffer {fb:?}");

        if let Some(previous) = self.front.replace(Some(Scanout { bo, fb })) {
            self.release(previous);
        }
        Ok(())
    }

    fn release(&self, scanout: Scanout) {
        if let Err(err) = self.gbm.destroy_framebuffer(scanout.fb) {
            warn!("failed to remove framebuffer {:?}: {err}", scanout.fb);
        }
        // Dropping a locked buffer hands it back to the surface.
        drop(scanout.bo);
    }

    fn restore_crtc(&self) -> io::Result<()> {
        let saved = &self.saved_crtc;
        match saved.framebuffer() {
            Some(fb) => self.gbm.set_crtc(
                saved.handle(),
                Some(fb),
                saved.position(),
                &[self.connector],
                saved.mode(),
            ),
            // The CRTC was off when we found it.
            None => self
                .gbm
                .set_crtc(saved.handle(), None, (0, 0), &[], None),
        }
    }
}

impl Drop for ScanoutTarget {
    fn drop(&mut self) {
        if let Err(err) = self.restore_crtc() {
            warn!("failed to restore crtc {:?}: {err}", self.saved_crtc.handle());
        }
        if let Some(front) = self.front.take() {
            self.release(front);
        }
        debug!("scanout target torn down");
    }
}

// SAFETY: both handles live as long as `self`, and the surface was created
// with `SCANOUT_FORMAT`.
unsafe impl NativeWindow for ScanoutTarget {
    fn native_display(&self) -> *mut c_void {
        self.gbm.as_raw() as *mut c_void
    }

    fn native_window(&self) -> *mut c_void {
        self.surface.as_raw() as *mut c_void
    }

    fn visual_id(&self) -> u32 {
        SCANOUT_FORMAT as u32
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanout_format_is_xr24() {
        assert_eq!(SCANOUT_FORMAT as u32, u32::from_le_bytes(*b"XR24"));
    }

    #[test]
    fn connectors_are_redetected() {
        assert!(REDETECT_CONNECTORS);
    }

    #[test]
    fn missing_device_fails_on_open() {
        let err = match ScanoutTarget::open("/dev/dri/no-such-card") {
            Err(err) => err,
            Ok(_) => panic!("expected open to fail"),
        };
        match err {
            DisplayError::Open { path, source } => {
                assert_eq!(path, PathBuf::from("/dev/dri/no-such-card"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Open, got: {other}"),
        }
    }

    #[test]
    fn open_error_names_the_device() {
        let err = DisplayError::Open {
            path: PathBuf::from("/dev/dri/card1"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("failed to open DRM device /dev/dri/card1: "));
    }

    #[test]
    fn no_connector_message() {
        assert_eq!(
            DisplayError::NoConnector.to_string(),
            "unable to get connector: none is connected"
        );
    }
}
