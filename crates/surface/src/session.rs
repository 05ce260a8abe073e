use crate::diagnostic::Diagnostic;
use glhead_common::Resolution;
use khronos_egl as egl;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;
use tracing::{debug, info, warn};

/// Config for an off-screen pixel buffer: 8 bits per colour channel, 8-bit
/// depth, OpenGL ES 2 renderable.
const PBUFFER_CONFIG: [egl::Int; 13] = [
    egl::SURFACE_TYPE,
    egl::PBUFFER_BIT,
    egl::BLUE_SIZE,
    8,
    egl::GREEN_SIZE,
    8,
    egl::RED_SIZE,
    8,
    egl::DEPTH_SIZE,
    8,
    egl::RENDERABLE_TYPE,
    egl::OPENGL_ES2_BIT,
    egl::NONE,
];

/// Config for a native window. Candidates are narrowed further by visual id.
const WINDOW_CONFIG: [egl::Int; 11] = [
    egl::RED_SIZE,
    8,
    egl::GREEN_SIZE,
    8,
    egl::BLUE_SIZE,
    8,
    egl::DEPTH_SIZE,
    8,
    egl::RENDERABLE_TYPE,
    egl::OPENGL_ES2_BIT,
    egl::NONE,
];

const CONTEXT_ATTRIBS: [egl::Int; 3] = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];

/// Errors from EGL negotiation. Each carries the last EGL error explained.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("failed to get EGL display! Error: {0}")]
    Display(Diagnostic),
    #[error("failed to initialize EGL! Error: {0}")]
    Initialize(Diagnostic),
    #[error("failed to bind the OpenGL ES API! Error: {0}")]
    BindApi(Diagnostic),
    #[error("failed to get EGL config! Error: {0}")]
    Config(Diagnostic),
    #[error("no EGL config matches native visual {visual:#010x}")]
    NoMatchingConfig { visual: u32 },
    #[error("failed to create EGL surface! Error: {0}")]
    Surface(Diagnostic),
    #[error("failed to create EGL context! Error: {0}")]
    Context(Diagnostic),
    #[error("failed to make EGL context current! Error: {0}")]
    MakeCurrent(Diagnostic),
    #[error("failed to swap EGL buffers! Error: {0}")]
    SwapBuffers(Diagnostic),
}

/// A native platform window EGL can render into.
///
/// # Safety
/// `native_display` and `native_window` must return handles that remain valid
/// for as long as the implementor is borrowed, and `visual_id` must be the
/// pixel format the window scans out.
pub unsafe trait NativeWindow {
    fn native_display(&self) -> *mut c_void;
    fn native_window(&self) -> *mut c_void;
    fn visual_id(&self) -> u32;
    fn resolution(&self) -> Resolution;
}

/// An initialized EGL display with a surface and a current OpenGL ES 2
/// context. `'t` ties a window-backed session to its native window.
pub struct EglSession<'t> {
    egl: egl::Instance<egl::Static>,
    display: egl::Display,
    surface: Option<egl::Surface>,
    context: Option<egl::Context>,
    version: (egl::Int, egl::Int),
    _target: PhantomData<&'t ()>,
}

impl EglSession<'static> {
    /// Off-screen session backed by a `size` pixel buffer on the default display.
    pub fn pbuffer(size: Resolution) -> Result<Self, SurfaceError> {
        let egl = egl::Instance::new(egl::Static);
        let display = unsafe { egl.get_display(egl::DEFAULT_DISPLAY) }
            .ok_or_else(|| SurfaceError::Display(Diagnostic::last(&egl)))?;
        let mut session = Self::initialize(egl, display)?;

        let config = session
            .egl
            .choose_first_config(display, &PBUFFER_CONFIG)
            .map_err(|e| SurfaceError::Config(e.into()))?
            .ok_or_else(|| SurfaceError::Config(Diagnostic::last(&session.egl)))?;

        let surface = session
            .egl
            .create_pbuffer_surface(display, config, &pbuffer_attribs(size))
            .map_err(|e| SurfaceError::Surface(e.into()))?;
        session.surface = Some(surface);
        debug!("created {size} pbuffer surface");

        session.bind_api()?;
        session.create_context(config)?;
        session.make_current()?;
        Ok(session)
    }
}

impl<'t> EglSession<'t> {
    /// Session rendering into `target`, using the first config whose native
    /// visual matches the target's scanout format.
    pub fn window<W: NativeWindow>(target: &'t W) -> Result<Self, SurfaceError> {
        let egl = egl::Instance::new(egl::Static);
        let native_display = target.native_display() as egl::NativeDisplayType;
        let display = unsafe { egl.get_display(native_display) }
            .ok_or_else(|| SurfaceError::Display(Diagnostic::last(&egl)))?;
        let mut session = Self::initialize(egl, display)?;
        session.bind_api()?;

        let visual = target.visual_id();
        let config = session.matching_config(visual)?;
        session.create_context(config)?;

        let surface = unsafe {
            session.egl.create_window_surface(
                display,
                config,
                target.native_window() as egl::NativeWindowType,
                None,
            )
        }
        .map_err(|e| SurfaceError::Surface(e.into()))?;
        session.surface = Some(surface);
        debug!("created {} window surface", target.resolution());

        session.make_current()?;
        Ok(session)
    }

    fn initialize(
        egl: egl::Instance<egl::Static>,
        display: egl::Display,
    ) -> Result<Self, SurfaceError> {
        let version = match egl.initialize(display) {
            Ok(version) => version,
            Err(e) => {
                // Some drivers allocate on a failed initialize.
                let _ = egl.terminate(display);
                return Err(SurfaceError::Initialize(e.into()));
            }
        };
        info!("Initialized EGL version: {}.{}", version.0, version.1);

        Ok(Self {
            egl,
            display,
            surface: None,
            context: None,
            version,
            _target: PhantomData,
        })
    }

    fn bind_api(&self) -> Result<(), SurfaceError> {
        self.egl
            .bind_api(egl::OPENGL_ES_API)
            .map_err(|e| SurfaceError::BindApi(e.into()))
    }

    fn matching_config(&self, visual: u32) -> Result<egl::Config, SurfaceError> {
        let count = self
            .egl
            .get_config_count(self.display)
            .map_err(|e| SurfaceError::Config(e.into()))?;
        let mut configs = Vec::with_capacity(count);
        self.egl
            .choose_config(self.display, &WINDOW_CONFIG, &mut configs)
            .map_err(|e| SurfaceError::Config(e.into()))?;
        debug!("{} of {count} EGL configs qualify", configs.len());

        configs
            .into_iter()
            .find(|&config| {
                self.egl
                    .get_config_attrib(self.display, config, egl::NATIVE_VISUAL_ID)
                    .is_ok_and(|id| id as u32 == visual)
            })
            .ok_or(SurfaceError::NoMatchingConfig { visual })
    }

    fn create_context(&mut self, config: egl::Config) -> Result<(), SurfaceError> {
        let context = self
            .egl
            .create_context(self.display, config, None, &CONTEXT_ATTRIBS)
            .map_err(|e| SurfaceError::Context(e.into()))?;
        self.context = Some(context);
        Ok(())
    }

    fn make_current(&self) -> Result<(), SurfaceError> {
        self.egl
            .make_current(self.display, self.surface, self.surface, self.context)
            .map_err(|e| SurfaceError::MakeCurrent(e.into()))
    }

    /// EGL major/minor version reported by the display.
    pub fn version(&self) -> (i32, i32) {
        self.version
    }

    pub fn swap_buffers(&self) -> Result<(), SurfaceError> {
        let surface = self
            .surface
            .ok_or_else(|| SurfaceError::SwapBuffers(egl::Error::BadSurface.into()))?;
        self.egl
            .swap_buffers(self.display, surface)
            .map_err(|e| SurfaceError::SwapBuffers(e.into()))
    }

    /// Address of a GL or EGL entry point, null if unknown.
    pub fn proc_address(&self, name: &str) -> *const c_void {
        self.egl
            .get_proc_address(name)
            .map_or(ptr::null(), |f| f as *const c_void)
    }

    /// Load OpenGL ES entry points for the current context.
    pub fn load_gl(&self) -> glow::Context {
        unsafe { glow::Context::from_loader_function(|name| self.proc_address(name)) }
    }
}

impl Drop for EglSession<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.egl.make_current(self.display, None, None, None) {
            warn!("failed to release EGL context: {}", Diagnostic::from(e));
        }
        if let Some(context) = self.context.take() {
            if let Err(e) = self.egl.destroy_context(self.display, context) {
                warn!("failed to destroy EGL context: {}", Diagnostic::from(e));
            }
        }
        if let Some(surface) = self.surface.take() {
            if let Err(e) = self.egl.destroy_surface(self.display, surface) {
                warn!("failed to destroy EGL surface: {}", Diagnostic::from(e));
            }
        }
        if let Err(e) = self.egl.terminate(self.display) {
            warn!("failed to terminate EGL display: {}", Diagnostic::from(e));
        }
        debug!("EGL session torn down");
    }
}

fn pbuffer_attribs(size: Resolution) -> [egl::Int; 5] {
    [
        egl::WIDTH,
        size.width as egl::Int,
        egl::HEIGHT,
        size.height as egl::Int,
        egl::NONE,
    ]
}
