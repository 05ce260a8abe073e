use khronos_egl as egl;
use std::fmt;

/// Human-readable explanation of the last EGL error code.
///
/// `None` stands for `EGL_SUCCESS`: some calls (notably `eglGetDisplay`) fail
/// without setting an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic(Option<egl::Error>);

impl Diagnostic {
    /// Query the calling thread's last EGL error.
    pub fn last(egl: &egl::Instance<egl::Static>) -> Self {
        Self(egl.get_error())
    }

    pub fn code(&self) -> Option<egl::Error> {
        self.0
    }

    #[allow(unreachable_patterns)]
    pub fn message(&self) -> &'static str {
        let Some(err) = self.0 else {
            return "The last function succeeded without error.";
        };

        match err {
            egl::Error::NotInitialized => {
                "EGL is not initialized, or could not be initialized, for the specified EGL display connection."
            }
            egl::Error::BadAccess => {
                "EGL cannot access a requested resource (for example a context is bound in another thread)."
            }
            egl::Error::BadAlloc => "EGL failed to allocate resources for the requested operation.",
            egl::Error::BadAttribute => {
                "An unrecognized attribute or attribute value was passed in the attribute list."
            }
            egl::Error::BadContext => {
                "An EGLContext argument does not name a valid EGL rendering context."
            }
            egl::Error::BadConfig => {
                "An EGLConfig argument does not name a valid EGL frame buffer configuration."
            }
            egl::Error::BadCurrentSurface => {
                "The current surface of the calling thread is a window, pixel buffer or pixmap that is no longer valid."
            }
            egl::Error::BadDisplay => {
                "An EGLDisplay argument does not name a valid EGL display connection."
            }
            egl::Error::BadSurface => {
                "An EGLSurface argument does not name a valid surface (window, pixel buffer or pixmap) configured for GL rendering."
            }
            egl::Error::BadMatch => {
                "Arguments are inconsistent (for example, a valid context requires buffers not supplied by a valid surface)."
            }
            egl::Error::BadParameter => "One or more argument values are invalid.",
            egl::Error::BadNativePixmap => {
                "A NativePixmapType argument does not refer to a valid native pixmap."
            }
            egl::Error::BadNativeWindow => {
                "A NativeWindowType argument does not refer to a valid native window."
            }
            egl::Error::ContextLost => {
                "A power management event has occurred. The application must destroy all contexts and reinitialise OpenGL ES state and objects to continue rendering."
            }
            _ => "Unknown error!",
        }
    }
}

impl From<egl::Error> for Diagnostic {
    fn from(err: egl::Error) -> Self {
        Self(Some(err))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: [egl::Error; 14] = [
        egl::Error::NotInitialized,
        egl::Error::BadAccess,
        egl::Error::BadAlloc,
        egl::Error::BadAttribute,
        egl::Error::BadContext,
        egl::Error::BadConfig,
        egl::Error::BadCurrentSurface,
        egl::Error::BadDisplay,
        egl::Error::BadSurface,
        egl::Error::BadMatch,
        egl::Error::BadParameter,
        egl::Error::BadNativePixmap,
        egl::Error::BadNativeWindow,
        egl::Error::ContextLost,
    ];

    #[test]
    fn success_has_its_own_sentence() {
        let d = Diagnostic(None);
        assert_eq!(d.to_string(), "The last function succeeded without error.");
        assert!(d.code().is_none());
    }

    #[test]
    fn every_error_code_has_a_distinct_sentence() {
        let messages: HashSet<&str> = ALL.iter().map(|&e| Diagnostic::from(e).message()).collect();
        assert_eq!(messages.len(), ALL.len());
        assert!(!messages.contains("Unknown error!"));
    }

    #[test]
    fn bad_alloc_sentence() {
        let d = Diagnostic::from(egl::Error::BadAlloc);
        assert_eq!(d.code(), Some(egl::Error::BadAlloc));
        assert_eq!(
            d.to_string(),
            "EGL failed to allocate resources for the requested operation."
        );
    }

    #[test]
    fn context_lost_mentions_reinitialising() {
        let d = Diagnostic::from(egl::Error::ContextLost);
        assert!(d.message().contains("reinitialise OpenGL ES state"));
    }
}
