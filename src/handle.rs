//! Typed opaque handles
//!
//! EGL hands out untyped `void*` handles for displays, surfaces, contexts and
//! configs. Each gets its own newtype here so a surface can never be passed
//! where a display is expected. The raw pointers are only cached and handed
//! back to the driver; nothing in this crate dereferences them.

use std::fmt;
use std::os::raw::c_void;

/// Raw EGL handle as the driver sees it
pub type RawHandle = *mut c_void;

macro_rules! egl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name(RawHandle);

        impl $name {
            /// The null handle (`EGL_NO_*`)
            pub const NONE: Self = Self(std::ptr::null_mut());

            pub fn from_raw(raw: RawHandle) -> Self {
                Self(raw)
            }

            pub fn as_raw(self) -> RawHandle {
                self.0
            }

            pub fn is_none(self) -> bool {
                self.0.is_null()
            }
        }

        // Handles are plain driver tokens, valid from any thread.
        unsafe impl Send for $name {}
    };
}

egl_handle!(
    /// An `EGLDisplay`
    Display
);
egl_handle!(
    /// An `EGLSurface` (window or pbuffer)
    Surface
);
egl_handle!(
    /// An `EGLContext`
    Context
);
egl_handle!(
    /// An `EGLConfig`
    Config
);

/// Which kind of handle an [`External`] carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Display,
    Surface,
    Context,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandleKind::Display => "display",
            HandleKind::Surface => "surface",
            HandleKind::Context => "context",
        };
        f.write_str(name)
    }
}

/// A handle crossing the host boundary, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum External {
    Display(Display),
    Surface(Surface),
    Context(Context),
}

impl External {
    pub fn kind(&self) -> HandleKind {
        match self {
            External::Display(_) => HandleKind::Display,
            External::Surface(_) => HandleKind::Surface,
            External::Context(_) => HandleKind::Context,
        }
    }

    /// The untagged pointer, for hosts that store externals as `void*`
    pub fn as_raw(&self) -> RawHandle {
        match *self {
            External::Display(d) => d.as_raw(),
            External::Surface(s) => s.as_raw(),
            External::Context(c) => c.as_raw(),
        }
    }
}

impl From<Display> for External {
    fn from(display: Display) -> Self {
        External::Display(display)
    }
}

impl From<Surface> for External {
    fn from(surface: Surface) -> Self {
        External::Surface(surface)
    }
}

impl From<Context> for External {
    fn from(context: Context) -> Self {
        External::Context(context)
    }
}
