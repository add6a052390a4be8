//! FFI bindings for the Broadcom host library (dispmanx) and GLES
//!
//! Both libraries only exist on the device, so their symbols are resolved at
//! runtime with `dlopen`/`dlsym` instead of being linked.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_int, c_uint, c_void};
use std::path::Path;

use crate::{Error, Result};

pub type DispmanxDisplayHandle = u32;
pub type DispmanxUpdateHandle = u32;
pub type DispmanxResourceHandle = u32;
pub type DispmanxElementHandle = u32;
pub type DispmanxProtection = u32;
pub type DispmanxTransform = c_int;

pub const DISPMANX_NO_HANDLE: u32 = 0;
pub const DISPMANX_PROTECTION_NONE: DispmanxProtection = 0;
pub const DISPMANX_NO_ROTATE: DispmanxTransform = 0;

/// dispmanx rectangle (`VC_RECT_T`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Native window handed to `eglCreateWindowSurface` (`EGL_DISPMANX_WINDOW_T`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglDispmanxWindow {
    pub element: DispmanxElementHandle,
    pub width: c_int,
    pub height: c_int,
}

pub type GLenum = c_uint;
pub type GLbitfield = c_uint;
pub type GLint = c_int;
pub type GLsizei = c_int;

pub const GL_COLOR_BUFFER_BIT: GLbitfield = 0x0000_4000;
pub const GL_PROJECTION: GLenum = 0x1701;

/// A shared library opened with `dlopen`
pub struct Library {
    handle: *mut c_void,
    name: String,
}

impl Library {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        let c_path = CString::new(name.as_bytes()).map_err(|_| Error::Load {
            library: name.clone(),
            reason: "path contains a NUL byte".into(),
        })?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(Error::Load {
                reason: last_dl_error(),
                library: name,
            });
        }

        Ok(Self { handle, name })
    }

    /// Resolve `symbol` (NUL-terminated) as a function pointer of type `T`.
    ///
    /// # Safety
    /// `T` must be a function pointer type matching the symbol's C signature.
    pub unsafe fn function<T: Copy>(&self, symbol: &'static [u8]) -> Result<T> {
        debug_assert_eq!(std::mem::size_of::<T>(), std::mem::size_of::<*mut c_void>());

        let ptr = libc::dlsym(self.handle, symbol.as_ptr() as *const c_char);
        if ptr.is_null() {
            let symbol = String::from_utf8_lossy(&symbol[..symbol.len().saturating_sub(1)]);
            return Err(Error::Load {
                library: self.name.clone(),
                reason: format!("missing symbol {}", symbol),
            });
        }
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&ptr))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe { libc::dlclose(self.handle) };
    }
}

fn last_dl_error() -> String {
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        "unknown dlopen error".into()
    } else {
        unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
    }
}

/// Entry points of `libbcm_host`
pub struct BcmHost {
    pub bcm_host_init: unsafe extern "C" fn(),
    pub graphics_get_display_size:
        unsafe extern "C" fn(display_number: u16, width: *mut u32, height: *mut u32) -> i32,
    pub vc_dispmanx_display_open: unsafe extern "C" fn(device: u32) -> DispmanxDisplayHandle,
    pub vc_dispmanx_display_close: unsafe extern "C" fn(display: DispmanxDisplayHandle) -> c_int,
    pub vc_dispmanx_update_start: unsafe extern "C" fn(priority: i32) -> DispmanxUpdateHandle,
    pub vc_dispmanx_update_submit_sync: unsafe extern "C" fn(update: DispmanxUpdateHandle) -> c_int,
    pub vc_dispmanx_element_add: unsafe extern "C" fn(
        update: DispmanxUpdateHandle,
        display: DispmanxDisplayHandle,
        layer: i32,
        dest_rect: *const VcRect,
        src: DispmanxResourceHandle,
        src_rect: *const VcRect,
        protection: DispmanxProtection,
        alpha: *mut c_void,
        clamp: *mut c_void,
        transform: DispmanxTransform,
    ) -> DispmanxElementHandle,
    pub vc_dispmanx_element_remove:
        unsafe extern "C" fn(update: DispmanxUpdateHandle, element: DispmanxElementHandle) -> c_int,
    _library: Library,
}

impl BcmHost {
    pub fn load(path: &Path) -> Result<Self> {
        let library = Library::open(path)?;
        unsafe {
            Ok(Self {
                bcm_host_init: library.function(b"bcm_host_init\0")?,
                graphics_get_display_size: library.function(b"graphics_get_display_size\0")?,
                vc_dispmanx_display_open: library.function(b"vc_dispmanx_display_open\0")?,
                vc_dispmanx_display_close: library.function(b"vc_dispmanx_display_close\0")?,
                vc_dispmanx_update_start: library.function(b"vc_dispmanx_update_start\0")?,
                vc_dispmanx_update_submit_sync: library
                    .function(b"vc_dispmanx_update_submit_sync\0")?,
                vc_dispmanx_element_add: library.function(b"vc_dispmanx_element_add\0")?,
                vc_dispmanx_element_remove: library.function(b"vc_dispmanx_element_remove\0")?,
                _library: library,
            })
        }
    }
}

/// The GLES entry points used for clearing and projection setup
pub struct Gles {
    pub gl_clear: unsafe extern "C" fn(mask: GLbitfield),
    pub gl_viewport: unsafe extern "C" fn(x: GLint, y: GLint, width: GLsizei, height: GLsizei),
    pub gl_matrix_mode: unsafe extern "C" fn(mode: GLenum),
    pub gl_load_identity: unsafe extern "C" fn(),
    pub gl_frustumf: unsafe extern "C" fn(
        left: c_float,
        right: c_float,
        bottom: c_float,
        top: c_float,
        near: c_float,
        far: c_float,
    ),
    _library: Library,
}

impl Gles {
    pub fn load(path: &Path) -> Result<Self> {
        let library = Library::open(path)?;
        unsafe {
            Ok(Self {
                gl_clear: library.function(b"glClear\0")?,
                gl_viewport: library.function(b"glViewport\0")?,
                gl_matrix_mode: library.function(b"glMatrixMode\0")?,
                gl_load_identity: library.function(b"glLoadIdentity\0")?,
                gl_frustumf: library.function(b"glFrustumf\0")?,
                _library: library,
            })
        }
    }
}

// The loaded tables are only used from the host's calling thread; the mutex
// in c_api serialises access to them.
unsafe impl Send for Library {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_reports_name() {
        let err = Library::open(Path::new("libdefinitely-not-here-vg.so"))
            .err()
            .expect("dlopen should fail");
        match err {
            Error::Load { library, .. } => assert_eq!(library, "libdefinitely-not-here-vg.so"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_window_layout_matches_c() {
        assert_eq!(std::mem::size_of::<EglDispmanxWindow>(), 12);
        assert_eq!(std::mem::size_of::<VcRect>(), 16);
    }
}
