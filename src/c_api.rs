//! C API for embedding hosts
//!
//! Hosts that cannot link Rust directly load the cdylib and drive one
//! process-wide [`EglState`] through these functions. Initialization and
//! teardown failures abort the process: nothing can render without a
//! display. Per-call failures come back as return codes.

use std::ffi::{c_int, c_void};
use std::ptr;
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::egl::EglState;
use crate::handle::{Display, Surface};
use crate::native::NativePlatform;

/// Environment variable holding the tracing filter (default `info`)
pub const ENV_LOG: &str = "VG_EGL_LOG";

// Global state (one display per process)
static STATE: Mutex<Option<EglState<NativePlatform>>> = Mutex::new(None);
static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
        // A host that already installed a subscriber keeps it.
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

fn state() -> MutexGuard<'static, Option<EglState<NativePlatform>>> {
    // A panic while holding the lock leaves plain handles behind; keep going.
    STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn fatal(what: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", what, err);
    eprintln!("openvg-egl: {}: {}", what, err);
    std::process::abort()
}

/// Initialize EGL, the OpenVG context and the full-screen window surface.
///
/// Returns 0. Any failure aborts the process. Calling it again after a
/// successful init is a no-op.
#[no_mangle]
pub extern "C" fn vg_egl_init() -> c_int {
    init_tracing();

    let mut guard = state();
    if guard.is_some() {
        warn!("vg_egl_init: already initialized");
        return 0;
    }

    let config = Config::from_env().unwrap_or_else(|e| fatal("configuration", e));
    let platform = NativePlatform::load(&config).unwrap_or_else(|e| fatal("loading libraries", e));
    let egl = EglState::init(platform, &config).unwrap_or_else(|e| fatal("EGL initialization", e));

    info!(
        "vg_egl_init: {}x{} display ready",
        egl.screen_width(),
        egl.screen_height()
    );
    *guard = Some(egl);
    0
}

/// Set up a GLES viewport and projection for the screen.
/// Returns -1 if not initialized.
#[no_mangle]
pub extern "C" fn vg_egl_init_opengles() -> c_int {
    match state().as_mut() {
        Some(egl) => {
            egl.init_opengles();
            0
        }
        None => -1,
    }
}

/// Clear, present a final frame and release every EGL and dispmanx
/// resource. Failures abort the process.
#[no_mangle]
pub extern "C" fn vg_egl_finish() {
    let egl = state().take();
    match egl {
        Some(egl) => {
            if let Err(e) = egl.finish() {
                fatal("EGL teardown", e);
            }
            info!("vg_egl_finish: released display");
        }
        None => warn!("vg_egl_finish: not initialized"),
    }
}

/// Write the negotiated screen size. Returns -1 if not initialized or if
/// either pointer is null.
///
/// # Safety
/// `width` and `height` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vg_egl_screen_size(width: *mut u32, height: *mut u32) -> c_int {
    if width.is_null() || height.is_null() {
        return -1;
    }
    match state().as_ref() {
        Some(egl) => {
            *width = egl.screen_width();
            *height = egl.screen_height();
            0
        }
        None => -1,
    }
}

/// The `EGLDisplay`, or null if not initialized
#[no_mangle]
pub extern "C" fn vg_egl_display() -> *mut c_void {
    state()
        .as_ref()
        .map_or(ptr::null_mut(), |egl| egl.display().as_raw())
}

/// The window `EGLSurface`, or null if not initialized
#[no_mangle]
pub extern "C" fn vg_egl_surface() -> *mut c_void {
    state()
        .as_ref()
        .map_or(ptr::null_mut(), |egl| egl.surface().as_raw())
}

/// The OpenVG `EGLContext`, or null if not initialized
#[no_mangle]
pub extern "C" fn vg_egl_context() -> *mut c_void {
    state()
        .as_ref()
        .map_or(ptr::null_mut(), |egl| egl.context().as_raw())
}

/// Swap buffers (present to display).
/// Returns 0 on success, -1 on a null handle or if not initialized,
/// -2 if the swap itself failed.
#[no_mangle]
pub extern "C" fn vg_egl_swap_buffers(display: *mut c_void, surface: *mut c_void) -> c_int {
    if display.is_null() || surface.is_null() {
        return -1;
    }
    match state().as_mut() {
        Some(egl) => match egl.swap_buffers(Display::from_raw(display), Surface::from_raw(surface)) {
            Ok(()) => 0,
            Err(e) => {
                warn!("vg_egl_swap_buffers: {}", e);
                -2
            }
        },
        None => -1,
    }
}

/// Wrap a VGImage as a pbuffer surface. Returns null on failure.
#[no_mangle]
pub extern "C" fn vg_egl_create_pbuffer_from_client_buffer(
    display: *mut c_void,
    image: u32,
) -> *mut c_void {
    if display.is_null() {
        return ptr::null_mut();
    }
    match state().as_mut() {
        Some(egl) => match egl.create_pbuffer_from_client_buffer(Display::from_raw(display), image) {
            Ok(surface) => surface.as_raw(),
            Err(e) => {
                warn!("vg_egl_create_pbuffer_from_client_buffer({}): {}", image, e);
                ptr::null_mut()
            }
        },
        None => ptr::null_mut(),
    }
}

/// Make `draw`/`read` current with the OpenVG context. Null surfaces mean
/// `EGL_NO_SURFACE`. Returns 1 (`EGL_TRUE`) on success, 0 otherwise.
#[no_mangle]
pub extern "C" fn vg_egl_make_current(
    display: *mut c_void,
    draw: *mut c_void,
    read: *mut c_void,
) -> u32 {
    if display.is_null() {
        return 0;
    }
    match state().as_mut() {
        Some(egl) => {
            let result = egl.make_current(
                Display::from_raw(display),
                Surface::from_raw(draw),
                Surface::from_raw(read),
            );
            match result {
                Ok(()) => 1,
                Err(e) => {
                    warn!("vg_egl_make_current: {}", e);
                    0
                }
            }
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These only exercise the paths that never reach the native libraries.

    #[test]
    fn test_calls_before_init() {
        assert!(vg_egl_display().is_null());
        assert!(vg_egl_surface().is_null());
        assert!(vg_egl_context().is_null());
        assert_eq!(vg_egl_init_opengles(), -1);

        let (mut w, mut h) = (0u32, 0u32);
        assert_eq!(unsafe { vg_egl_screen_size(&mut w, &mut h) }, -1);

        // Harmless without a display.
        vg_egl_finish();
    }

    #[test]
    fn test_null_handles_rejected() {
        let fake = 0x10 as *mut c_void;
        assert_eq!(vg_egl_swap_buffers(ptr::null_mut(), fake), -1);
        assert_eq!(vg_egl_swap_buffers(fake, ptr::null_mut()), -1);
        assert!(vg_egl_create_pbuffer_from_client_buffer(ptr::null_mut(), 1).is_null());
        assert_eq!(vg_egl_make_current(ptr::null_mut(), fake, fake), 0);
        assert_eq!(unsafe { vg_egl_screen_size(ptr::null_mut(), ptr::null_mut()) }, -1);
    }
}
