//! [`Platform`] over the device libraries
//!
//! EGL is loaded through khronos-egl; dispmanx and GLES through the
//! `dlopen` tables in [`crate::ffi`].

use khronos_egl as egl;
use tracing::{debug, info};

use crate::config::Config as RuntimeConfig;
use crate::ffi::{
    BcmHost, Gles, VcRect, DISPMANX_NO_HANDLE, DISPMANX_NO_ROTATE, DISPMANX_PROTECTION_NONE,
};
use crate::handle::{Config, Context, Display, Surface};
use crate::platform::{ClientApi, NativeWindow, Platform, WindowRequest};
use crate::{Error, Result};

pub struct NativePlatform {
    egl: egl::DynamicInstance<egl::EGL1_4>,
    bcm: BcmHost,
    gles: Gles,
}

impl NativePlatform {
    /// Load EGL, bcm_host and GLES and run `bcm_host_init`
    pub fn load(config: &RuntimeConfig) -> Result<Self> {
        let egl = match &config.egl_library {
            Some(path) => unsafe { egl::DynamicInstance::<egl::EGL1_4>::load_required_from_filename(path) },
            None => unsafe { egl::DynamicInstance::<egl::EGL1_4>::load_required() },
        }
        .map_err(|e| Error::Load {
            library: config
                .egl_library
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "libEGL".into()),
            reason: format!("{:?}", e),
        })?;
        info!("Loaded EGL library");

        let bcm = BcmHost::load(&config.bcm_host_library)?;
        unsafe { (bcm.bcm_host_init)() };
        info!("Loaded and initialized {}", config.bcm_host_library.display());

        let gles = Gles::load(&config.gles_library)?;
        info!("Loaded {}", config.gles_library.display());

        Ok(Self { egl, bcm, gles })
    }
}

fn egl_err(call: &'static str) -> impl FnOnce(egl::Error) -> Error {
    move |e| Error::Egl {
        call,
        reason: e.to_string(),
    }
}

fn to_egl_display(display: Display) -> egl::Display {
    unsafe { egl::Display::from_ptr(display.as_raw()) }
}

fn to_egl_config(config: Config) -> egl::Config {
    unsafe { egl::Config::from_ptr(config.as_raw()) }
}

fn to_egl_surface(surface: Surface) -> Option<egl::Surface> {
    if surface.is_none() {
        None
    } else {
        Some(unsafe { egl::Surface::from_ptr(surface.as_raw()) })
    }
}

fn to_egl_context(context: Context) -> Option<egl::Context> {
    if context.is_none() {
        None
    } else {
        Some(unsafe { egl::Context::from_ptr(context.as_raw()) })
    }
}

/// EGL rejects calls on a null surface with EGL_BAD_SURFACE; mirror that
/// instead of handing khronos-egl a handle it cannot represent.
fn require_surface(call: &'static str, surface: Surface) -> Result<egl::Surface> {
    to_egl_surface(surface).ok_or_else(|| Error::Egl {
        call,
        reason: "EGL_BAD_SURFACE".into(),
    })
}

impl Platform for NativePlatform {
    fn default_display(&mut self) -> Option<Display> {
        let display = unsafe { self.egl.get_display(egl::DEFAULT_DISPLAY) };
        display.map(|d| Display::from_raw(d.as_ptr()))
    }

    fn initialize(&mut self, display: Display) -> Result<(i32, i32)> {
        self.egl
            .initialize(to_egl_display(display))
            .map_err(egl_err("eglInitialize"))
    }

    fn bind_api(&mut self, api: ClientApi) -> Result<()> {
        let api = match api {
            ClientApi::OpenVg => egl::OPENVG_API,
            ClientApi::OpenGlEs => egl::OPENGL_ES_API,
        };
        self.egl.bind_api(api).map_err(egl_err("eglBindAPI"))
    }

    fn choose_config(&mut self, display: Display, attribs: &[i32]) -> Result<Option<Config>> {
        let config = self
            .egl
            .choose_first_config(to_egl_display(display), attribs)
            .map_err(egl_err("eglChooseConfig"))?;
        Ok(config.map(|c| Config::from_raw(c.as_ptr())))
    }

    fn create_context(&mut self, display: Display, config: Config) -> Result<Context> {
        let context = self
            .egl
            .create_context(to_egl_display(display), to_egl_config(config), None, &[egl::NONE])
            .map_err(egl_err("eglCreateContext"))?;
        Ok(Context::from_raw(context.as_ptr()))
    }

    fn create_window_surface(
        &mut self,
        display: Display,
        config: Config,
        window: &NativeWindow,
    ) -> Result<Surface> {
        let surface = unsafe {
            self.egl.create_window_surface(
                to_egl_display(display),
                to_egl_config(config),
                window.as_native_ptr() as egl::NativeWindowType,
                None,
            )
        }
        .map_err(egl_err("eglCreateWindowSurface"))?;
        Ok(Surface::from_raw(surface.as_ptr()))
    }

    fn create_pbuffer_from_vg_image(
        &mut self,
        display: Display,
        image: u32,
        config: Config,
    ) -> Result<Surface> {
        // A VGImage handle is cast directly to EGLClientBuffer.
        let buffer = unsafe { egl::ClientBuffer::from_ptr(image as usize as *mut std::ffi::c_void) };
        let surface = unsafe {
            self.egl.create_pbuffer_from_client_buffer(
                to_egl_display(display),
                egl::OPENVG_IMAGE as egl::Enum,
                buffer,
                to_egl_config(config),
                &[egl::NONE],
            )
        }
        .map_err(egl_err("eglCreatePbufferFromClientBuffer"))?;
        Ok(Surface::from_raw(surface.as_ptr()))
    }

    fn make_current(
        &mut self,
        display: Display,
        draw: Surface,
        read: Surface,
        context: Context,
    ) -> Result<()> {
        self.egl
            .make_current(
                to_egl_display(display),
                to_egl_surface(draw),
                to_egl_surface(read),
                to_egl_context(context),
            )
            .map_err(egl_err("eglMakeCurrent"))
    }

    fn surface_attrib(
        &mut self,
        display: Display,
        surface: Surface,
        attribute: i32,
        value: i32,
    ) -> Result<()> {
        let surface = require_surface("eglSurfaceAttrib", surface)?;
        self.egl
            .surface_attrib(to_egl_display(display), surface, attribute, value)
            .map_err(egl_err("eglSurfaceAttrib"))
    }

    fn swap_buffers(&mut self, display: Display, surface: Surface) -> Result<()> {
        let surface = require_surface("eglSwapBuffers", surface)?;
        self.egl
            .swap_buffers(to_egl_display(display), surface)
            .map_err(egl_err("eglSwapBuffers"))
    }

    fn destroy_surface(&mut self, display: Display, surface: Surface) -> Result<()> {
        let surface = require_surface("eglDestroySurface", surface)?;
        self.egl
            .destroy_surface(to_egl_display(display), surface)
            .map_err(egl_err("eglDestroySurface"))
    }

    fn destroy_context(&mut self, display: Display, context: Context) -> Result<()> {
        let context = to_egl_context(context).ok_or_else(|| Error::Egl {
            call: "eglDestroyContext",
            reason: "EGL_BAD_CONTEXT".into(),
        })?;
        self.egl
            .destroy_context(to_egl_display(display), context)
            .map_err(egl_err("eglDestroyContext"))
    }

    fn terminate(&mut self, display: Display) -> Result<()> {
        self.egl
            .terminate(to_egl_display(display))
            .map_err(egl_err("eglTerminate"))
    }

    fn display_size(&mut self, lcd: u16) -> Result<(u32, u32)> {
        let mut width = 0u32;
        let mut height = 0u32;
        let ret = unsafe { (self.bcm.graphics_get_display_size)(lcd, &mut width, &mut height) };
        if ret < 0 {
            return Err(Error::Dispmanx(format!(
                "graphics_get_display_size({}) returned {}",
                lcd, ret
            )));
        }
        debug!("Display {} reports {}x{}", lcd, width, height);
        Ok((width, height))
    }

    fn open_window(&mut self, request: WindowRequest) -> Result<NativeWindow> {
        let dst_rect = VcRect {
            x: 0,
            y: 0,
            width: request.width as i32,
            height: request.height as i32,
        };
        // Source rectangle is in 16.16 fixed point.
        let src_rect = VcRect {
            x: 0,
            y: 0,
            width: (request.width << 16) as i32,
            height: (request.height << 16) as i32,
        };

        unsafe {
            let display = (self.bcm.vc_dispmanx_display_open)(request.lcd as u32);
            if display == DISPMANX_NO_HANDLE {
                return Err(Error::Dispmanx(format!(
                    "vc_dispmanx_display_open({}) failed",
                    request.lcd
                )));
            }

            let update = (self.bcm.vc_dispmanx_update_start)(0);
            if update == DISPMANX_NO_HANDLE {
                (self.bcm.vc_dispmanx_display_close)(display);
                return Err(Error::Dispmanx("vc_dispmanx_update_start failed".into()));
            }

            let element = (self.bcm.vc_dispmanx_element_add)(
                update,
                display,
                request.layer,
                &dst_rect,
                0,
                &src_rect,
                DISPMANX_PROTECTION_NONE,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                DISPMANX_NO_ROTATE,
            );
            let submitted = (self.bcm.vc_dispmanx_update_submit_sync)(update);

            if element == DISPMANX_NO_HANDLE || submitted != 0 {
                (self.bcm.vc_dispmanx_display_close)(display);
                return Err(Error::Dispmanx(format!(
                    "vc_dispmanx_element_add on layer {} failed",
                    request.layer
                )));
            }

            debug!(
                "Added dispmanx element {} ({}x{}) on layer {}",
                element, request.width, request.height, request.layer
            );
            Ok(NativeWindow::new(display, element, request.width, request.height))
        }
    }

    fn close_window(&mut self, window: NativeWindow) -> Result<()> {
        unsafe {
            let update = (self.bcm.vc_dispmanx_update_start)(0);
            let removed = (self.bcm.vc_dispmanx_element_remove)(update, window.element());
            let submitted = (self.bcm.vc_dispmanx_update_submit_sync)(update);
            let closed = (self.bcm.vc_dispmanx_display_close)(window.dispmanx_display());

            if removed != 0 || submitted != 0 || closed != 0 {
                return Err(Error::Dispmanx(format!(
                    "releasing element {} failed",
                    window.element()
                )));
            }
        }
        Ok(())
    }

    fn clear(&mut self, mask: u32) {
        unsafe { (self.gles.gl_clear)(mask) }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { (self.gles.gl_viewport)(x, y, width, height) }
    }

    fn matrix_mode(&mut self, mode: u32) {
        unsafe { (self.gles.gl_matrix_mode)(mode) }
    }

    fn load_identity(&mut self) {
        unsafe { (self.gles.gl_load_identity)() }
    }

    fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        unsafe { (self.gles.gl_frustumf)(left, right, bottom, top, near, far) }
    }
}

// khronos-egl's dynamic instance holds a raw library handle. The platform is
// only ever driven from the host's calling thread; c_api moves it behind a
// mutex.
unsafe impl Send for NativePlatform {}
