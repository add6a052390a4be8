//! The native calls this crate forwards to
//!
//! [`Platform`] lists every EGL, dispmanx and GLES call the bindings make.
//! [`crate::native::NativePlatform`] implements it over the real libraries;
//! tests substitute a recording implementation.

use std::os::raw::c_void;

use crate::ffi::{DispmanxDisplayHandle, DispmanxElementHandle, EglDispmanxWindow};
use crate::handle::{Config, Context, Display, Surface};
use crate::Result;

/// Client API bound before context creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientApi {
    OpenVg,
    OpenGlEs,
}

/// Full-screen compositor element requested by the initializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    pub lcd: u16,
    pub layer: i32,
    pub width: u32,
    pub height: u32,
}

/// A dispmanx element wrapped as an EGL native window.
///
/// The window struct is boxed so the pointer given to
/// `eglCreateWindowSurface` stays valid for as long as this value lives.
#[derive(Debug)]
pub struct NativeWindow {
    display: DispmanxDisplayHandle,
    window: Box<EglDispmanxWindow>,
}

impl NativeWindow {
    pub fn new(display: DispmanxDisplayHandle, element: DispmanxElementHandle, width: u32, height: u32) -> Self {
        Self {
            display,
            window: Box::new(EglDispmanxWindow {
                element,
                width: width as i32,
                height: height as i32,
            }),
        }
    }

    pub fn dispmanx_display(&self) -> DispmanxDisplayHandle {
        self.display
    }

    pub fn element(&self) -> DispmanxElementHandle {
        self.window.element
    }

    pub fn width(&self) -> u32 {
        self.window.width as u32
    }

    pub fn height(&self) -> u32 {
        self.window.height as u32
    }

    /// `EGLNativeWindowType` for this window
    pub fn as_native_ptr(&self) -> *mut c_void {
        &*self.window as *const EglDispmanxWindow as *mut c_void
    }
}

pub trait Platform {
    // === EGL ===

    /// `eglGetDisplay(EGL_DEFAULT_DISPLAY)`
    fn default_display(&mut self) -> Option<Display>;

    /// `eglInitialize`, returning the EGL version
    fn initialize(&mut self, display: Display) -> Result<(i32, i32)>;

    fn bind_api(&mut self, api: ClientApi) -> Result<()>;

    /// First config matching the `EGL_NONE`-terminated attribute list
    fn choose_config(&mut self, display: Display, attribs: &[i32]) -> Result<Option<Config>>;

    fn create_context(&mut self, display: Display, config: Config) -> Result<Context>;

    fn create_window_surface(
        &mut self,
        display: Display,
        config: Config,
        window: &NativeWindow,
    ) -> Result<Surface>;

    /// `eglCreatePbufferFromClientBuffer` with `EGL_OPENVG_IMAGE`
    fn create_pbuffer_from_vg_image(
        &mut self,
        display: Display,
        image: u32,
        config: Config,
    ) -> Result<Surface>;

    /// Null surfaces and contexts are passed through as `EGL_NO_*`
    fn make_current(
        &mut self,
        display: Display,
        draw: Surface,
        read: Surface,
        context: Context,
    ) -> Result<()>;

    fn surface_attrib(
        &mut self,
        display: Display,
        surface: Surface,
        attribute: i32,
        value: i32,
    ) -> Result<()>;

    fn swap_buffers(&mut self, display: Display, surface: Surface) -> Result<()>;

    fn destroy_surface(&mut self, display: Display, surface: Surface) -> Result<()>;

    fn destroy_context(&mut self, display: Display, context: Context) -> Result<()>;

    fn terminate(&mut self, display: Display) -> Result<()>;

    // === dispmanx ===

    fn display_size(&mut self, lcd: u16) -> Result<(u32, u32)>;

    /// Add a full-screen element and submit the update synchronously
    fn open_window(&mut self, request: WindowRequest) -> Result<NativeWindow>;

    /// Remove the element and close its dispmanx display
    fn close_window(&mut self, window: NativeWindow) -> Result<()>;

    // === GLES ===

    fn clear(&mut self, mask: u32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn matrix_mode(&mut self, mode: u32);

    fn load_identity(&mut self);

    fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32);
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording platform for unit tests

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::handle::RawHandle;
    use crate::Error;

    pub const DISPLAY: usize = 0xd15;
    pub const CONFIG: usize = 0xc0f;
    pub const CONTEXT: usize = 0xc7;
    pub const WINDOW_SURFACE: usize = 0x5f0;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        DefaultDisplay,
        Initialize(Display),
        BindApi(ClientApi),
        ChooseConfig(Vec<i32>),
        CreateContext(Config),
        CreateWindowSurface(Config, u32),
        CreatePbuffer(Display, u32, Config),
        MakeCurrent(Display, Surface, Surface, Context),
        SurfaceAttrib(Surface, i32, i32),
        SwapBuffers(Display, Surface),
        DestroySurface(Surface),
        DestroyContext(Context),
        Terminate(Display),
        DisplaySize(u16),
        OpenWindow(WindowRequest),
        CloseWindow(u32),
        Clear(u32),
        Viewport(i32, i32, i32, i32),
        MatrixMode(u32),
        LoadIdentity,
        Frustum([f32; 6]),
    }

    pub fn handle(addr: usize) -> RawHandle {
        addr as RawHandle
    }

    pub type CallLog = Rc<RefCell<Vec<Call>>>;

    pub struct MockPlatform {
        log: CallLog,
        pub size: (u32, u32),
        pub has_display: bool,
        pub has_config: bool,
        /// Name of a call that should fail
        pub fail: Option<&'static str>,
        next_pbuffer: usize,
    }

    impl MockPlatform {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                log: CallLog::default(),
                size: (width, height),
                has_display: true,
                has_config: true,
                fail: None,
                next_pbuffer: 0x9000,
            }
        }

        pub fn failing(mut self, call: &'static str) -> Self {
            self.fail = Some(call);
            self
        }

        /// Shared handle to the call log; stays readable after the platform
        /// has been moved into (or consumed with) an `EglState`
        pub fn log(&self) -> CallLog {
            Rc::clone(&self.log)
        }

        pub fn calls(&self) -> Vec<Call> {
            self.log.borrow().clone()
        }

        fn push(&self, call: Call) {
            self.log.borrow_mut().push(call);
        }

        fn record(&mut self, name: &'static str, call: Call) -> Result<()> {
            self.push(call);
            if self.fail == Some(name) {
                return Err(Error::Egl {
                    call: name,
                    reason: "EGL_BAD_ALLOC".into(),
                });
            }
            Ok(())
        }
    }

    impl Platform for MockPlatform {
        fn default_display(&mut self) -> Option<Display> {
            self.push(Call::DefaultDisplay);
            self.has_display.then(|| Display::from_raw(handle(DISPLAY)))
        }

        fn initialize(&mut self, display: Display) -> Result<(i32, i32)> {
            self.record("eglInitialize", Call::Initialize(display))?;
            Ok((1, 4))
        }

        fn bind_api(&mut self, api: ClientApi) -> Result<()> {
            self.record("eglBindAPI", Call::BindApi(api))
        }

        fn choose_config(&mut self, _display: Display, attribs: &[i32]) -> Result<Option<Config>> {
            self.record("eglChooseConfig", Call::ChooseConfig(attribs.to_vec()))?;
            Ok(self.has_config.then(|| Config::from_raw(handle(CONFIG))))
        }

        fn create_context(&mut self, _display: Display, config: Config) -> Result<Context> {
            self.record("eglCreateContext", Call::CreateContext(config))?;
            Ok(Context::from_raw(handle(CONTEXT)))
        }

        fn create_window_surface(
            &mut self,
            _display: Display,
            config: Config,
            window: &NativeWindow,
        ) -> Result<Surface> {
            self.record(
                "eglCreateWindowSurface",
                Call::CreateWindowSurface(config, window.element()),
            )?;
            Ok(Surface::from_raw(handle(WINDOW_SURFACE)))
        }

        fn create_pbuffer_from_vg_image(
            &mut self,
            display: Display,
            image: u32,
            config: Config,
        ) -> Result<Surface> {
            self.record(
                "eglCreatePbufferFromClientBuffer",
                Call::CreatePbuffer(display, image, config),
            )?;
            self.next_pbuffer += 0x10;
            Ok(Surface::from_raw(handle(self.next_pbuffer)))
        }

        fn make_current(
            &mut self,
            display: Display,
            draw: Surface,
            read: Surface,
            context: Context,
        ) -> Result<()> {
            self.record("eglMakeCurrent", Call::MakeCurrent(display, draw, read, context))
        }

        fn surface_attrib(
            &mut self,
            _display: Display,
            surface: Surface,
            attribute: i32,
            value: i32,
        ) -> Result<()> {
            self.record("eglSurfaceAttrib", Call::SurfaceAttrib(surface, attribute, value))
        }

        fn swap_buffers(&mut self, display: Display, surface: Surface) -> Result<()> {
            self.record("eglSwapBuffers", Call::SwapBuffers(display, surface))
        }

        fn destroy_surface(&mut self, _display: Display, surface: Surface) -> Result<()> {
            self.record("eglDestroySurface", Call::DestroySurface(surface))
        }

        fn destroy_context(&mut self, _display: Display, context: Context) -> Result<()> {
            self.record("eglDestroyContext", Call::DestroyContext(context))
        }

        fn terminate(&mut self, display: Display) -> Result<()> {
            self.record("eglTerminate", Call::Terminate(display))
        }

        fn display_size(&mut self, lcd: u16) -> Result<(u32, u32)> {
            self.record("graphics_get_display_size", Call::DisplaySize(lcd))?;
            Ok(self.size)
        }

        fn open_window(&mut self, request: WindowRequest) -> Result<NativeWindow> {
            self.record("vc_dispmanx_element_add", Call::OpenWindow(request))?;
            Ok(NativeWindow::new(1, 7, request.width, request.height))
        }

        fn close_window(&mut self, window: NativeWindow) -> Result<()> {
            self.record("vc_dispmanx_element_remove", Call::CloseWindow(window.element()))
        }

        fn clear(&mut self, mask: u32) {
            self.push(Call::Clear(mask));
        }

        fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
            self.push(Call::Viewport(x, y, width, height));
        }

        fn matrix_mode(&mut self, mode: u32) {
            self.push(Call::MatrixMode(mode));
        }

        fn load_identity(&mut self) {
            self.push(Call::LoadIdentity);
        }

        fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
            self.push(Call::Frustum([left, right, bottom, top, near, far]));
        }
    }
}
