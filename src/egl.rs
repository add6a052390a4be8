//! EGL display, window surface and OpenVG context management
//!
//! [`EglState`] holds everything the initializer negotiates: the display
//! connection, the chosen framebuffer config, the OpenVG rendering context
//! and the window surface bound to a full-screen dispmanx element. The host
//! methods in [`crate::bindings`] read it; [`EglState::finish`] tears it down.

use khronos_egl as egl;
use tracing::{debug, info, warn};

use crate::config::Config as RuntimeConfig;
use crate::ffi::{GL_COLOR_BUFFER_BIT, GL_PROJECTION};
use crate::handle::{Config, Context, Display, Surface};
use crate::platform::{ClientApi, NativeWindow, Platform, WindowRequest};
use crate::{Error, Result};

/// Framebuffer configuration attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferConfig {
    pub red_size: i32,
    pub green_size: i32,
    pub blue_size: i32,
    pub alpha_size: i32,
    pub alpha_mask_size: i32,
    pub surface_type: i32,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            red_size: 8,
            green_size: 8,
            blue_size: 8,
            alpha_size: 8,
            alpha_mask_size: 8,
            surface_type: egl::WINDOW_BIT | egl::SWAP_BEHAVIOR_PRESERVED_BIT,
        }
    }
}

impl FramebufferConfig {
    /// `EGL_NONE`-terminated attribute list for `eglChooseConfig`
    pub fn attrib_list(&self) -> Vec<i32> {
        vec![
            egl::RED_SIZE, self.red_size,
            egl::GREEN_SIZE, self.green_size,
            egl::BLUE_SIZE, self.blue_size,
            egl::ALPHA_SIZE, self.alpha_size,
            egl::ALPHA_MASK_SIZE, self.alpha_mask_size,
            egl::SURFACE_TYPE, self.surface_type,
            egl::NONE,
        ]
    }
}

/// The initialized display, context and window surface
pub struct EglState<P: Platform> {
    platform: P,
    display: Display,
    config: Config,
    context: Context,
    surface: Surface,
    window: NativeWindow,
    screen_width: u32,
    screen_height: u32,
}

impl<P: Platform> EglState<P> {
    /// Bring up the display, an OpenVG context and a full-screen window
    /// surface, and make them current.
    pub fn init(mut platform: P, config: &RuntimeConfig) -> Result<Self> {
        info!("Initializing EGL for OpenVG on LCD {}", config.lcd);

        let display = platform.default_display().ok_or(Error::NoDisplay)?;

        let (major, minor) = platform.initialize(display)?;
        info!("EGL initialized: {}.{}", major, minor);

        platform.bind_api(ClientApi::OpenVg)?;

        let attribs = FramebufferConfig::default().attrib_list();
        let egl_config = platform
            .choose_config(display, &attribs)?
            .ok_or(Error::NoConfig)?;
        debug!("Chose EGL config {:?}", egl_config);

        let context = platform.create_context(display, egl_config)?;
        debug!("Created EGL context {:?}", context);

        let (screen_width, screen_height) = platform.display_size(config.lcd)?;
        info!("Display size: {}x{}", screen_width, screen_height);

        let window = platform.open_window(WindowRequest {
            lcd: config.lcd,
            layer: config.layer,
            width: screen_width,
            height: screen_height,
        })?;

        let surface = platform.create_window_surface(display, egl_config, &window)?;
        debug!("Created window surface {:?}", surface);

        platform.make_current(display, surface, surface, context)?;

        if let Err(e) = platform.surface_attrib(
            display,
            surface,
            egl::SWAP_BEHAVIOR,
            egl::BUFFER_PRESERVED,
        ) {
            warn!("Could not preserve color buffer across swaps: {}", e);
        }

        info!("EGL context current on {}x{} window", screen_width, screen_height);

        Ok(Self {
            platform,
            display,
            config: egl_config,
            context,
            surface,
            window,
            screen_width,
            screen_height,
        })
    }

    /// Set up a GLES viewport and perspective projection matching the
    /// screen's aspect ratio.
    pub fn init_opengles(&mut self) {
        let (width, height) = (self.screen_width, self.screen_height);
        self.platform.viewport(0, 0, width as i32, height as i32);

        self.platform.matrix_mode(GL_PROJECTION);
        self.platform.load_identity();

        let ratio = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        self.platform.frustum(-ratio, ratio, -1.0, 1.0, 1.0, 10.0);
    }

    /// Clear, present a final frame and release everything, in order.
    /// Consumes the state so teardown can only happen once.
    pub fn finish(self) -> Result<()> {
        let Self {
            mut platform,
            display,
            context,
            surface,
            window,
            ..
        } = self;

        info!("Tearing down EGL");

        platform.clear(GL_COLOR_BUFFER_BIT);
        platform.swap_buffers(display, surface)?;
        platform.make_current(display, Surface::NONE, Surface::NONE, Context::NONE)?;
        platform.destroy_surface(display, surface)?;
        platform.destroy_context(display, context)?;
        platform.terminate(display)?;
        platform.close_window(window)?;

        Ok(())
    }

    /// `eglSwapBuffers` on any display/surface pair
    pub fn swap_buffers(&mut self, display: Display, surface: Surface) -> Result<()> {
        self.platform.swap_buffers(display, surface)
    }

    /// Swap the window surface created by [`EglState::init`]
    pub fn present(&mut self) -> Result<()> {
        self.platform.swap_buffers(self.display, self.surface)
    }

    /// Wrap a VGImage as a pbuffer surface using the negotiated config
    pub fn create_pbuffer_from_client_buffer(
        &mut self,
        display: Display,
        image: u32,
    ) -> Result<Surface> {
        debug!("Creating pbuffer from VGImage {}", image);
        self.platform
            .create_pbuffer_from_vg_image(display, image, self.config)
    }

    /// Make `draw`/`read` current with the context created at init
    pub fn make_current(&mut self, display: Display, draw: Surface, read: Surface) -> Result<()> {
        self.platform.make_current(display, draw, read, self.context)
    }

    pub fn display(&self) -> Display {
        self.display
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
