//! EGL/OpenVG bindings for scripting hosts on dispmanx
//!
//! This library brings up an EGL display with an OpenVG rendering context,
//! binds a window surface to a full-screen dispmanx element on the
//! Raspberry Pi's hardware compositor, and exposes the handful of EGL calls
//! a 2D canvas needs to a scripting host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Scripting host (canvas runtime)                │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!        bindings (Value args)             c_api (void*)
//!                │                               │
//! ┌─────────────────────────────────────────────────────────────┐
//! │              openvg-egl                                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐ │
//! │  │ args        │  │ EglState    │  │ Platform            │ │
//! │  │ (checks)    │  │ (init/fini) │  │ (native / mock)     │ │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               libEGL · libbcm_host · libGLESv2
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use openvg_egl::{bindings, Config, EglState, NativePlatform, Value};
//!
//! let config = Config::from_env()?;
//! let mut egl = EglState::init(NativePlatform::load(&config)?, &config)?;
//!
//! let args = [Value::from(egl.display()), Value::from(egl.surface())];
//! bindings::invoke(&mut egl, bindings::SWAP_BUFFERS, &args)?;
//!
//! egl.finish()?;
//! ```

pub mod args;
pub mod bindings;
pub mod c_api;
pub mod config;
pub mod egl;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod native;
pub mod platform;
pub mod value;

pub use args::ArgumentError;
pub use config::Config;
pub use egl::EglState;
pub use error::Error;
pub use handle::{Context, Display, External, Surface};
pub use native::NativePlatform;
pub use platform::Platform;
pub use value::Value;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
