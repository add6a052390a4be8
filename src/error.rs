//! Error types for the EGL/OpenVG bindings

use thiserror::Error;

use crate::args::ArgumentError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load {library}: {reason}")]
    Load { library: String, reason: String },

    #[error("no EGL display connection available")]
    NoDisplay,

    #[error("no framebuffer configuration matches 8-bit RGBA with preserved swaps")]
    NoConfig,

    #[error("{call} failed: {reason}")]
    Egl { call: &'static str, reason: String },

    #[error("dispmanx error: {0}")]
    Dispmanx(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown host method `{0}`")]
    UnknownMethod(String),

    #[error(transparent)]
    Argument(#[from] ArgumentError),
}
