//! Host-facing methods
//!
//! The three methods a scripting host calls, each taking loosely typed
//! [`Value`] arguments. Arguments are validated with [`Args`] before any
//! platform call; validation failures come back as [`ArgumentError`] and
//! leave the state untouched. Platform failures are not errors at this
//! layer: they are logged and reported through the method's return value,
//! the way the underlying EGL call would report them.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::args::{ArgumentError, Args};
use crate::egl::EglState;
use crate::handle::Surface;
use crate::platform::Platform;
use crate::value::{to_uint32, Value};
use crate::{Error, Result};

pub const SWAP_BUFFERS: &str = "swapBuffers";
pub const CREATE_PBUFFER_FROM_CLIENT_BUFFER: &str = "createPbufferFromClientBuffer";
pub const MAKE_CURRENT: &str = "makeCurrent";

/// A bound host method
pub type Method<P> = fn(&mut EglState<P>, &[Value]) -> std::result::Result<Value, ArgumentError>;

/// Anything a host can register methods on
pub trait BindingTarget<P: Platform> {
    fn set_method(&mut self, name: &'static str, method: Method<P>);
}

impl<P: Platform> BindingTarget<P> for HashMap<&'static str, Method<P>> {
    fn set_method(&mut self, name: &'static str, method: Method<P>) {
        self.insert(name, method);
    }
}

/// Register every host method on `target`
pub fn init_bindings<P: Platform, T: BindingTarget<P>>(target: &mut T) {
    target.set_method(SWAP_BUFFERS, swap_buffers::<P>);
    target.set_method(
        CREATE_PBUFFER_FROM_CLIENT_BUFFER,
        create_pbuffer_from_client_buffer::<P>,
    );
    target.set_method(MAKE_CURRENT, make_current::<P>);
}

/// Dispatch a host call by method name
pub fn invoke<P: Platform>(state: &mut EglState<P>, name: &str, args: &[Value]) -> Result<Value> {
    let method: Method<P> = match name {
        SWAP_BUFFERS => swap_buffers::<P>,
        CREATE_PBUFFER_FROM_CLIENT_BUFFER => create_pbuffer_from_client_buffer::<P>,
        MAKE_CURRENT => make_current::<P>,
        other => return Err(Error::UnknownMethod(other.to_owned())),
    };
    method(state, args).map_err(Error::from)
}

/// `swapBuffers(display, surface)`
pub fn swap_buffers<P: Platform>(
    state: &mut EglState<P>,
    values: &[Value],
) -> std::result::Result<Value, ArgumentError> {
    let args = Args::new(SWAP_BUFFERS, values, 2)?;
    let display = args.display(0, "display")?;
    let surface = args.surface(1, "surface")?;

    if let Err(e) = state.swap_buffers(display, surface) {
        warn!("swapBuffers: {}", e);
    }
    Ok(Value::Undefined)
}

/// `createPbufferFromClientBuffer(display, vgImage)`
pub fn create_pbuffer_from_client_buffer<P: Platform>(
    state: &mut EglState<P>,
    values: &[Value],
) -> std::result::Result<Value, ArgumentError> {
    let args = Args::new(CREATE_PBUFFER_FROM_CLIENT_BUFFER, values, 2)?;
    let display = args.display(0, "display")?;
    let image = to_uint32(args.number(1, "vgImage")?);

    let surface = match state.create_pbuffer_from_client_buffer(display, image) {
        Ok(surface) => surface,
        Err(e) => {
            warn!("createPbufferFromClientBuffer({}): {}", image, e);
            Surface::NONE
        }
    };
    debug!("VGImage {} -> pbuffer {:?}", image, surface);
    Ok(Value::from(surface))
}

/// `makeCurrent(display, drawSurface, readSurface)`
pub fn make_current<P: Platform>(
    state: &mut EglState<P>,
    values: &[Value],
) -> std::result::Result<Value, ArgumentError> {
    let args = Args::new(MAKE_CURRENT, values, 3)?;
    let display = args.display(0, "display")?;
    let draw = args.surface(1, "drawSurface")?;
    let read = args.surface(2, "readSurface")?;

    let result = state.make_current(display, draw, read);
    if let Err(e) = &result {
        warn!("makeCurrent: {}", e);
    }
    Ok(Value::Boolean(result.is_ok()))
}
