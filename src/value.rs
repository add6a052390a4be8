//! Values exchanged with the scripting host

use crate::handle::{Context, Display, External, Surface};

/// A host value as seen by the bound methods
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    External(External),
}

impl Value {
    /// Host-facing type name, used in argument errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::External(_) => "External",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_external(&self) -> Option<External> {
        match self {
            Value::External(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<External> for Value {
    fn from(handle: External) -> Self {
        Value::External(handle)
    }
}

impl From<Display> for Value {
    fn from(display: Display) -> Self {
        Value::External(display.into())
    }
}

impl From<Surface> for Value {
    fn from(surface: Surface) -> Self {
        Value::External(surface.into())
    }
}

impl From<Context> for Value {
    fn from(context: Context) -> Self {
        Value::External(context.into())
    }
}

/// ECMAScript `ToUint32`: truncate toward zero, wrap modulo 2^32.
/// NaN and infinities become 0.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    let modulus = 4_294_967_296.0_f64;
    let wrapped = n.trunc() % modulus;
    let wrapped = if wrapped < 0.0 { wrapped + modulus } else { wrapped };
    wrapped as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_uint32() {
        assert_eq!(to_uint32(7.0), 7);
        assert_eq!(to_uint32(3.9), 3);
        assert_eq!(to_uint32(-1.0), u32::MAX);
        assert_eq!(to_uint32(4_294_967_296.0 + 5.0), 5);
        assert_eq!(to_uint32(f64::NAN), 0);
        assert_eq!(to_uint32(f64::INFINITY), 0);
        assert_eq!(to_uint32(-0.5), 0);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(1.0).type_name(), "Number");
        assert_eq!(Value::from("x").type_name(), "String");
        assert_eq!(Value::from(Display::NONE).type_name(), "External");
        assert_eq!(Value::Undefined.type_name(), "Undefined");
    }
}
