//! Argument checks for host method calls
//!
//! Every host method validates its arguments here before it touches the
//! platform. Failures are reported back to the caller as [`ArgumentError`].

use thiserror::Error;

use crate::handle::{Display, External, Surface};
use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{function}: expected {expected} arguments, got {actual}")]
    Count {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: argument {index} ({name}) should be {expected}, got {actual}")]
    Type {
        function: &'static str,
        index: usize,
        name: &'static str,
        expected: &'static str,
        actual: String,
    },
}

/// Arguments of one host call, already checked for count
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Check that exactly `expected` arguments were passed
    pub fn new(
        function: &'static str,
        values: &'a [Value],
        expected: usize,
    ) -> Result<Self, ArgumentError> {
        if values.len() != expected {
            return Err(ArgumentError::Count {
                function,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { function, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn display(&self, index: usize, name: &'static str) -> Result<Display, ArgumentError> {
        match self.external(index, name, "External<display>")? {
            External::Display(display) => Ok(display),
            other => Err(self.type_error(index, name, "External<display>", kind_name(&other))),
        }
    }

    pub fn surface(&self, index: usize, name: &'static str) -> Result<Surface, ArgumentError> {
        match self.external(index, name, "External<surface>")? {
            External::Surface(surface) => Ok(surface),
            other => Err(self.type_error(index, name, "External<surface>", kind_name(&other))),
        }
    }

    pub fn number(&self, index: usize, name: &'static str) -> Result<f64, ArgumentError> {
        match &self.values[index] {
            Value::Number(n) => Ok(*n),
            other => Err(self.type_error(index, name, "Number", other.type_name().to_owned())),
        }
    }

    fn external(
        &self,
        index: usize,
        name: &'static str,
        expected: &'static str,
    ) -> Result<External, ArgumentError> {
        let value = &self.values[index];
        value
            .as_external()
            .ok_or_else(|| self.type_error(index, name, expected, value.type_name().to_owned()))
    }

    fn type_error(
        &self,
        index: usize,
        name: &'static str,
        expected: &'static str,
        actual: String,
    ) -> ArgumentError {
        ArgumentError::Type {
            function: self.function,
            index,
            name,
            expected,
            actual,
        }
    }
}

fn kind_name(external: &External) -> String {
    format!("External<{}>", external.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_value() -> Value {
        Value::from(Surface::from_raw(0x20 as *mut _))
    }

    #[test]
    fn test_wrong_count() {
        let values = [Value::Number(1.0)];
        let err = Args::new("swapBuffers", &values, 2).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Count {
                function: "swapBuffers",
                expected: 2,
                actual: 1,
            }
        );
        assert_eq!(err.to_string(), "swapBuffers: expected 2 arguments, got 1");
    }

    #[test]
    fn test_non_external_rejected() {
        let values = [Value::Number(1.0), surface_value()];
        let args = Args::new("swapBuffers", &values, 2).unwrap();

        let err = args.display(0, "display").unwrap_err();
        assert_eq!(
            err.to_string(),
            "swapBuffers: argument 0 (display) should be External<display>, got Number"
        );
        assert!(args.surface(1, "surface").is_ok());
    }

    #[test]
    fn test_mixed_handle_kinds_rejected() {
        let values = [surface_value()];
        let args = Args::new("makeCurrent", &values, 1).unwrap();

        match args.display(0, "display") {
            Err(ArgumentError::Type { expected, actual, .. }) => {
                assert_eq!(expected, "External<display>");
                assert_eq!(actual, "External<surface>");
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_number() {
        let values = [Value::Number(42.0), Value::from("42")];
        let args = Args::new("createPbufferFromClientBuffer", &values, 2).unwrap();

        assert_eq!(args.number(0, "vgImage"), Ok(42.0));
        assert!(matches!(
            args.number(1, "vgImage"),
            Err(ArgumentError::Type { index: 1, .. })
        ));
    }
}
