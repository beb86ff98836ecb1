//! Error types for deepcopy
//!
//! The engine does not define a clone-specific error. Everything it can fail
//! with is an error the host runtime itself would raise: a `TypeError` from a
//! bad reflective operation, a `RangeError` from stack exhaustion, or a value
//! thrown by user code (a function body, a custom strategy).

use crate::runtime::Value;
use std::fmt;
use thiserror::Error;

/// Main error type for deepcopy
#[derive(Error, Debug)]
pub enum Error {
    /// Runtime error - TypeError, RangeError, etc.
    #[error("{kind}: {message}")]
    RuntimeError { kind: ErrorKind, message: String },

    /// A value thrown by user code
    #[error("Uncaught {0:?}")]
    Thrown(Value),
}

/// JavaScript error kinds
///
/// Doubles as the concrete constructor of error objects in the value model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// Generic Error - user-thrown Error objects
    Error,
    /// TypeError - wrong type for operation
    TypeError,
    /// RangeError - value out of range
    RangeError,
    /// ReferenceError - undefined variable
    ReferenceError,
    /// SyntaxError - invalid syntax at runtime (e.g., a bad RegExp source)
    SyntaxError,
    /// EvalError - error in eval()
    EvalError,
    /// URIError - malformed URI
    UriError,
    /// AggregateError - several errors at once
    AggregateError,
}

impl ErrorKind {
    /// Every error kind, in declaration order
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::EvalError,
        ErrorKind::UriError,
        ErrorKind::AggregateError,
    ];

    /// The constructor name, as JavaScript reports it in `error.name`
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::UriError => "URIError",
            ErrorKind::AggregateError => "AggregateError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::TypeError,
            message: message.into(),
        }
    }

    /// Create a RangeError
    pub fn range_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::RangeError,
            message: message.into(),
        }
    }

    /// Create a SyntaxError
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
        }
    }

    /// Wrap a thrown value
    pub fn thrown(value: Value) -> Self {
        Error::Thrown(value)
    }

    /// Create a stack depth exceeded error
    pub fn stack_depth_exceeded(depth: usize, limit: usize) -> Self {
        Error::range_error(format!(
            "{}: {} frames, limit was {}",
            messages::MAXIMUM_CALL_STACK,
            depth,
            limit
        ))
    }

    /// The error kind, if this is a runtime error rather than a thrown value
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::RuntimeError { kind, .. } => Some(*kind),
            Error::Thrown(_) => None,
        }
    }

    /// Convert into the value a `catch` block would observe
    pub fn into_value(self) -> Value {
        match self {
            Error::Thrown(value) => value,
            Error::RuntimeError { kind, message } => Value::new_error(kind, &message),
        }
    }
}

/// Result type alias for deepcopy
pub type Result<T> = std::result::Result<T, Error>;

/// Standardized error message templates
///
/// These constants provide consistent error messages following JavaScript conventions.
pub mod messages {
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const NOT_A_CONSTRUCTOR: &str = "is not a constructor";
    pub const INVALID_URL: &str = "Invalid URL";
    pub const INVALID_REGEX: &str = "Invalid regular expression";
    pub const DETACHED_BUFFER: &str = "Cannot perform operation on a detached ArrayBuffer";
    pub const MAXIMUM_CALL_STACK: &str = "Maximum call stack size exceeded";

    /// Format a "X is not a function" error message
    pub fn not_a_function(name: &str) -> String {
        format!("'{}' {}", name, NOT_A_FUNCTION)
    }

    /// Format a "X is not a constructor" error message
    pub fn not_a_constructor(name: &str) -> String {
        format!("'{}' {}", name, NOT_A_CONSTRUCTOR)
    }

    /// Format an "Invalid regular expression: /X/: reason" error message
    pub fn invalid_regex(source: &str, reason: &str) -> String {
        format!("{}: /{}/: {}", INVALID_REGEX, source, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display() {
        let err = Error::type_error("bad type");
        assert_eq!(err.to_string(), "TypeError: bad type");
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_stack_depth_message() {
        let err = Error::stack_depth_exceeded(11, 10);
        assert_eq!(
            err.to_string(),
            "RangeError: Maximum call stack size exceeded: 11 frames, limit was 10"
        );
    }

    #[test]
    fn test_uri_error_name() {
        assert_eq!(ErrorKind::UriError.name(), "URIError");
        assert_eq!(ErrorKind::ALL.len(), 8);
    }

    #[test]
    fn test_thrown_into_value_is_identity() {
        let payload = Value::new_object();
        let err = Error::thrown(payload.clone());
        assert!(err.kind().is_none());
        assert!(err.into_value().strict_equals(&payload));
    }

    #[test]
    fn test_runtime_error_into_value() {
        let value = Error::range_error("too far").into_value();
        assert_eq!(value.error_kind(), Some(ErrorKind::RangeError));
        assert_eq!(value.get("message"), Value::String("too far".into()));
    }
}
