//! Callable objects
//!
//! A function's behavior is a native closure. The value model only needs to
//! know its calling convention, whether `new` may be applied to it, and the
//! name it reports.

use super::value::Value;
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// Type alias for function bodies: `(this, arguments) -> completion`
pub type NativeFn = Rc<dyn Fn(&Value, &[Value]) -> Result<Value>>;

/// Calling convention of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `function f() {}`, arrows, class constructors
    Normal,
    /// `async function f() {}`
    Async,
    /// `function* f() {}`
    Generator,
    /// `async function* f() {}`
    AsyncGenerator,
}

impl FunctionKind {
    /// Name of the intrinsic constructor for functions of this kind
    pub fn constructor_name(&self) -> &'static str {
        match self {
            FunctionKind::Normal => "Function",
            FunctionKind::Async => "AsyncFunction",
            FunctionKind::Generator => "GeneratorFunction",
            FunctionKind::AsyncGenerator => "AsyncGeneratorFunction",
        }
    }

    /// Inverse of [`FunctionKind::constructor_name`]
    pub fn from_constructor_name(name: &str) -> Option<Self> {
        match name {
            "Function" => Some(FunctionKind::Normal),
            "AsyncFunction" => Some(FunctionKind::Async),
            "GeneratorFunction" => Some(FunctionKind::Generator),
            "AsyncGeneratorFunction" => Some(FunctionKind::AsyncGenerator),
            _ => None,
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, FunctionKind::Async | FunctionKind::AsyncGenerator)
    }

    pub fn is_generator(&self) -> bool {
        matches!(self, FunctionKind::Generator | FunctionKind::AsyncGenerator)
    }
}

/// Function object payload
#[derive(Clone)]
pub struct Function {
    /// Function name (empty for anonymous functions)
    pub name: String,
    /// Calling convention
    pub kind: FunctionKind,
    /// Whether `new` may be applied
    pub constructable: bool,
    /// The code that runs on invocation
    pub body: NativeFn,
}

impl Function {
    /// A plain `function` declaration: constructable
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: name.into(),
            kind: FunctionKind::Normal,
            constructable: true,
            body: Rc::new(body),
        }
    }

    /// An arrow function: same convention as `function`, but not constructable
    pub fn arrow<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            constructable: false,
            ..Self::new(name, body)
        }
    }

    /// A function with the given calling convention.
    /// Only `Normal` functions are constructable.
    pub fn with_kind<F>(name: impl Into<String>, kind: FunctionKind, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            kind,
            constructable: kind == FunctionKind::Normal,
            ..Self::new(name, body)
        }
    }

    /// Run the body with the given receiver
    pub fn invoke(&self, this: &Value, args: &[Value]) -> Result<Value> {
        (self.body)(this, args)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "anonymous"
        } else {
            &self.name
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("constructable", &self.constructable)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_names_round_trip() {
        for kind in [
            FunctionKind::Normal,
            FunctionKind::Async,
            FunctionKind::Generator,
            FunctionKind::AsyncGenerator,
        ] {
            assert_eq!(FunctionKind::from_constructor_name(kind.constructor_name()), Some(kind));
        }
        assert_eq!(FunctionKind::from_constructor_name("Object"), None);
    }

    #[test]
    fn test_only_normal_functions_construct() {
        let body = |_: &Value, _: &[Value]| -> Result<Value> { Ok(Value::Undefined) };
        assert!(Function::new("f", body).constructable);
        assert!(!Function::arrow("g", body).constructable);
        assert!(!Function::with_kind("h", FunctionKind::Async, body).constructable);
        assert!(FunctionKind::AsyncGenerator.is_async());
        assert!(FunctionKind::AsyncGenerator.is_generator());
    }

    #[test]
    fn test_invoke_passes_receiver_and_args() {
        let f = Function::new("second", |_this, args| Ok(args.get(1).cloned().unwrap_or(Value::Undefined)));
        let out = f.invoke(&Value::Null, &[Value::Number(1.0), Value::Number(2.0)]).unwrap();
        assert_eq!(out, Value::Number(2.0));
        assert_eq!(Function::new("", |_, _| Ok(Value::Null)).display_name(), "anonymous");
    }
}
