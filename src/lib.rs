//! deepcopy: deep duplication of JavaScript object graphs
//!
//! Given any value of the runtime model in [`runtime`], deepcopy builds a
//! structurally independent copy that keeps type identity, prototype chains,
//! property descriptors and reference topology (cycles and shared references).
//! Callables are duplicated into new entities that still run the original
//! code, and promises into new promises that settle with a duplicate of the
//! source's result.
//!
//! # Quick Start
//!
//! ```
//! use deepcopy::{duplicate, Value};
//!
//! fn main() -> deepcopy::Result<()> {
//!     let inner = Value::new_object();
//!     inner.set("c", Value::Number(2.0));
//!     let outer = Value::new_object();
//!     outer.set("b", inner.clone());
//!
//!     let copy = duplicate(&outer)?;
//!     assert!(!copy.get("b").ptr_eq(&inner));
//!     assert_eq!(copy.get("b").get("c"), Value::Number(2.0));
//!     Ok(())
//! }
//! ```
//!
//! # Customization
//!
//! ```
//! use deepcopy::{create_duplicate_function, strategies, BuiltinType, Value};
//!
//! // Share dates instead of copying them
//! let dup = create_duplicate_function(|registry| {
//!     registry.set_strategy(BuiltinType::Date, strategies::identity);
//! });
//! let date = Value::new_date(0.0);
//! assert!(dup(&date).unwrap().ptr_eq(&date));
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Engine** | [`duplicate`] |
//! | **Value model** | [`runtime`], [`event_loop`] |
//! | **Errors** | [`error`](Error) |
// Clippy configuration.
//
// - type_complexity: strategy and validator signatures are spelled out in full
#![allow(clippy::type_complexity)]

pub mod duplicate;
pub mod error;
pub mod event_loop;
pub mod runtime;

pub use duplicate::{
    strategies, validators, BuiltinType, Dispatcher, DuplicateOptions, ReferenceTracker, Registry, Strategy,
    TypeKey, Validator,
};
pub use error::{Error, ErrorKind, Result};
pub use event_loop::EventLoop;
pub use runtime::{Function, FunctionKind, Property, PropertyFlags, PropertyKey, Symbol, Value, WellKnownSymbol};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

thread_local! {
    static DEFAULT_DISPATCHER: Dispatcher = Dispatcher::new();
}

/// Duplicate a value with the default registry
pub fn duplicate(value: &Value) -> Result<Value> {
    DEFAULT_DISPATCHER.with(|dispatcher| dispatcher.duplicate(value))
}

/// Build a duplicate function over the default registry as changed by
/// `customize`. Pass `|_| {}` for the defaults unchanged.
pub fn create_duplicate_function<F>(customize: F) -> impl Fn(&Value) -> Result<Value>
where
    F: FnOnce(&mut Registry),
{
    let dispatcher = Dispatcher::customized(customize);
    move |value: &Value| dispatcher.duplicate(value)
}
