//! Runtime value model
//!
//! The object graph the duplication engine operates on: values, objects and
//! their internal slots, property descriptors, symbols and callables.

mod function;
pub mod promise;
mod property;
mod value;

pub use function::{Function, FunctionKind, NativeFn};
pub use property::{own_keys, Property, PropertyFlags, PropertyKey, PropertyMap, Symbol, WellKnownSymbol};
pub use value::{
    serialize_search_params, BlobData, FileData, Object, ObjectKind, ObjectRef, RegExpData, TypedArrayKind,
    Value,
};
