//! Deep duplication engine
//!
//! A [`Dispatcher`] walks a value graph depth first. For every object it
//! meets it either returns the duplicate already recorded in the
//! [`ReferenceTracker`] or runs the strategy its [`Registry`] holds for the
//! object's runtime type. Strategies record their result before recursing,
//! which makes cycles and shared references come out with the same shape
//! they went in with.
//!
//! # Example
//!
//! ```
//! use deepcopy::{Dispatcher, Value};
//!
//! let a = Value::new_object();
//! a.set("self", a.clone());
//!
//! let copy = Dispatcher::new().duplicate(&a).unwrap();
//! assert!(!copy.ptr_eq(&a));
//! assert!(copy.get("self").ptr_eq(&copy));
//! ```

mod classify;
mod dispatcher;
mod options;
mod registry;
pub mod strategies;
mod tracker;
mod transfer;
pub mod validators;

pub use classify::{classify, BuiltinType, Classification, ConstructorKey, TypeKey};
pub use dispatcher::Dispatcher;
pub use options::DuplicateOptions;
pub use registry::{Entry, Registry, Strategy, Validator};
pub use tracker::ReferenceTracker;
pub use transfer::{transfer_properties, transfer_properties_except};
