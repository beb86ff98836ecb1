//! Validators for strategy output
//!
//! Each predicate checks that a value has the internal slots of one category,
//! so a registry entry can refuse a result of the wrong shape.

use crate::runtime::{ObjectKind, Value};

fn kind_matches(value: &Value, check: impl FnOnce(&ObjectKind) -> bool) -> bool {
    match value.as_object() {
        Some(obj) => check(&obj.borrow().kind),
        None => false,
    }
}

pub fn is_array(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Array(_)))
}

/// An ordinary object: no exotic internal slots, not callable
pub fn is_plain_object(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Ordinary))
}

pub fn is_date(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Date(_)))
}

pub fn is_regexp(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::RegExp(_)))
}

pub fn is_map(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Map(_)))
}

pub fn is_set(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Set(_)))
}

pub fn is_callable(value: &Value) -> bool {
    value.is_callable()
}

pub fn is_error(value: &Value) -> bool {
    value.error_kind().is_some()
}

/// A genuine Promise, not merely a thenable
pub fn is_promise(value: &Value) -> bool {
    kind_matches(value, |k| matches!(k, ObjectKind::Promise(_)))
}
