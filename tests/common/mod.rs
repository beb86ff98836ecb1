//! Shared test helpers for integration tests

use deepcopy::duplicate::BuiltinType;
use deepcopy::runtime::Property;
use deepcopy::Value;
use std::collections::HashSet;

/// Install a tracing subscriber once per test binary (honours `RUST_LOG`)
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build an ordinary object from `(key, value)` pairs
#[allow(dead_code)]
pub fn object(entries: &[(&str, Value)]) -> Value {
    let obj = Value::new_object();
    for (key, value) in entries {
        obj.set(*key, value.clone());
    }
    obj
}

/// Build a dense array
#[allow(dead_code)]
pub fn array(items: &[Value]) -> Value {
    Value::new_array(items.to_vec())
}

#[allow(dead_code)]
pub fn num(n: f64) -> Value {
    Value::Number(n)
}

/// Structural equality: same categories, same own keys, same descriptors
/// flags, equal contents. Reference identity is never required, but the two
/// graphs must have the same shape (a cycle must be matched by a cycle).
#[allow(dead_code)]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut visited = HashSet::new();
    deep_equal_inner(a, b, &mut visited)
}

fn deep_equal_inner(a: &Value, b: &Value, visited: &mut HashSet<(usize, usize)>) -> bool {
    let (Some(ao), Some(bo)) = (a.as_object(), b.as_object()) else {
        return a.same_value_zero(b);
    };
    let pair = (a.object_id().unwrap_or(0), b.object_id().unwrap_or(0));
    if !visited.insert(pair) {
        return true;
    }

    if BuiltinType::of(&ao.borrow()) != BuiltinType::of(&bo.borrow()) {
        return false;
    }
    let same_proto = match (a.prototype(), b.prototype()) {
        (None, None) => true,
        (Some(x), Some(y)) => deep_equal_inner(&Value::Object(x), &Value::Object(y), visited),
        _ => false,
    };
    if !same_proto || a.is_extensible() != b.is_extensible() {
        return false;
    }
    if !slots_equal(a, b, visited) {
        return false;
    }

    let keys = a.own_keys();
    if keys != b.own_keys() {
        return false;
    }
    keys.into_iter().all(|key| {
        match (a.get_own_property(key.clone()), b.get_own_property(key)) {
            (Some(Property::Data { value: x, flags: fx }), Some(Property::Data { value: y, flags: fy })) => {
                fx == fy && deep_equal_inner(&x, &y, visited)
            }
            (Some(Property::Accessor { get: g1, set: s1, flags: f1 }), Some(Property::Accessor { get: g2, set: s2, flags: f2 })) => {
                f1 == f2 && opt_identical(&g1, &g2) && opt_identical(&s1, &s2)
            }
            _ => false,
        }
    })
}

fn opt_identical(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x.strict_equals(y),
        _ => false,
    }
}

fn slots_equal(a: &Value, b: &Value, visited: &mut HashSet<(usize, usize)>) -> bool {
    if let (Some(x), Some(y)) = (a.date_value(), b.date_value()) {
        return x == y || (x.is_nan() && y.is_nan());
    }
    if let (Some(x), Some(y)) = (a.map_entries(), b.map_entries()) {
        return x.len() == y.len()
            && x.iter()
                .zip(&y)
                .all(|((k1, v1), (k2, v2))| deep_equal_inner(k1, k2, visited) && deep_equal_inner(v1, v2, visited));
    }
    if let (Some(x), Some(y)) = (a.set_values(), b.set_values()) {
        return x.len() == y.len() && x.iter().zip(&y).all(|(i, j)| deep_equal_inner(i, j, visited));
    }
    if let (Some(x), Some(y)) = (a.typed_array_values(), b.typed_array_values()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.array_buffer_bytes(), b.array_buffer_bytes()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.regexp_parts(), b.regexp_parts()) {
        return x.0 == y.0 && x.1 == y.1;
    }
    if let (Some(x), Some(y)) = (a.boxed_value(), b.boxed_value()) {
        return x.same_value_zero(&y);
    }
    if a.is_callable() {
        return a.function_kind() == b.function_kind();
    }
    a.error_kind() == b.error_kind() && a.array_len() == b.array_len()
}
