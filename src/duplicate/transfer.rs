//! Own-property transfer from a source object onto its duplicate

use super::dispatcher::Dispatcher;
use super::tracker::ReferenceTracker;
use crate::error::Result;
use crate::runtime::{own_keys, Property, PropertyFlags, PropertyKey, Value};

/// Keys never copied from a callable: they are either language-managed or
/// rebuilt structurally by the function strategy.
const CALLABLE_META_KEYS: [&str; 6] = ["constructor", "length", "arguments", "caller", "callee", "prototype"];

/// Copy every own property of `source` onto `target`.
///
/// See [`transfer_properties_except`].
pub fn transfer_properties(
    source: &Value,
    target: &Value,
    tracker: &mut ReferenceTracker,
    dispatcher: &Dispatcher,
) -> Result<()> {
    transfer_properties_except(source, target, &[], tracker, dispatcher)
}

/// Copy own properties of `source` onto `target`, skipping the string keys in `exclude`.
///
/// String keys go first, then symbol keys, each in insertion order. Accessors
/// and data properties with any attribute cleared are re-defined with the
/// identical descriptor (the value is shared). Plain data properties get a
/// duplicated value. Well-known symbol keys are skipped unless the dispatcher
/// options allow them, and callables never transfer their meta keys.
/// Array elements are not own properties here; strategies copy them.
pub fn transfer_properties_except(
    source: &Value,
    target: &Value,
    exclude: &[&str],
    tracker: &mut ReferenceTracker,
    dispatcher: &Dispatcher,
) -> Result<()> {
    let Some(obj) = source.as_object() else {
        return Ok(());
    };
    let skip_meta = source.is_callable();
    let copy_well_known = dispatcher.options().copy_well_known_symbols;

    // Snapshot first: duplicating a value may run user code that touches `source`
    let properties: Vec<(PropertyKey, Property)> = {
        let obj = obj.borrow();
        own_keys(&obj.properties)
            .into_iter()
            .filter_map(|key| obj.properties.get(&key).cloned().map(|prop| (key, prop)))
            .collect()
    };

    for (key, prop) in properties {
        match &key {
            PropertyKey::String(name) => {
                if exclude.contains(&name.as_str()) || (skip_meta && CALLABLE_META_KEYS.contains(&name.as_str())) {
                    continue;
                }
            }
            PropertyKey::Symbol(sym) => {
                if sym.is_well_known() && !copy_well_known {
                    continue;
                }
            }
        }

        let descriptor = match prop {
            Property::Data { value, flags } if flags == PropertyFlags::DEFAULT => {
                Property::data(dispatcher.duplicate_with(&value, tracker)?)
            }
            other => other,
        };
        target.define_property(key, descriptor);
    }
    Ok(())
}
