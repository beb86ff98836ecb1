//! Built-in duplication strategies
//!
//! Every strategy has the [`Strategy`](super::Strategy) shape and can be
//! registered for any key of a custom registry. Strategies for types that can
//! take part in a cycle record their result in the tracker before visiting
//! children.

use super::dispatcher::Dispatcher;
use super::tracker::ReferenceTracker;
use super::transfer::{transfer_properties, transfer_properties_except};
use crate::error::{messages, Error, Result};
use crate::event_loop::PromiseOutcome;
use crate::runtime::{
    serialize_search_params, BlobData, FileData, Function, ObjectKind, ObjectRef, Property, RegExpData, Value,
};
use std::rc::Rc;
use tracing::debug;

fn source_object<'a>(value: &'a Value, expected: &str) -> Result<&'a ObjectRef> {
    value.as_object().ok_or_else(|| type_mismatch(value, expected))
}

fn type_mismatch(value: &Value, expected: &str) -> Error {
    Error::type_error(format!("expected {}, got {:?}", expected, value))
}

/// Returns the value itself
pub fn identity(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    tracker.set(value, value.clone());
    Ok(value.clone())
}

/// New ordinary object with the same prototype and own properties.
/// Non-extensible sources give non-extensible duplicates.
pub fn plain_object(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let obj = source_object(value, "an object")?;
    let (prototype, extensible) = {
        let obj = obj.borrow();
        (obj.prototype.clone(), obj.extensible)
    };

    let duplicate = Value::new_object_with_prototype(prototype);
    tracker.set(value, duplicate.clone());
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !extensible {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// New array of the same length; holes stay holes
pub fn array(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let obj = source_object(value, "an array")?;
    let (elements, prototype, extensible) = {
        let obj = obj.borrow();
        match &obj.kind {
            ObjectKind::Array(elements) => (elements.clone(), obj.prototype.clone(), obj.extensible),
            _ => return Err(type_mismatch(value, "an array")),
        }
    };

    let duplicate = Value::new_with_kind(ObjectKind::Array(vec![None; elements.len()]), prototype);
    tracker.set(value, duplicate.clone());
    for (index, element) in elements.iter().enumerate() {
        if let Some(element) = element {
            let element = dispatcher.duplicate_with(element, tracker)?;
            duplicate.set(index.to_string(), element);
        }
    }
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !extensible {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// New Map; every key and value duplicated independently
pub fn map(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let entries = value.map_entries().ok_or_else(|| type_mismatch(value, "a Map"))?;
    let duplicate = Value::new_with_kind(ObjectKind::Map(Vec::with_capacity(entries.len())), value.prototype());
    tracker.set(value, duplicate.clone());
    for (k, v) in &entries {
        let k = dispatcher.duplicate_with(k, tracker)?;
        let v = dispatcher.duplicate_with(v, tracker)?;
        duplicate.map_set(k, v);
    }
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !value.is_extensible() {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// New Set; every member duplicated
pub fn set(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let items = value.set_values().ok_or_else(|| type_mismatch(value, "a Set"))?;
    let duplicate = Value::new_with_kind(ObjectKind::Set(Vec::with_capacity(items.len())), value.prototype());
    tracker.set(value, duplicate.clone());
    for item in &items {
        let item = dispatcher.duplicate_with(item, tracker)?;
        duplicate.set_add(item);
    }
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !value.is_extensible() {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// New Date with the same time value (invalid dates stay invalid)
pub fn date(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let time = value.date_value().ok_or_else(|| type_mismatch(value, "a Date"))?;
    let duplicate = Value::new_with_kind(ObjectKind::Date(time), value.prototype());
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// New RegExp compiled from the source text and flags
pub fn regexp(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let (source, flags, _) = value.regexp_parts().ok_or_else(|| type_mismatch(value, "a RegExp"))?;
    let duplicate = Value::new_with_kind(ObjectKind::RegExp(RegExpData::new(&source, &flags)?), value.prototype());
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Byte-for-byte copy
pub fn array_buffer(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let bytes = value.array_buffer_bytes().ok_or_else(|| type_mismatch(value, "an ArrayBuffer"))?;
    let duplicate = Value::new_with_kind(ObjectKind::ArrayBuffer(bytes), value.prototype());
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Duplicate of a view's backing buffer. Views over one source buffer end up
/// sharing one duplicated buffer, but never the source buffer itself.
fn duplicate_view_buffer(
    buffer: &ObjectRef,
    needed: usize,
    tracker: &mut ReferenceTracker,
    dispatcher: &Dispatcher,
) -> Result<ObjectRef> {
    let source = Value::Object(buffer.clone());
    let duplicate = dispatcher.duplicate_with(&source, tracker)?;
    let usable = !duplicate.ptr_eq(&source) && duplicate.array_buffer_len().is_some_and(|len| len >= needed);
    if usable {
        if let Some(obj) = duplicate.as_object() {
            return Ok(obj.clone());
        }
    }

    debug!(?duplicate, "buffer duplicate unusable for a view, slicing the source buffer");
    let bytes = source
        .array_buffer_bytes()
        .ok_or_else(|| Error::type_error(messages::DETACHED_BUFFER))?;
    let sliced = Value::new_array_buffer(bytes);
    sliced
        .as_object()
        .cloned()
        .ok_or_else(|| Error::type_error(messages::DETACHED_BUFFER))
}

/// Same element type, offset and length over a duplicated buffer
pub fn typed_array(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let obj = source_object(value, "a typed array")?;
    let (buffer, kind, byte_offset, length, prototype, extensible) = {
        let obj = obj.borrow();
        match &obj.kind {
            ObjectKind::TypedArray {
                buffer,
                kind,
                byte_offset,
                length,
            } => (buffer.clone(), *kind, *byte_offset, *length, obj.prototype.clone(), obj.extensible),
            _ => return Err(type_mismatch(value, "a typed array")),
        }
    };

    let needed = byte_offset + length * kind.bytes_per_element();
    let buffer = duplicate_view_buffer(&buffer, needed, tracker, dispatcher)?;
    let duplicate = Value::new_with_kind(
        ObjectKind::TypedArray {
            buffer,
            kind,
            byte_offset,
            length,
        },
        prototype,
    );
    tracker.set(value, duplicate.clone());
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !extensible {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// Same offset and byte length over a duplicated buffer
pub fn data_view(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let obj = source_object(value, "a DataView")?;
    let (buffer, byte_offset, byte_length, prototype, extensible) = {
        let obj = obj.borrow();
        match &obj.kind {
            ObjectKind::DataView {
                buffer,
                byte_offset,
                byte_length,
            } => (buffer.clone(), *byte_offset, *byte_length, obj.prototype.clone(), obj.extensible),
            _ => return Err(type_mismatch(value, "a DataView")),
        }
    };

    let buffer = duplicate_view_buffer(&buffer, byte_offset + byte_length, tracker, dispatcher)?;
    let duplicate = Value::new_with_kind(
        ObjectKind::DataView {
            buffer,
            byte_offset,
            byte_length,
        },
        prototype,
    );
    tracker.set(value, duplicate.clone());
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !extensible {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// Same error kind and message; `name` and `stack` copied as-is, then the
/// remaining own properties
pub fn error(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let kind = value.error_kind().ok_or_else(|| type_mismatch(value, "an error"))?;
    let message = match value.get("message") {
        Value::Undefined => String::new(),
        message => message.to_js_string(),
    };

    let duplicate = Value::new_error_with_prototype(kind, &message, value.prototype());
    tracker.set(value, duplicate.clone());

    for key in ["message", "name", "stack"] {
        match value.get_own_property(key) {
            Some(prop) => duplicate.define_property(key, prop),
            None => duplicate.delete(key),
        };
    }
    transfer_properties_except(value, &duplicate, &["message", "name", "stack"], tracker, dispatcher)?;
    Ok(duplicate)
}

/// Boxed Boolean, Number or String around the same primitive
pub fn boxed_primitive(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let primitive = value.boxed_value().ok_or_else(|| type_mismatch(value, "a boxed primitive"))?;
    let duplicate = Value::new_boxed(&primitive)?;
    if let Some(obj) = duplicate.as_object() {
        obj.borrow_mut().prototype = value.prototype();
    }
    tracker.set(value, duplicate.clone());
    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    Ok(duplicate)
}

/// New callable entity that delegates to the original.
///
/// The wrapper keeps the name, calling convention and constructability of
/// the original; its body calls the original with the same receiver and
/// arguments, so captured state stays shared. A `prototype` object is
/// rebuilt with the original prototype's members and a `constructor` that
/// points at the wrapper.
pub fn function(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let func = value.as_function().ok_or_else(|| type_mismatch(value, "a function"))?;
    let original = value.clone();
    let wrapper = Function {
        name: func.name.clone(),
        kind: func.kind,
        constructable: func.constructable,
        body: Rc::new(move |this: &Value, args: &[Value]| original.call(this, args)),
    };
    let duplicate = Value::new_with_kind(ObjectKind::Function(wrapper), value.prototype());
    tracker.set(value, duplicate.clone());

    match value.get_own_property("prototype") {
        Some(Property::Data {
            value: Value::Object(proto),
            flags,
        }) => {
            let proto = Value::Object(proto);
            let new_proto = match tracker.get(&proto) {
                Some(existing) => {
                    if !existing.ptr_eq(&proto) {
                        relink_constructor(&existing, value, &duplicate);
                    }
                    existing
                }
                None => duplicate_prototype(&proto, value, &duplicate, tracker, dispatcher)?,
            };
            duplicate.define_property("prototype", Property::data_with_flags(new_proto, flags));
        }
        Some(descriptor) => {
            duplicate.define_property("prototype", descriptor);
        }
        None => {}
    }

    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    if !value.is_extensible() {
        duplicate.prevent_extensions();
    }
    Ok(duplicate)
}

/// Point a prototype duplicated before its function at the wrapper
fn relink_constructor(proto: &Value, original: &Value, wrapper: &Value) {
    if let Some(Property::Data { value, flags }) = proto.get_own_property("constructor") {
        if value.ptr_eq(original) {
            proto.define_property("constructor", Property::data_with_flags(wrapper.clone(), flags));
        }
    }
}

fn duplicate_prototype(
    proto: &Value,
    original: &Value,
    wrapper: &Value,
    tracker: &mut ReferenceTracker,
    dispatcher: &Dispatcher,
) -> Result<Value> {
    let new_proto = Value::new_object_with_prototype(proto.prototype());
    tracker.set(proto, new_proto.clone());

    let back_reference = match proto.get_own_property("constructor") {
        Some(Property::Data { value, flags }) if value.ptr_eq(original) => Some(flags),
        _ => None,
    };
    match back_reference {
        Some(flags) => {
            new_proto.define_property("constructor", Property::data_with_flags(wrapper.clone(), flags));
            transfer_properties_except(proto, &new_proto, &["constructor"], tracker, dispatcher)?;
        }
        None => transfer_properties(proto, &new_proto, tracker, dispatcher)?,
    }
    if !proto.is_extensible() {
        new_proto.prevent_extensions();
    }
    Ok(new_proto)
}

/// New promise on the same event loop that settles the way the source does,
/// with a duplicate of the source's value or reason.
///
/// Settlement runs after the original call has returned, so the forwarded
/// value is duplicated with a snapshot of the tracker as it stood when the
/// promise was visited. The snapshot maps this promise to its duplicate, so
/// a value that refers back to the promise settles without re-forwarding.
/// It stays alive until the source settles. A failure while duplicating
/// rejects the new promise with that error.
pub fn promise(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let source = value.promise_handle().ok_or_else(|| type_mismatch(value, "a Promise"))?;
    let target = source.event_loop().create_promise_internal();
    let duplicate = Value::new_with_kind(ObjectKind::Promise(target.clone()), value.prototype());
    tracker.set(value, duplicate.clone());

    let forwarder = dispatcher.clone();
    let mut resumed = tracker.snapshot();
    source.then(Box::new(move |outcome| {
        let fulfilled = matches!(outcome, PromiseOutcome::Fulfilled(_));
        match forwarder.duplicate_with(outcome.value(), &mut resumed) {
            Ok(settled) if fulfilled => target.fulfill(settled),
            Ok(settled) => target.reject(settled),
            Err(err) => {
                debug!(%err, "duplicating a settled promise value failed, rejecting");
                target.reject(err.into_value());
            }
        }
    }));

    transfer_properties(value, &duplicate, tracker, dispatcher)?;
    Ok(duplicate)
}

/// Reparse the serialized href
pub fn url(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let href = value.url_href().ok_or_else(|| type_mismatch(value, "a URL"))?;
    let parsed = url::Url::parse(&href)
        .map_err(|e| Error::type_error(format!("{}: {} ({})", messages::INVALID_URL, href, e)))?;
    let duplicate = Value::new_with_kind(ObjectKind::Url(parsed), value.prototype());
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Rebuild from the serialized entry list
pub fn url_search_params(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let params = value.search_params().ok_or_else(|| type_mismatch(value, "URLSearchParams"))?;
    let query = serialize_search_params(&params);
    let duplicate = Value::new_url_search_params(&query);
    if let Some(obj) = duplicate.as_object() {
        obj.borrow_mut().prototype = value.prototype();
    }
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Rebuild from the bytes and MIME type
pub fn blob(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let blob = value.blob_data().ok_or_else(|| type_mismatch(value, "a Blob"))?;
    let duplicate = Value::new_with_kind(
        ObjectKind::Blob(BlobData::from_parts(&[&blob.bytes[..]], &blob.mime_type)),
        value.prototype(),
    );
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Rebuild from the bytes, name, MIME type and modification time
pub fn file(value: &Value, tracker: &mut ReferenceTracker, _: &Dispatcher) -> Result<Value> {
    let file = value.file_data().ok_or_else(|| type_mismatch(value, "a File"))?;
    let duplicate = Value::new_with_kind(
        ObjectKind::File(FileData {
            blob: BlobData::from_parts(&[&file.blob.bytes[..]], &file.blob.mime_type),
            name: file.name,
            last_modified: file.last_modified,
        }),
        value.prototype(),
    );
    tracker.set(value, duplicate.clone());
    Ok(duplicate)
}

/// Re-append every entry; Blob and File entries are duplicated
pub fn form_data(value: &Value, tracker: &mut ReferenceTracker, dispatcher: &Dispatcher) -> Result<Value> {
    let entries = value.form_data_entries().ok_or_else(|| type_mismatch(value, "FormData"))?;
    let duplicate = Value::new_with_kind(ObjectKind::FormData(Vec::with_capacity(entries.len())), value.prototype());
    tracker.set(value, duplicate.clone());
    for (name, entry) in &entries {
        let entry = dispatcher.duplicate_with(entry, tracker)?;
        duplicate.form_data_append(name, entry);
    }
    Ok(duplicate)
}
