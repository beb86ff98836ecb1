//! JavaScript value types
//!
//! This module defines the runtime representation of JavaScript values: the
//! object graph the duplication engine walks.

use super::function::{Function, FunctionKind};
use super::property::{own_keys, Property, PropertyFlags, PropertyKey, PropertyMap, Symbol};
use crate::error::{messages, Error, ErrorKind, Result};
use crate::event_loop::{PromiseHandle, PromiseState};
use num_bigint::BigInt;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared, mutable reference to a heap object
pub type ObjectRef = Rc<RefCell<Object>>;

/// Largest magnitude a Date time value may have (ECMAScript TimeClip)
const MAX_TIME_VALUE: f64 = 8.64e15;

/// A JavaScript value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// BigInt (arbitrary precision integer)
    BigInt(BigInt),
    /// String
    String(String),
    /// Symbol
    Symbol(Symbol),
    /// Object (includes arrays, functions, etc.)
    Object(ObjectRef),
}

impl Value {
    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is nullish (null or undefined)
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Anything that is not an object
    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Whether the value has a [[Call]] slot
    pub fn is_callable(&self) -> bool {
        self.function_kind().is_some()
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Identity of the referenced object, stable while the object is alive
    pub fn object_id(&self) -> Option<usize> {
        self.as_object().map(|obj| Rc::as_ptr(obj) as *const () as usize)
    }

    /// Reference identity for objects, `false` for everything else
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Convert to boolean (truthiness)
    pub fn to_boolean(&self) -> bool {
        use num_traits::Zero;
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Symbol(_) => true,
        }
    }

    /// Convert to JavaScript string representation
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => {
                if n.is_nan() {
                    "NaN".to_string()
                } else if n.is_infinite() {
                    if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
                } else if *n == 0.0 {
                    "0".to_string()
                } else {
                    format!("{}", n)
                }
            }
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Symbol(sym) => format!("{:?}", sym),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Array(elements) => elements
                        .iter()
                        .map(|e| match e {
                            Some(v) if !v.is_nullish() => v.to_js_string(),
                            _ => String::new(),
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                    ObjectKind::Function(func) => format!("function {}() {{ [native code] }}", func.name),
                    ObjectKind::Error(kind) => {
                        let message = obj.data_value("message").map(|m| m.to_js_string()).unwrap_or_default();
                        if message.is_empty() {
                            kind.name().to_string()
                        } else {
                            format!("{}: {}", kind.name(), message)
                        }
                    }
                    ObjectKind::Boolean(b) => b.to_string(),
                    ObjectKind::Number(n) => Value::Number(*n).to_js_string(),
                    ObjectKind::String(s) => s.clone(),
                    ObjectKind::RegExp(re) => format!("/{}/{}", re.source, re.flags),
                    ObjectKind::Url(url) => url.as_str().to_string(),
                    ObjectKind::UrlSearchParams(params) => serialize_search_params(params),
                    _ => "[object Object]".to_string(),
                }
            }
        }
    }

    /// Get the typeof string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // Historical quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(_) if self.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// SameValueZero: strict equality, except NaN equals NaN (Map/Set key comparison)
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    fn from_object(object: Object) -> Value {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// Create a new object value
    pub fn new_object() -> Value {
        Self::from_object(Object::new(ObjectKind::Ordinary))
    }

    /// Create a new object value linked to the given prototype
    pub fn new_object_with_prototype(prototype: Option<ObjectRef>) -> Value {
        Self::from_object(Object::with_prototype(ObjectKind::Ordinary, prototype))
    }

    /// Create a new object from a kind and prototype
    pub fn new_with_kind(kind: ObjectKind, prototype: Option<ObjectRef>) -> Value {
        Self::from_object(Object::with_prototype(kind, prototype))
    }

    /// Create a new dense array value
    pub fn new_array(elements: Vec<Value>) -> Value {
        Self::new_sparse_array(elements.into_iter().map(Some).collect())
    }

    /// Create a new array value; `None` entries are holes
    pub fn new_sparse_array(elements: Vec<Option<Value>>) -> Value {
        Self::from_object(Object::new(ObjectKind::Array(elements)))
    }

    /// Create a new error value
    pub fn new_error(kind: ErrorKind, message: &str) -> Value {
        Self::new_error_with_prototype(kind, message, None)
    }

    /// Create a new error value with an explicit prototype (error subclasses)
    pub fn new_error_with_prototype(kind: ErrorKind, message: &str, prototype: Option<ObjectRef>) -> Value {
        let mut object = Object::with_prototype(ObjectKind::Error(kind), prototype);
        object.define_own(
            "message",
            Property::data_with_flags(Value::String(message.to_string()), PropertyFlags::HIDDEN),
        );
        object.define_own(
            "name",
            Property::data_with_flags(Value::String(kind.name().to_string()), PropertyFlags::HIDDEN),
        );
        let stack = if message.is_empty() {
            format!("{}\n    at <anonymous>", kind.name())
        } else {
            format!("{}: {}\n    at <anonymous>", kind.name(), message)
        };
        object.define_own("stack", Property::data_with_flags(Value::String(stack), PropertyFlags::HIDDEN));
        Self::from_object(object)
    }

    /// Create a new function value.
    ///
    /// Constructable functions get a fresh `prototype` object whose hidden
    /// `constructor` points back at the function.
    pub fn new_function(func: Function) -> Value {
        let constructable = func.constructable;
        let function = Self::new_function_without_prototype(func);
        if constructable {
            let prototype = Value::new_object();
            prototype.define_property(
                "constructor",
                Property::data_with_flags(function.clone(), PropertyFlags::HIDDEN),
            );
            function.define_property(
                "prototype",
                Property::data_with_flags(prototype, PropertyFlags::WRITABLE),
            );
        }
        function
    }

    /// Create a new function value with no `prototype` property
    pub fn new_function_without_prototype(func: Function) -> Value {
        Self::from_object(Object::new(ObjectKind::Function(func)))
    }

    /// Create a boxed primitive (`new Number(1)`, `new String("a")`, `new Boolean(true)`)
    pub fn new_boxed(primitive: &Value) -> Result<Value> {
        let kind = match primitive {
            Value::Boolean(b) => ObjectKind::Boolean(*b),
            Value::Number(n) => ObjectKind::Number(*n),
            Value::String(s) => ObjectKind::String(s.clone()),
            other => {
                return Err(Error::type_error(format!(
                    "Cannot box a value of type {}",
                    other.type_of()
                )))
            }
        };
        Ok(Self::from_object(Object::new(kind)))
    }

    /// Create a new Date from a time value (milliseconds since the epoch).
    /// Out-of-range or non-finite time values produce an invalid date.
    pub fn new_date(time: f64) -> Value {
        Self::from_object(Object::new(ObjectKind::Date(time_clip(time))))
    }

    /// Create a new RegExp from source text and flags
    pub fn new_regexp(source: &str, flags: &str) -> Result<Value> {
        Ok(Self::from_object(Object::new(ObjectKind::RegExp(RegExpData::new(source, flags)?))))
    }

    /// Create a new Map with the given entries, in insertion order
    pub fn new_map(entries: Vec<(Value, Value)>) -> Value {
        let map = Self::from_object(Object::new(ObjectKind::Map(Vec::new())));
        for (k, v) in entries {
            map.map_set(k, v);
        }
        map
    }

    /// Create a new Set with the given members, in insertion order
    pub fn new_set(items: Vec<Value>) -> Value {
        let set = Self::from_object(Object::new(ObjectKind::Set(Vec::new())));
        for item in items {
            set.set_add(item);
        }
        set
    }

    pub fn new_weak_map() -> Value {
        Self::from_object(Object::new(ObjectKind::WeakMap(Vec::new())))
    }

    pub fn new_weak_set() -> Value {
        Self::from_object(Object::new(ObjectKind::WeakSet(Vec::new())))
    }

    /// Create a WeakRef to an object
    pub fn new_weak_ref(target: &Value) -> Result<Value> {
        let target = target
            .as_object()
            .ok_or_else(|| Error::type_error("WeakRef: target must be an object"))?;
        Ok(Self::from_object(Object::new(ObjectKind::WeakRef(Rc::downgrade(target)))))
    }

    /// Create a new ArrayBuffer holding the given bytes
    pub fn new_array_buffer(bytes: Vec<u8>) -> Value {
        Self::from_object(Object::new(ObjectKind::ArrayBuffer(bytes)))
    }

    /// Create a TypedArray view over an ArrayBuffer
    pub fn new_typed_array(buffer: &Value, kind: TypedArrayKind, byte_offset: usize, length: usize) -> Result<Value> {
        let buffer_len = buffer
            .array_buffer_len()
            .ok_or_else(|| Error::type_error(format!("{}: argument is not an ArrayBuffer", kind.name())))?;
        if byte_offset % kind.bytes_per_element() != 0 {
            return Err(Error::range_error(format!(
                "start offset of {} should be a multiple of {}",
                kind.name(),
                kind.bytes_per_element()
            )));
        }
        if byte_offset + length * kind.bytes_per_element() > buffer_len {
            return Err(Error::range_error(format!("Invalid typed array length: {}", length)));
        }
        let buffer = buffer.as_object().cloned().ok_or_else(|| Error::type_error(messages::DETACHED_BUFFER))?;
        Ok(Self::from_object(Object::new(ObjectKind::TypedArray {
            buffer,
            kind,
            byte_offset,
            length,
        })))
    }

    /// Create a TypedArray with its own buffer, filled from numbers
    pub fn new_typed_array_from(kind: TypedArrayKind, values: &[f64]) -> Value {
        let mut bytes = vec![0u8; values.len() * kind.bytes_per_element()];
        for (i, v) in values.iter().enumerate() {
            kind.write(&mut bytes[i * kind.bytes_per_element()..], *v);
        }
        let buffer = Rc::new(RefCell::new(Object::new(ObjectKind::ArrayBuffer(bytes))));
        Self::from_object(Object::new(ObjectKind::TypedArray {
            buffer,
            kind,
            byte_offset: 0,
            length: values.len(),
        }))
    }

    /// Create a DataView over an ArrayBuffer
    pub fn new_data_view(buffer: &Value, byte_offset: usize, byte_length: usize) -> Result<Value> {
        let buffer_len = buffer
            .array_buffer_len()
            .ok_or_else(|| Error::type_error("DataView: argument is not an ArrayBuffer"))?;
        if byte_offset + byte_length > buffer_len {
            return Err(Error::range_error(format!("Invalid DataView length {}", byte_length)));
        }
        let buffer = buffer.as_object().cloned().ok_or_else(|| Error::type_error(messages::DETACHED_BUFFER))?;
        Ok(Self::from_object(Object::new(ObjectKind::DataView {
            buffer,
            byte_offset,
            byte_length,
        })))
    }

    /// Wrap promise slots in a Promise object
    pub fn new_promise(handle: PromiseHandle) -> Value {
        Self::from_object(Object::new(ObjectKind::Promise(handle)))
    }

    /// Create a URL by parsing an absolute URL string
    pub fn new_url(href: &str) -> Result<Value> {
        let url = url::Url::parse(href)
            .map_err(|e| Error::type_error(format!("{}: {} ({})", messages::INVALID_URL, href, e)))?;
        Ok(Self::from_object(Object::new(ObjectKind::Url(url))))
    }

    /// Create URLSearchParams from a query string (a leading `?` is ignored)
    pub fn new_url_search_params(query: &str) -> Value {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self::from_object(Object::new(ObjectKind::UrlSearchParams(params)))
    }

    /// Create a Blob from its parts (concatenated) and MIME type
    pub fn new_blob(parts: &[&[u8]], mime_type: &str) -> Value {
        Self::from_object(Object::new(ObjectKind::Blob(BlobData::from_parts(parts, mime_type))))
    }

    /// Create a File from its parts, name and metadata
    pub fn new_file(parts: &[&[u8]], name: &str, mime_type: &str, last_modified: f64) -> Value {
        Self::from_object(Object::new(ObjectKind::File(FileData {
            blob: BlobData::from_parts(parts, mime_type),
            name: name.to_string(),
            last_modified,
        })))
    }

    /// Create a FormData from `(name, value)` entries. Values are strings, Blobs or Files.
    pub fn new_form_data(entries: Vec<(String, Value)>) -> Value {
        Self::from_object(Object::new(ObjectKind::FormData(entries)))
    }

    /// The [[Prototype]] of an object
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.as_object().and_then(|obj| obj.borrow().prototype.clone())
    }

    /// Own property descriptor
    pub fn get_own_property(&self, key: impl Into<PropertyKey>) -> Option<Property> {
        let obj = self.as_object()?.borrow();
        obj.own_property(&key.into())
    }

    /// Whether an own property (or array element) exists
    pub fn has_own_property(&self, key: impl Into<PropertyKey>) -> bool {
        self.get_own_property(key).is_some()
    }

    /// Own keys in reflection order (array indices first, then strings, then symbols)
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        match self.as_object() {
            Some(obj) => obj.borrow().own_keys(),
            None => Vec::new(),
        }
    }

    /// Data-property lookup along the prototype chain. Accessors and missing keys read as undefined.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Value {
        let key = key.into();
        let mut current = self.as_object().cloned();
        while let Some(obj_rc) = current {
            let obj = obj_rc.borrow();
            if let Some(prop) = obj.own_property(&key) {
                return prop.value().cloned().unwrap_or(Value::Undefined);
            }
            current = obj.prototype.clone();
        }
        Value::Undefined
    }

    /// Full [[Get]]: like [`Value::get`], but getters are invoked with this value as receiver
    pub fn read(&self, key: impl Into<PropertyKey>) -> Result<Value> {
        let key = key.into();
        let mut current = self.as_object().cloned();
        while let Some(obj_rc) = current {
            let found = obj_rc.borrow().own_property(&key);
            match found {
                Some(Property::Data { value, .. }) => return Ok(value),
                Some(Property::Accessor { get: Some(getter), .. }) => return getter.call(self, &[]),
                Some(Property::Accessor { get: None, .. }) => return Ok(Value::Undefined),
                None => current = obj_rc.borrow().prototype.clone(),
            }
        }
        Ok(Value::Undefined)
    }

    /// Plain assignment to an own data property. Returns false when the assignment is refused.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> bool {
        match self.as_object() {
            Some(obj) => obj.borrow_mut().assign(key.into(), value),
            None => false,
        }
    }

    /// Define (or redefine) an own property with an explicit descriptor
    pub fn define_property(&self, key: impl Into<PropertyKey>, property: Property) -> bool {
        match self.as_object() {
            Some(obj) => {
                obj.borrow_mut().define_own(key, property);
                true
            }
            None => false,
        }
    }

    /// Remove an own property
    pub fn delete(&self, key: impl Into<PropertyKey>) -> bool {
        match self.as_object() {
            Some(obj) => obj.borrow_mut().delete_own(&key.into()),
            None => false,
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.as_object().map(|obj| obj.borrow().extensible).unwrap_or(false)
    }

    pub fn prevent_extensions(&self) {
        if let Some(obj) = self.as_object() {
            obj.borrow_mut().extensible = false;
        }
    }

    /// `Object.freeze`: every own property becomes non-configurable (and data ones read-only)
    pub fn freeze(&self) {
        if let Some(obj) = self.as_object() {
            let mut obj = obj.borrow_mut();
            for prop in obj.properties.values_mut() {
                match prop {
                    Property::Data { flags, .. } => {
                        flags.remove(PropertyFlags::WRITABLE | PropertyFlags::CONFIGURABLE)
                    }
                    Property::Accessor { flags, .. } => flags.remove(PropertyFlags::CONFIGURABLE),
                }
            }
            obj.extensible = false;
        }
    }

    /// Function payload, cloned so that the borrow ends before the body runs
    pub fn as_function(&self) -> Option<Function> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Function(func) => Some(func.clone()),
            _ => None,
        }
    }

    pub fn function_kind(&self) -> Option<FunctionKind> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Function(func) => Some(func.kind),
            _ => None,
        }
    }

    /// [[Call]]
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value> {
        let func = self
            .as_function()
            .ok_or_else(|| Error::type_error(messages::not_a_function(&self.to_js_string())))?;
        func.invoke(this, args)
    }

    /// [[Construct]]: a fresh instance linked to the callee's `prototype` runs
    /// through the body; a non-object completion is replaced by that instance.
    pub fn construct(&self, args: &[Value]) -> Result<Value> {
        let func = self
            .as_function()
            .ok_or_else(|| Error::type_error(messages::not_a_constructor(&self.to_js_string())))?;
        if !func.constructable {
            return Err(Error::type_error(messages::not_a_constructor(func.display_name())));
        }
        let prototype = match self.get("prototype") {
            Value::Object(proto) => Some(proto),
            _ => None,
        };
        let instance = Value::new_object_with_prototype(prototype);
        let result = func.invoke(&instance, args)?;
        Ok(if result.is_object() { result } else { instance })
    }

    /// Concrete error constructor of an error object
    pub fn error_kind(&self) -> Option<ErrorKind> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Error(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Time value of a Date (NaN for invalid dates)
    pub fn date_value(&self) -> Option<f64> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Date(time) => Some(*time),
            _ => None,
        }
    }

    /// Primitive held by a boxed Boolean/Number/String
    pub fn boxed_value(&self) -> Option<Value> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Boolean(b) => Some(Value::Boolean(*b)),
            ObjectKind::Number(n) => Some(Value::Number(*n)),
            ObjectKind::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    /// `(source, flags, lastIndex)` of a RegExp
    pub fn regexp_parts(&self) -> Option<(String, String, usize)> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::RegExp(re) => Some((re.source.clone(), re.flags.clone(), re.last_index)),
            _ => None,
        }
    }

    /// Test a string against a RegExp
    pub fn regexp_test(&self, input: &str) -> Option<bool> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::RegExp(re) => Some(re.regex.is_match(input)),
            _ => None,
        }
    }

    /// Array length (holes included)
    pub fn array_len(&self) -> Option<usize> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Array(elements) => Some(elements.len()),
            _ => None,
        }
    }

    pub fn array_push(&self, value: Value) {
        if let Some(obj) = self.as_object() {
            if let ObjectKind::Array(elements) = &mut obj.borrow_mut().kind {
                elements.push(Some(value));
            }
        }
    }

    /// Map lookup using SameValueZero
    pub fn map_get(&self, key: &Value) -> Option<Value> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.same_value_zero(key))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Insert or overwrite a Map entry
    pub fn map_set(&self, key: Value, value: Value) {
        if let Some(obj) = self.as_object() {
            if let ObjectKind::Map(entries) = &mut obj.borrow_mut().kind {
                match entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
            }
        }
    }

    /// Snapshot of a Map's entries in insertion order
    pub fn map_entries(&self) -> Option<Vec<(Value, Value)>> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Map(entries) => Some(entries.clone()),
            _ => None,
        }
    }

    /// Add a Set member (no-op if already present)
    pub fn set_add(&self, item: Value) {
        if let Some(obj) = self.as_object() {
            if let ObjectKind::Set(items) = &mut obj.borrow_mut().kind {
                if !items.iter().any(|i| i.same_value_zero(&item)) {
                    items.push(item);
                }
            }
        }
    }

    /// Snapshot of a Set's members in insertion order
    pub fn set_values(&self) -> Option<Vec<Value>> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Set(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Record a WeakMap entry
    pub fn weak_map_set(&self, key: &Value, value: Value) -> Result<()> {
        let key = key
            .as_object()
            .ok_or_else(|| Error::type_error("Invalid value used as weak map key"))?;
        if let Some(obj) = self.as_object() {
            if let ObjectKind::WeakMap(entries) = &mut obj.borrow_mut().kind {
                entries.retain(|(k, _)| k.strong_count() > 0 && !std::ptr::eq(k.as_ptr(), Rc::as_ptr(key)));
                entries.push((Rc::downgrade(key), value));
            }
        }
        Ok(())
    }

    /// WeakMap lookup by key identity
    pub fn weak_map_get(&self, key: &Value) -> Option<Value> {
        let key = key.as_object()?;
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::WeakMap(entries) => entries
                .iter()
                .find(|(k, _)| std::ptr::eq(k.as_ptr(), Rc::as_ptr(key)))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Byte length of an ArrayBuffer
    pub fn array_buffer_len(&self) -> Option<usize> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::ArrayBuffer(bytes) => Some(bytes.len()),
            _ => None,
        }
    }

    /// Copy of an ArrayBuffer's bytes
    pub fn array_buffer_bytes(&self) -> Option<Vec<u8>> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::ArrayBuffer(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Backing buffer of a TypedArray or DataView
    pub fn view_buffer(&self) -> Option<Value> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::TypedArray { buffer, .. } | ObjectKind::DataView { buffer, .. } => {
                Some(Value::Object(buffer.clone()))
            }
            _ => None,
        }
    }

    /// Element count of a TypedArray
    pub fn typed_array_len(&self) -> Option<usize> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::TypedArray { length, .. } => Some(*length),
            _ => None,
        }
    }

    /// Read a TypedArray element
    pub fn typed_array_get(&self, index: usize) -> Option<f64> {
        let obj = self.as_object()?.borrow();
        let ObjectKind::TypedArray { buffer, kind, byte_offset, length } = &obj.kind else {
            return None;
        };
        if index >= *length {
            return None;
        }
        let buffer = buffer.borrow();
        let ObjectKind::ArrayBuffer(bytes) = &buffer.kind else {
            return None;
        };
        let offset = byte_offset + index * kind.bytes_per_element();
        bytes.get(offset..offset + kind.bytes_per_element()).map(|slot| kind.read(slot))
    }

    /// Write a TypedArray element; out-of-range writes are ignored, as in JavaScript
    pub fn typed_array_set(&self, index: usize, value: f64) {
        let Some(obj) = self.as_object() else { return };
        let obj = obj.borrow();
        let ObjectKind::TypedArray { buffer, kind, byte_offset, length } = &obj.kind else {
            return;
        };
        if index >= *length {
            return;
        }
        let mut buffer = buffer.borrow_mut();
        if let ObjectKind::ArrayBuffer(bytes) = &mut buffer.kind {
            let offset = byte_offset + index * kind.bytes_per_element();
            if let Some(slot) = bytes.get_mut(offset..offset + kind.bytes_per_element()) {
                kind.write(slot, value);
            }
        }
    }

    /// Snapshot of a TypedArray's elements
    pub fn typed_array_values(&self) -> Option<Vec<f64>> {
        let len = self.typed_array_len()?;
        (0..len).map(|i| self.typed_array_get(i)).collect()
    }

    /// Slots of a Promise
    pub fn promise_handle(&self) -> Option<PromiseHandle> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Promise(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    pub fn promise_state(&self) -> Option<PromiseState> {
        self.promise_handle().map(|h| h.state())
    }

    /// Serialized href of a URL
    pub fn url_href(&self) -> Option<String> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Url(url) => Some(url.as_str().to_string()),
            _ => None,
        }
    }

    /// Entry list of URLSearchParams
    pub fn search_params(&self) -> Option<Vec<(String, String)>> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::UrlSearchParams(params) => Some(params.clone()),
            _ => None,
        }
    }

    /// Append to URLSearchParams
    pub fn search_params_append(&self, name: &str, value: &str) {
        if let Some(obj) = self.as_object() {
            if let ObjectKind::UrlSearchParams(params) = &mut obj.borrow_mut().kind {
                params.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Blob payload of a Blob or File
    pub fn blob_data(&self) -> Option<BlobData> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::Blob(blob) => Some(blob.clone()),
            ObjectKind::File(file) => Some(file.blob.clone()),
            _ => None,
        }
    }

    pub fn file_data(&self) -> Option<FileData> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::File(file) => Some(file.clone()),
            _ => None,
        }
    }

    /// Snapshot of FormData entries
    pub fn form_data_entries(&self) -> Option<Vec<(String, Value)>> {
        let obj = self.as_object()?.borrow();
        match &obj.kind {
            ObjectKind::FormData(entries) => Some(entries.clone()),
            _ => None,
        }
    }

    /// Append a FormData entry
    pub fn form_data_append(&self, name: &str, value: Value) {
        if let Some(obj) = self.as_object() {
            if let ObjectKind::FormData(entries) = &mut obj.borrow_mut().kind {
                entries.push((name.to_string(), value));
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Symbol(sym) => write!(f, "{:?}", sym),
            Value::Object(obj) => {
                // A value being mutated cannot be inspected; say so instead of panicking
                let Ok(obj) = obj.try_borrow() else {
                    return write!(f, "[object (borrowed)]");
                };
                match &obj.kind {
                    ObjectKind::Ordinary => write!(f, "{{...}}"),
                    ObjectKind::Array(elements) => write!(f, "Array({})", elements.len()),
                    ObjectKind::Function(func) => write!(f, "[{}: {}]", func.kind.constructor_name(), func.display_name()),
                    ObjectKind::Error(kind) => write!(f, "[{}]", kind),
                    ObjectKind::Boolean(b) => write!(f, "[Boolean: {}]", b),
                    ObjectKind::Number(n) => write!(f, "[Number: {}]", n),
                    ObjectKind::String(s) => write!(f, "[String: \"{}\"]", s),
                    ObjectKind::Date(time) => write!(f, "Date({})", time),
                    ObjectKind::RegExp(re) => write!(f, "/{}/{}", re.source, re.flags),
                    ObjectKind::Map(entries) => write!(f, "Map({})", entries.len()),
                    ObjectKind::Set(items) => write!(f, "Set({})", items.len()),
                    ObjectKind::WeakMap(_) => write!(f, "WeakMap {{ <items unknown> }}"),
                    ObjectKind::WeakSet(_) => write!(f, "WeakSet {{ <items unknown> }}"),
                    ObjectKind::WeakRef(_) => write!(f, "WeakRef"),
                    ObjectKind::ArrayBuffer(bytes) => write!(f, "ArrayBuffer({})", bytes.len()),
                    ObjectKind::TypedArray { kind, length, .. } => write!(f, "{}({})", kind.name(), length),
                    ObjectKind::DataView { byte_length, .. } => write!(f, "DataView({})", byte_length),
                    ObjectKind::Promise(handle) => write!(f, "Promise {{ <{:?}> }}", handle.state()),
                    ObjectKind::Url(url) => write!(f, "URL {{ {} }}", url),
                    ObjectKind::UrlSearchParams(params) => write!(f, "URLSearchParams({})", params.len()),
                    ObjectKind::Blob(blob) => write!(f, "Blob({}, {:?})", blob.size(), blob.mime_type),
                    ObjectKind::File(file) => write!(f, "File({:?}, {})", file.name, file.blob.size()),
                    ObjectKind::FormData(entries) => write!(f, "FormData({})", entries.len()),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

/// JavaScript object
pub struct Object {
    /// Object kind (internal slots)
    pub kind: ObjectKind,
    /// Own properties, in insertion order
    pub properties: PropertyMap,
    /// Prototype
    pub prototype: Option<ObjectRef>,
    /// Whether new properties may be added
    pub extensible: bool,
}

impl Object {
    /// Create a new object with no prototype
    pub fn new(kind: ObjectKind) -> Self {
        Self::with_prototype(kind, None)
    }

    pub fn with_prototype(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        Self {
            kind,
            properties: PropertyMap::default(),
            prototype,
            extensible: true,
        }
    }

    /// Own property descriptor, including array elements
    pub fn own_property(&self, key: &PropertyKey) -> Option<Property> {
        if let ObjectKind::Array(elements) = &self.kind {
            if let Some(idx) = key.as_index() {
                return elements.get(idx).and_then(|e| e.clone()).map(Property::data);
            }
            if key.as_str() == Some("length") {
                return Some(Property::data_with_flags(
                    Value::Number(elements.len() as f64),
                    PropertyFlags::WRITABLE,
                ));
            }
        }
        self.properties.get(key).cloned()
    }

    /// Value of an own data property
    pub fn data_value(&self, key: &str) -> Option<Value> {
        self.properties.get(&PropertyKey::from(key)).and_then(|p| p.value().cloned())
    }

    /// Own keys: present array indices ascending, then string keys, then symbol keys
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::new();
        if let ObjectKind::Array(elements) = &self.kind {
            keys.extend(
                elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.is_some())
                    .map(|(i, _)| PropertyKey::String(i.to_string())),
            );
        }
        keys.extend(own_keys(&self.properties));
        keys
    }

    /// Define an own property, replacing any existing descriptor
    pub fn define_own(&mut self, key: impl Into<PropertyKey>, property: Property) {
        let key = key.into();
        if let ObjectKind::Array(elements) = &mut self.kind {
            if let (Some(idx), Some(value)) = (key.as_index(), property.value()) {
                if idx >= elements.len() {
                    elements.resize(idx + 1, None);
                }
                elements[idx] = Some(value.clone());
                return;
            }
        }
        self.properties.insert(key, property);
    }

    /// Plain assignment (`obj[key] = value`) on own properties
    pub fn assign(&mut self, key: PropertyKey, value: Value) -> bool {
        if let ObjectKind::Array(elements) = &mut self.kind {
            if let Some(idx) = key.as_index() {
                if idx >= elements.len() {
                    if !self.extensible {
                        return false;
                    }
                    elements.resize(idx + 1, None);
                }
                elements[idx] = Some(value);
                return true;
            }
        }
        match self.properties.get_mut(&key) {
            Some(Property::Data { value: slot, flags }) => {
                if !flags.contains(PropertyFlags::WRITABLE) {
                    return false;
                }
                *slot = value;
                true
            }
            Some(Property::Accessor { .. }) => false,
            None if self.extensible => {
                self.properties.insert(key, Property::data(value));
                true
            }
            None => false,
        }
    }

    /// Remove an own property; non-configurable properties stay
    pub fn delete_own(&mut self, key: &PropertyKey) -> bool {
        if let ObjectKind::Array(elements) = &mut self.kind {
            if let Some(idx) = key.as_index() {
                if let Some(slot) = elements.get_mut(idx) {
                    *slot = None;
                }
                return true;
            }
        }
        match self.properties.get(key) {
            Some(prop) if !prop.flags().contains(PropertyFlags::CONFIGURABLE) => false,
            Some(_) => {
                self.properties.shift_remove(key);
                true
            }
            None => true,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("properties", &self.properties.len())
            .field("has_prototype", &self.prototype.is_some())
            .field("extensible", &self.extensible)
            .finish_non_exhaustive()
    }
}

/// Object kind
pub enum ObjectKind {
    /// Ordinary object
    Ordinary,
    /// Array object; `None` marks a hole
    Array(Vec<Option<Value>>),
    /// Function object
    Function(Function),
    /// Error object of a concrete error kind
    Error(ErrorKind),
    /// Boxed boolean
    Boolean(bool),
    /// Boxed number
    Number(f64),
    /// Boxed string
    String(String),
    /// Date object (time value, NaN when invalid)
    Date(f64),
    /// RegExp object
    RegExp(RegExpData),
    /// Map object
    Map(Vec<(Value, Value)>),
    /// Set object
    Set(Vec<Value>),
    /// WeakMap object (uses weak references for keys)
    WeakMap(Vec<(Weak<RefCell<Object>>, Value)>),
    /// WeakSet object (uses weak references for values)
    WeakSet(Vec<Weak<RefCell<Object>>>),
    /// WeakRef object
    WeakRef(Weak<RefCell<Object>>),
    /// ArrayBuffer - raw binary data
    ArrayBuffer(Vec<u8>),
    /// TypedArray - view into an ArrayBuffer object
    TypedArray {
        /// The underlying ArrayBuffer
        buffer: ObjectRef,
        /// Type of elements
        kind: TypedArrayKind,
        /// Byte offset into buffer
        byte_offset: usize,
        /// Number of elements
        length: usize,
    },
    /// DataView - arbitrary access to an ArrayBuffer object
    DataView {
        /// The underlying ArrayBuffer
        buffer: ObjectRef,
        /// Byte offset into buffer
        byte_offset: usize,
        /// Byte length of view
        byte_length: usize,
    },
    /// Promise object
    Promise(PromiseHandle),
    /// URL object
    Url(url::Url),
    /// URLSearchParams object
    UrlSearchParams(Vec<(String, String)>),
    /// Blob object
    Blob(BlobData),
    /// File object
    File(FileData),
    /// FormData object
    FormData(Vec<(String, Value)>),
}

/// Compiled regular expression with its JavaScript-visible parts
pub struct RegExpData {
    /// The pattern source text
    pub source: String,
    /// Flags: d, g, i, m, s, u, v, y
    pub flags: String,
    /// Compiled regex (using Rust regex crate)
    pub regex: regex::Regex,
    /// Last index for global/sticky matching
    pub last_index: usize,
}

impl RegExpData {
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        let mut seen = String::new();
        for flag in flags.chars() {
            if !"dgimsuvy".contains(flag) || seen.contains(flag) {
                return Err(Error::syntax_error(messages::invalid_regex(
                    source,
                    &format!("Invalid flags '{}'", flags),
                )));
            }
            seen.push(flag);
        }
        let regex = regex::RegexBuilder::new(source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| Error::syntax_error(messages::invalid_regex(source, &e.to_string())))?;
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
            last_index: 0,
        })
    }
}

/// Immutable Blob payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobData {
    /// Concatenated parts
    pub bytes: Rc<[u8]>,
    /// MIME type, lowercased ("" when unknown)
    pub mime_type: String,
}

impl BlobData {
    pub fn from_parts(parts: &[&[u8]], mime_type: &str) -> Self {
        Self {
            bytes: Rc::from(parts.concat()),
            mime_type: mime_type.to_ascii_lowercase(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// File payload: a Blob plus a name and modification time
#[derive(Clone, Debug, PartialEq)]
pub struct FileData {
    pub blob: BlobData,
    pub name: String,
    /// Milliseconds since the epoch
    pub last_modified: f64,
}

/// TypedArray element type
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    /// Every element type
    pub const ALL: [TypedArrayKind; 9] = [
        TypedArrayKind::Int8,
        TypedArrayKind::Uint8,
        TypedArrayKind::Uint8Clamped,
        TypedArrayKind::Int16,
        TypedArrayKind::Uint16,
        TypedArrayKind::Int32,
        TypedArrayKind::Uint32,
        TypedArrayKind::Float32,
        TypedArrayKind::Float64,
    ];

    /// Get the number of bytes per element
    pub fn bytes_per_element(&self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 => 8,
        }
    }

    /// Constructor name
    pub fn name(&self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }

    /// Decode one little-endian element from the front of `bytes`
    pub fn read(&self, bytes: &[u8]) -> f64 {
        let mut raw = [0u8; 8];
        raw[..self.bytes_per_element()].copy_from_slice(&bytes[..self.bytes_per_element()]);
        match self {
            TypedArrayKind::Int8 => raw[0] as i8 as f64,
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => raw[0] as f64,
            TypedArrayKind::Int16 => i16::from_le_bytes([raw[0], raw[1]]) as f64,
            TypedArrayKind::Uint16 => u16::from_le_bytes([raw[0], raw[1]]) as f64,
            TypedArrayKind::Int32 => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Uint32 => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Float32 => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Float64 => f64::from_le_bytes(raw),
        }
    }

    /// Encode one element little-endian into the front of `bytes`
    pub fn write(&self, bytes: &mut [u8], num: f64) {
        match self {
            TypedArrayKind::Int8 => bytes[0] = num as i8 as u8,
            TypedArrayKind::Uint8 => bytes[0] = num as u8,
            TypedArrayKind::Uint8Clamped => {
                // Clamp to 0-255
                bytes[0] = if num.is_nan() { 0 } else { num.clamp(0.0, 255.0).round() as u8 };
            }
            TypedArrayKind::Int16 => bytes[..2].copy_from_slice(&(num as i16).to_le_bytes()),
            TypedArrayKind::Uint16 => bytes[..2].copy_from_slice(&(num as u16).to_le_bytes()),
            TypedArrayKind::Int32 => bytes[..4].copy_from_slice(&(num as i32).to_le_bytes()),
            TypedArrayKind::Uint32 => bytes[..4].copy_from_slice(&(num as u32).to_le_bytes()),
            TypedArrayKind::Float32 => bytes[..4].copy_from_slice(&(num as f32).to_le_bytes()),
            TypedArrayKind::Float64 => bytes[..8].copy_from_slice(&num.to_le_bytes()),
        }
    }
}

/// ECMAScript TimeClip
fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME_VALUE {
        return f64::NAN;
    }
    // + 0.0 turns -0 into +0
    time.trunc() + 0.0
}

/// `application/x-www-form-urlencoded` serialization of an entry list
pub fn serialize_search_params(params: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_equality_is_identity_for_objects() {
        let a = Value::new_object();
        let b = Value::new_object();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert!(Value::Number(f64::NAN).same_value_zero(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_get_walks_prototype_chain() {
        let proto = Value::new_object();
        proto.set("greeting", Value::from("hi"));
        let obj = Value::new_object_with_prototype(proto.as_object().cloned());
        assert_eq!(obj.get("greeting"), Value::from("hi"));
        assert!(!obj.has_own_property("greeting"));
    }

    #[test]
    fn test_read_invokes_getter_with_receiver() {
        let obj = Value::new_object();
        obj.set("x", Value::Number(5.0));
        let getter = Value::new_function(Function::new("get", |this, _| Ok(this.get("x"))));
        obj.define_property("double_x", Property::accessor(Some(getter), None, PropertyFlags::DEFAULT));
        assert_eq!(obj.read("double_x").unwrap(), Value::Number(5.0));
        assert!(obj.get("double_x").is_undefined());
    }

    #[test]
    fn test_sparse_array_holes() {
        let arr = Value::new_sparse_array(vec![Some(Value::Number(1.0)), None, Some(Value::Number(3.0))]);
        assert_eq!(arr.array_len(), Some(3));
        assert!(arr.has_own_property("0"));
        assert!(!arr.has_own_property("1"));
        assert_eq!(arr.get("length"), Value::Number(3.0));
        assert_eq!(arr.to_js_string(), "1,,3");
    }

    #[test]
    fn test_construct_links_prototype_and_discards_primitive_result() {
        let point = Value::new_function(Function::new("Point", |this, args| {
            this.set("x", args.first().cloned().unwrap_or(Value::Undefined));
            Ok(Value::Number(42.0))
        }));
        let p = point.construct(&[Value::Number(3.0)]).unwrap();
        assert_eq!(p.get("x"), Value::Number(3.0));
        assert!(p.get("constructor").strict_equals(&point));
    }

    #[test]
    fn test_construct_rejects_arrows() {
        let arrow = Value::new_function(Function::arrow("f", |_, _| Ok(Value::Undefined)));
        let err = arrow.construct(&[]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
        assert!(!arrow.has_own_property("prototype"));
    }

    #[test]
    fn test_call_non_function_is_type_error() {
        let err = Value::new_object().call(&Value::Undefined, &[]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_date_time_clip() {
        assert_eq!(Value::new_date(1.9).date_value(), Some(1.0));
        assert!(Value::new_date(f64::NAN).date_value().unwrap().is_nan());
        assert!(Value::new_date(9e15).date_value().unwrap().is_nan());
    }

    #[test]
    fn test_regexp_flags() {
        let re = Value::new_regexp("ab+c", "gi").unwrap();
        assert_eq!(re.regexp_test("xABBCx"), Some(true));
        assert_eq!(re.to_js_string(), "/ab+c/gi");

        let err = Value::new_regexp("a", "gg").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SyntaxError));
        let err = Value::new_regexp("(", "").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SyntaxError));
    }

    #[test]
    fn test_map_uses_same_value_zero() {
        let map = Value::new_map(vec![(Value::Number(f64::NAN), Value::from("nan"))]);
        assert_eq!(map.map_get(&Value::Number(f64::NAN)), Some(Value::from("nan")));
        map.map_set(Value::Number(f64::NAN), Value::from("again"));
        assert_eq!(map.map_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_typed_array_shares_buffer() {
        let buffer = Value::new_array_buffer(vec![0; 8]);
        let a = Value::new_typed_array(&buffer, TypedArrayKind::Int32, 0, 2).unwrap();
        let b = Value::new_typed_array(&buffer, TypedArrayKind::Uint8, 4, 4).unwrap();
        a.typed_array_set(1, 258.0);
        assert_eq!(b.typed_array_values(), Some(vec![2.0, 1.0, 0.0, 0.0]));
        assert!(Value::new_typed_array(&buffer, TypedArrayKind::Int32, 4, 2).is_err());
        assert!(Value::new_typed_array(&buffer, TypedArrayKind::Int32, 2, 1).is_err());
    }

    #[test]
    fn test_uint8_clamped_write() {
        let arr = Value::new_typed_array_from(TypedArrayKind::Uint8Clamped, &[-5.0, 300.0, 1.5]);
        assert_eq!(arr.typed_array_values(), Some(vec![0.0, 255.0, 2.0]));
    }

    #[test]
    fn test_frozen_object_refuses_writes() {
        let obj = Value::new_object();
        obj.set("a", Value::Number(1.0));
        obj.freeze();
        assert!(!obj.set("a", Value::Number(2.0)));
        assert!(!obj.set("b", Value::Number(2.0)));
        assert!(!obj.delete("a"));
        assert_eq!(obj.get("a"), Value::Number(1.0));
    }

    #[test]
    fn test_url_and_search_params() {
        let url = Value::new_url("https://example.com/a?b=1#c").unwrap();
        assert_eq!(url.url_href().as_deref(), Some("https://example.com/a?b=1#c"));
        assert_eq!(Value::new_url("not a url").unwrap_err().kind(), Some(ErrorKind::TypeError));

        let params = Value::new_url_search_params("?q=a+b&x=%26");
        assert_eq!(
            params.search_params(),
            Some(vec![("q".into(), "a b".into()), ("x".into(), "&".into())])
        );
        assert_eq!(params.to_js_string(), "q=a+b&x=%26");
    }

    #[test]
    fn test_error_objects() {
        let err = Value::new_error(ErrorKind::TypeError, "bad");
        assert_eq!(err.error_kind(), Some(ErrorKind::TypeError));
        assert_eq!(err.get("name"), Value::from("TypeError"));
        assert!(!err.get_own_property("message").unwrap().is_enumerable());
        assert_eq!(err.to_js_string(), "TypeError: bad");
    }
}
