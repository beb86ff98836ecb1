//! Value classification and runtime type identity

use crate::error::ErrorKind;
use crate::runtime::{FunctionKind, Object, ObjectKind, ObjectRef, TypedArrayKind, Value};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Dispatch category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Returned unchanged
    Primitive,
    /// Has a [[Call]] slot
    Callable(FunctionKind),
    /// Any other object
    Object,
}

/// Classify a value. Total over every value; never fails.
pub fn classify(value: &Value) -> Classification {
    match value {
        Value::Object(_) => match value.function_kind() {
            Some(kind) => Classification::Callable(kind),
            None => Classification::Object,
        },
        _ => Classification::Primitive,
    }
}

/// Built-in category, derived from an object's internal slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Object,
    Array,
    Function,
    AsyncFunction,
    GeneratorFunction,
    AsyncGeneratorFunction,
    Error(ErrorKind),
    Boolean,
    Number,
    String,
    Date,
    RegExp,
    Map,
    Set,
    WeakMap,
    WeakSet,
    WeakRef,
    ArrayBuffer,
    TypedArray(TypedArrayKind),
    DataView,
    Promise,
    Url,
    UrlSearchParams,
    Blob,
    File,
    FormData,
}

impl BuiltinType {
    pub fn of(object: &Object) -> Self {
        match &object.kind {
            ObjectKind::Ordinary => BuiltinType::Object,
            ObjectKind::Array(_) => BuiltinType::Array,
            ObjectKind::Function(func) => BuiltinType::from(func.kind),
            ObjectKind::Error(kind) => BuiltinType::Error(*kind),
            ObjectKind::Boolean(_) => BuiltinType::Boolean,
            ObjectKind::Number(_) => BuiltinType::Number,
            ObjectKind::String(_) => BuiltinType::String,
            ObjectKind::Date(_) => BuiltinType::Date,
            ObjectKind::RegExp(_) => BuiltinType::RegExp,
            ObjectKind::Map(_) => BuiltinType::Map,
            ObjectKind::Set(_) => BuiltinType::Set,
            ObjectKind::WeakMap(_) => BuiltinType::WeakMap,
            ObjectKind::WeakSet(_) => BuiltinType::WeakSet,
            ObjectKind::WeakRef(_) => BuiltinType::WeakRef,
            ObjectKind::ArrayBuffer(_) => BuiltinType::ArrayBuffer,
            ObjectKind::TypedArray { kind, .. } => BuiltinType::TypedArray(*kind),
            ObjectKind::DataView { .. } => BuiltinType::DataView,
            ObjectKind::Promise(_) => BuiltinType::Promise,
            ObjectKind::Url(_) => BuiltinType::Url,
            ObjectKind::UrlSearchParams(_) => BuiltinType::UrlSearchParams,
            ObjectKind::Blob(_) => BuiltinType::Blob,
            ObjectKind::File(_) => BuiltinType::File,
            ObjectKind::FormData(_) => BuiltinType::FormData,
        }
    }

    /// Name of the intrinsic constructor
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Object => "Object",
            BuiltinType::Array => "Array",
            BuiltinType::Function => "Function",
            BuiltinType::AsyncFunction => "AsyncFunction",
            BuiltinType::GeneratorFunction => "GeneratorFunction",
            BuiltinType::AsyncGeneratorFunction => "AsyncGeneratorFunction",
            BuiltinType::Error(kind) => kind.name(),
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Number => "Number",
            BuiltinType::String => "String",
            BuiltinType::Date => "Date",
            BuiltinType::RegExp => "RegExp",
            BuiltinType::Map => "Map",
            BuiltinType::Set => "Set",
            BuiltinType::WeakMap => "WeakMap",
            BuiltinType::WeakSet => "WeakSet",
            BuiltinType::WeakRef => "WeakRef",
            BuiltinType::ArrayBuffer => "ArrayBuffer",
            BuiltinType::TypedArray(kind) => kind.name(),
            BuiltinType::DataView => "DataView",
            BuiltinType::Promise => "Promise",
            BuiltinType::Url => "URL",
            BuiltinType::UrlSearchParams => "URLSearchParams",
            BuiltinType::Blob => "Blob",
            BuiltinType::File => "File",
            BuiltinType::FormData => "FormData",
        }
    }
}

impl From<FunctionKind> for BuiltinType {
    fn from(kind: FunctionKind) -> Self {
        match kind {
            FunctionKind::Normal => BuiltinType::Function,
            FunctionKind::Async => BuiltinType::AsyncFunction,
            FunctionKind::Generator => BuiltinType::GeneratorFunction,
            FunctionKind::AsyncGenerator => BuiltinType::AsyncGeneratorFunction,
        }
    }
}

/// A user constructor, compared and hashed by reference identity
#[derive(Clone)]
pub struct ConstructorKey(ObjectRef);

impl ConstructorKey {
    /// Key for a callable value; `None` for anything else
    pub fn new(constructor: &Value) -> Option<Self> {
        if !constructor.is_callable() {
            return None;
        }
        constructor.as_object().cloned().map(ConstructorKey)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl PartialEq for ConstructorKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ConstructorKey {}

impl Hash for ConstructorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl std::fmt::Debug for ConstructorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstructorKey({:?})", self.as_value())
    }
}

/// Runtime type identity, the key of the strategy registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Builtin(BuiltinType),
    Constructor(ConstructorKey),
}

impl TypeKey {
    /// Type identity of a value: its `constructor` (found on the object or
    /// its prototype chain) when that is a function, otherwise the built-in
    /// category of its internal slots. `None` for primitives.
    pub fn of(value: &Value) -> Option<TypeKey> {
        let obj = value.as_object()?;
        if let Some(key) = find_constructor(obj) {
            return Some(TypeKey::Constructor(key));
        }
        Some(TypeKey::Builtin(BuiltinType::of(&obj.borrow())))
    }

    /// Key for a user constructor. `None` if the value is not callable.
    pub fn constructor(constructor: &Value) -> Option<TypeKey> {
        ConstructorKey::new(constructor).map(TypeKey::Constructor)
    }

    pub fn as_builtin(&self) -> Option<BuiltinType> {
        match self {
            TypeKey::Builtin(b) => Some(*b),
            TypeKey::Constructor(_) => None,
        }
    }
}

impl From<BuiltinType> for TypeKey {
    fn from(builtin: BuiltinType) -> Self {
        TypeKey::Builtin(builtin)
    }
}

fn find_constructor(obj: &ObjectRef) -> Option<ConstructorKey> {
    let mut current = Some(obj.clone());
    while let Some(obj_rc) = current {
        let obj = obj_rc.borrow();
        if let Some(ctor) = obj.data_value("constructor") {
            // A non-function `constructor` shadows everything above it
            return ConstructorKey::new(&ctor);
        }
        current = obj.prototype.clone();
    }
    None
}
