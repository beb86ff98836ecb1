//! Strategy registry: runtime type identity -> duplication strategy

use super::classify::{BuiltinType, TypeKey};
use super::dispatcher::Dispatcher;
use super::strategies;
use super::tracker::ReferenceTracker;
use super::validators;
use crate::error::{ErrorKind, Result};
use crate::runtime::{TypedArrayKind, Value};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A duplication strategy: builds the duplicate of `source`, recursing
/// through the dispatcher for children.
pub type Strategy = Rc<dyn Fn(&Value, &mut ReferenceTracker, &Dispatcher) -> Result<Value>>;

/// A predicate run on a strategy's output
pub type Validator = Rc<dyn Fn(&Value) -> bool>;

/// A registered strategy and its optional validator
#[derive(Clone)]
pub struct Entry {
    pub strategy: Strategy,
    pub validator: Option<Validator>,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("validated", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// At most one entry per type key; registering again replaces the entry.
#[derive(Clone, Default)]
pub struct Registry {
    entries: FxHashMap<TypeKey, Entry>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with a strategy for every built-in category
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.set_validated_strategy(BuiltinType::Object, strategies::plain_object, validators::is_plain_object);
        registry.set_validated_strategy(BuiltinType::Array, strategies::array, validators::is_array);
        registry.set_validated_strategy(BuiltinType::Map, strategies::map, validators::is_map);
        registry.set_validated_strategy(BuiltinType::Set, strategies::set, validators::is_set);
        registry.set_validated_strategy(BuiltinType::Date, strategies::date, validators::is_date);
        registry.set_validated_strategy(BuiltinType::RegExp, strategies::regexp, validators::is_regexp);
        registry.set_validated_strategy(BuiltinType::Promise, strategies::promise, validators::is_promise);

        for kind in [
            BuiltinType::Function,
            BuiltinType::AsyncFunction,
            BuiltinType::GeneratorFunction,
            BuiltinType::AsyncGeneratorFunction,
        ] {
            registry.set_validated_strategy(kind, strategies::function, validators::is_callable);
        }
        for kind in ErrorKind::ALL {
            registry.set_validated_strategy(BuiltinType::Error(kind), strategies::error, validators::is_error);
        }
        for kind in [BuiltinType::Boolean, BuiltinType::Number, BuiltinType::String] {
            registry.set_strategy(kind, strategies::boxed_primitive);
        }

        registry.set_strategy(BuiltinType::ArrayBuffer, strategies::array_buffer);
        for kind in TypedArrayKind::ALL {
            registry.set_strategy(BuiltinType::TypedArray(kind), strategies::typed_array);
        }
        registry.set_strategy(BuiltinType::DataView, strategies::data_view);

        // Membership of weak collections is not observable
        registry.set_strategy(BuiltinType::WeakMap, strategies::identity);
        registry.set_strategy(BuiltinType::WeakSet, strategies::identity);
        registry.set_strategy(BuiltinType::WeakRef, strategies::identity);

        registry.set_strategy(BuiltinType::Url, strategies::url);
        registry.set_strategy(BuiltinType::UrlSearchParams, strategies::url_search_params);
        registry.set_strategy(BuiltinType::Blob, strategies::blob);
        registry.set_strategy(BuiltinType::File, strategies::file);
        registry.set_strategy(BuiltinType::FormData, strategies::form_data);

        registry
    }

    /// Register a strategy with no validator, replacing any existing entry
    pub fn set_strategy<F>(&mut self, key: impl Into<TypeKey>, strategy: F)
    where
        F: Fn(&Value, &mut ReferenceTracker, &Dispatcher) -> Result<Value> + 'static,
    {
        self.entries.insert(
            key.into(),
            Entry {
                strategy: Rc::new(strategy),
                validator: None,
            },
        );
    }

    /// Register a strategy whose output must pass `validator`, replacing any existing entry
    pub fn set_validated_strategy<F, V>(&mut self, key: impl Into<TypeKey>, strategy: F, validator: V)
    where
        F: Fn(&Value, &mut ReferenceTracker, &Dispatcher) -> Result<Value> + 'static,
        V: Fn(&Value) -> bool + 'static,
    {
        self.entries.insert(
            key.into(),
            Entry {
                strategy: Rc::new(strategy),
                validator: Some(Rc::new(validator)),
            },
        );
    }

    pub fn has_strategy(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Strategy for a value's exact runtime type. Supertypes are not consulted.
    pub fn get_strategy(&self, value: &Value) -> Option<Strategy> {
        self.entry_for(value).map(|entry| entry.strategy.clone())
    }

    /// Entry for a value's exact runtime type
    pub fn entry_for(&self, value: &Value) -> Option<&Entry> {
        self.entries.get(&TypeKey::of(value)?)
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn remove_strategy(&mut self, key: &TypeKey) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("entries", &self.entries.len()).finish()
    }
}
