//! The dispatcher: classification, tracker lookup, strategy selection

use super::classify::{classify, Classification, TypeKey};
use super::options::DuplicateOptions;
use super::registry::{Entry, Registry};
use super::strategies;
use super::tracker::ReferenceTracker;
use crate::error::{Error, Result};
use crate::runtime::Value;
use std::rc::Rc;
use tracing::{debug, trace};

/// Duplicates values using its own registry.
///
/// Cloning is cheap: the registry is shared and immutable.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Rc<Registry>,
    options: DuplicateOptions,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// A dispatcher over the default registry
    pub fn new() -> Self {
        Self::with_registry(Registry::with_defaults())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry: Rc::new(registry),
            options: DuplicateOptions::default(),
        }
    }

    /// A dispatcher over the default registry as changed by `customize`
    pub fn customized<F>(customize: F) -> Self
    where
        F: FnOnce(&mut Registry),
    {
        let mut registry = Registry::with_defaults();
        customize(&mut registry);
        Self::with_registry(registry)
    }

    pub fn with_options(mut self, options: DuplicateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &DuplicateOptions {
        &self.options
    }

    /// Duplicate a value with a fresh tracker
    pub fn duplicate(&self, value: &Value) -> Result<Value> {
        let mut tracker = ReferenceTracker::new();
        self.duplicate_with(value, &mut tracker)
    }

    /// Duplicate a value, resuming with `tracker`: objects it already maps
    /// return their recorded duplicate.
    pub fn duplicate_with(&self, value: &Value, tracker: &mut ReferenceTracker) -> Result<Value> {
        if classify(value) == Classification::Primitive {
            return Ok(value.clone());
        }
        if let Some(duplicate) = tracker.get(value) {
            trace!(depth = tracker.depth(), "already duplicated");
            return Ok(duplicate);
        }
        if let Some(limit) = self.options.max_depth {
            if tracker.depth() >= limit {
                return Err(Error::stack_depth_exceeded(tracker.depth() + 1, limit));
            }
        }

        tracker.enter();
        let result = self.dispatch(value, tracker);
        tracker.leave();
        result
    }

    fn dispatch(&self, value: &Value, tracker: &mut ReferenceTracker) -> Result<Value> {
        let Some(entry) = self.resolve(value) else {
            return match classify(value) {
                Classification::Callable(kind) => {
                    debug!(?kind, "no strategy for callable, sharing it");
                    strategies::identity(value, tracker, self)
                }
                _ => {
                    trace!("no strategy, using plain object");
                    strategies::plain_object(value, tracker, self)
                }
            };
        };

        let duplicate = (entry.strategy)(value, tracker, self)?;
        if let Some(validator) = &entry.validator {
            if !validator(&duplicate) {
                debug!(?value, ?duplicate, "validator rejected duplicate, returning original");
                tracker.set(value, value.clone());
                return Ok(value.clone());
            }
        }
        if !tracker.has(value) {
            tracker.set(value, duplicate.clone());
        }
        Ok(duplicate)
    }

    /// Entry for the exact runtime type. Subtypes never inherit the entry of
    /// their supertype or of their built-in category.
    fn resolve(&self, value: &Value) -> Option<Entry> {
        let key = TypeKey::of(value)?;
        let entry = self.registry.get(&key)?;
        trace!(?key, "strategy selected");
        Some(entry.clone())
    }
}
