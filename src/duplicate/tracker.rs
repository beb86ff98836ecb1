//! Per-call map from visited source objects to their duplicates

use crate::runtime::{ObjectRef, Value};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Maps original objects (by pointer identity) to their duplicates.
///
/// Keys are object addresses; each entry also holds the source object so the
/// address cannot be reused by another allocation while the tracker lives.
/// Primitives are never tracked.
#[derive(Default)]
pub struct ReferenceTracker {
    seen: FxHashMap<usize, (ObjectRef, Value)>,
    depth: usize,
}

impl ReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn identity(obj: &ObjectRef) -> usize {
        Rc::as_ptr(obj) as *const () as usize
    }

    pub fn has(&self, source: &Value) -> bool {
        match source.as_object() {
            Some(obj) => self.seen.contains_key(&Self::identity(obj)),
            None => false,
        }
    }

    /// The duplicate recorded for `source`
    pub fn get(&self, source: &Value) -> Option<Value> {
        let obj = source.as_object()?;
        self.seen.get(&Self::identity(obj)).map(|(_, dup)| dup.clone())
    }

    /// Record (or re-point) the duplicate of `source`. Ignored for primitives.
    pub fn set(&mut self, source: &Value, duplicate: Value) {
        if let Some(obj) = source.as_object() {
            self.seen.insert(Self::identity(obj), (obj.clone(), duplicate));
        }
    }

    /// Number of distinct source objects visited
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Current nesting depth of the traversal
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Copy of the recorded mappings at depth zero, for traversals that
    /// resume after the current call has returned
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            seen: self.seen.clone(),
            depth: 0,
        }
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl std::fmt::Debug for ReferenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceTracker")
            .field("tracked", &self.seen.len())
            .field("depth", &self.depth)
            .finish()
    }
}
