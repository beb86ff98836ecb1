//! Promise helpers
//!
//! Thin functions over promise objects, so callers holding a [`Value`] don't
//! have to reach into the internal slots themselves.

use super::value::Value;
use crate::error::{Error, Result};
use crate::event_loop::{PromiseHandle, PromiseOutcome, PromiseState};

fn handle_of(promise: &Value) -> Result<PromiseHandle> {
    promise
        .promise_handle()
        .ok_or_else(|| Error::type_error(format!("{} is not a promise", promise.type_of())))
}

/// Current state of a promise object
pub fn promise_state(promise: &Value) -> Option<PromiseState> {
    promise.promise_state()
}

/// Settled value of a promise object (`None` while pending or for non-promises)
pub fn promise_result(promise: &Value) -> Option<Value> {
    promise
        .promise_handle()
        .and_then(|h| h.outcome())
        .map(|outcome| outcome.value().clone())
}

/// Fulfill a pending promise object
pub fn resolve_promise(promise: &Value, value: Value) -> Result<()> {
    handle_of(promise)?.fulfill(value);
    Ok(())
}

/// Reject a pending promise object
pub fn reject_promise(promise: &Value, reason: Value) -> Result<()> {
    handle_of(promise)?.reject(reason);
    Ok(())
}

/// Run `callback` once the promise settles (always from a microtask)
pub fn on_settled<F>(promise: &Value, callback: F) -> Result<()>
where
    F: FnOnce(PromiseOutcome) + 'static,
{
    handle_of(promise)?.then(Box::new(callback));
    Ok(())
}
