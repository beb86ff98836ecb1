//! Event Loop Implementation
//!
//! A microtask queue with Promise/A+ settlement semantics. Promise reactions
//! never run synchronously: settling a promise (or subscribing to one that is
//! already settled) enqueues the reaction, and it runs when the owner of the
//! loop drains it with [`EventLoop::run_microtasks`].

use crate::runtime::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A microtask to be executed (promise reactions, queueMicrotask, etc.)
pub type Microtask = Box<dyn FnOnce()>;

/// A promise reaction, run once with the settled outcome
pub type PromiseReaction = Box<dyn FnOnce(PromiseOutcome)>;

/// Promise state enum
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromiseState {
    /// Promise is pending - not yet settled
    Pending,
    /// Promise is fulfilled with a value
    Fulfilled,
    /// Promise is rejected with a reason
    Rejected,
}

/// How a promise settled
#[derive(Clone, Debug)]
pub enum PromiseOutcome {
    Fulfilled(Value),
    Rejected(Value),
}

impl PromiseOutcome {
    pub fn state(&self) -> PromiseState {
        match self {
            PromiseOutcome::Fulfilled(_) => PromiseState::Fulfilled,
            PromiseOutcome::Rejected(_) => PromiseState::Rejected,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            PromiseOutcome::Fulfilled(v) | PromiseOutcome::Rejected(v) => v,
        }
    }
}

/// Internal Promise state
pub struct PromiseInternal {
    /// Current state of the promise
    pub state: PromiseState,
    /// The settled value (fulfillment value or rejection reason)
    pub result: Option<Value>,
    /// Reactions waiting for this promise to settle
    reactions: Vec<PromiseReaction>,
    /// Whether a reaction was ever attached (for unhandled rejection tracking)
    pub handled: bool,
    /// The loop that schedules this promise's reactions
    event_loop: EventLoop,
}

impl fmt::Debug for PromiseInternal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseInternal")
            .field("state", &self.state)
            .field("result", &self.result)
            .field("reactions", &self.reactions.len())
            .field("handled", &self.handled)
            .finish()
    }
}

/// Shared handle to a promise's internal slots
#[derive(Clone, Debug)]
pub struct PromiseHandle(Rc<RefCell<PromiseInternal>>);

impl PromiseHandle {
    pub fn state(&self) -> PromiseState {
        self.0.borrow().state
    }

    /// The settled outcome, or `None` while pending
    pub fn outcome(&self) -> Option<PromiseOutcome> {
        let p = self.0.borrow();
        let value = p.result.clone().unwrap_or(Value::Undefined);
        match p.state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled => Some(PromiseOutcome::Fulfilled(value)),
            PromiseState::Rejected => Some(PromiseOutcome::Rejected(value)),
        }
    }

    /// The loop this promise schedules its reactions on
    pub fn event_loop(&self) -> EventLoop {
        self.0.borrow().event_loop.clone()
    }

    pub fn is_handled(&self) -> bool {
        self.0.borrow().handled
    }

    /// Fulfill a pending promise. Settling twice is a no-op.
    pub fn fulfill(&self, value: Value) {
        self.settle(PromiseOutcome::Fulfilled(value));
    }

    /// Reject a pending promise. Settling twice is a no-op.
    pub fn reject(&self, reason: Value) {
        self.settle(PromiseOutcome::Rejected(reason));
    }

    fn settle(&self, outcome: PromiseOutcome) {
        let mut p = self.0.borrow_mut();
        if p.state != PromiseState::Pending {
            return;
        }

        p.state = outcome.state();
        p.result = Some(outcome.value().clone());
        let reactions = std::mem::take(&mut p.reactions);
        let event_loop = p.event_loop.clone();
        drop(p);

        event_loop.inner.borrow_mut().stats.promises_settled += 1;
        for reaction in reactions {
            let outcome = outcome.clone();
            event_loop.enqueue_microtask(Box::new(move || reaction(outcome)));
        }
    }

    /// Attach a reaction (`.then(onSettled, onSettled)`)
    pub fn then(&self, reaction: PromiseReaction) {
        let mut p = self.0.borrow_mut();
        p.handled = true;
        if p.state == PromiseState::Pending {
            p.reactions.push(reaction);
            return;
        }
        drop(p);

        // Already settled - queue microtask immediately
        if let Some(outcome) = self.outcome() {
            self.event_loop()
                .enqueue_microtask(Box::new(move || reaction(outcome)));
        }
    }

    /// Whether two handles refer to the same promise
    pub fn ptr_eq(&self, other: &PromiseHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Runtime statistics for the event loop
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLoopStats {
    /// Total microtasks processed
    pub microtasks_run: u64,
    /// Total promises created
    pub promises_created: u64,
    /// Total promises settled (fulfilled or rejected)
    pub promises_settled: u64,
}

#[derive(Default)]
struct EventLoopInner {
    microtask_queue: VecDeque<Microtask>,
    stats: EventLoopStats,
}

/// The event loop manages the microtask queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct EventLoop {
    inner: Rc<RefCell<EventLoopInner>>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventLoop")
            .field("pending", &inner.microtask_queue.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

impl EventLoop {
    /// Create a new event loop
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_microtask(&self, task: Microtask) {
        self.inner.borrow_mut().microtask_queue.push_back(task);
    }

    pub fn has_pending_microtasks(&self) -> bool {
        !self.inner.borrow().microtask_queue.is_empty()
    }

    /// Drain the microtask queue, including tasks enqueued while draining.
    /// Returns the number of tasks run.
    pub fn run_microtasks(&self) -> usize {
        let mut processed = 0;
        loop {
            // The borrow must end before the task runs: tasks enqueue more tasks
            let next = self.inner.borrow_mut().microtask_queue.pop_front();
            let Some(task) = next else { break };
            task();
            processed += 1;
        }
        self.inner.borrow_mut().stats.microtasks_run += processed as u64;
        processed
    }

    pub fn stats(&self) -> EventLoopStats {
        self.inner.borrow().stats.clone()
    }

    /// Create the internal slots of a new pending promise
    pub fn create_promise_internal(&self) -> PromiseHandle {
        self.inner.borrow_mut().stats.promises_created += 1;
        PromiseHandle(Rc::new(RefCell::new(PromiseInternal {
            state: PromiseState::Pending,
            result: None,
            reactions: Vec::new(),
            handled: false,
            event_loop: self.clone(),
        })))
    }

    /// Create a new pending promise object
    pub fn create_promise(&self) -> Value {
        Value::new_promise(self.create_promise_internal())
    }

    /// Create a fulfilled promise object
    pub fn resolved(&self, value: Value) -> Value {
        let handle = self.create_promise_internal();
        handle.fulfill(value);
        Value::new_promise(handle)
    }

    /// Create a rejected promise object
    pub fn rejected(&self, reason: Value) -> Value {
        let handle = self.create_promise_internal();
        handle.reject(reason);
        Value::new_promise(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_reactions_are_deferred() {
        let el = EventLoop::new();
        let handle = el.create_promise_internal();
        let seen = Rc::new(RefCell::new(None));

        let sink = seen.clone();
        handle.then(Box::new(move |outcome| {
            *sink.borrow_mut() = Some(outcome.value().clone());
        }));
        handle.fulfill(Value::Number(7.0));

        assert!(seen.borrow().is_none());
        assert_eq!(el.run_microtasks(), 1);
        assert_eq!(*seen.borrow(), Some(Value::Number(7.0)));
    }

    #[test]
    fn test_then_on_settled_promise_still_defers() {
        let el = EventLoop::new();
        let handle = el.create_promise_internal();
        handle.reject(Value::String("nope".into()));

        let hit = Rc::new(Cell::new(false));
        let flag = hit.clone();
        handle.then(Box::new(move |outcome| {
            assert_eq!(outcome.state(), PromiseState::Rejected);
            flag.set(true);
        }));

        assert!(!hit.get());
        assert!(el.has_pending_microtasks());
        el.run_microtasks();
        assert!(hit.get());
        assert!(handle.is_handled());
    }

    #[test]
    fn test_settle_twice_is_noop() {
        let el = EventLoop::new();
        let handle = el.create_promise_internal();
        handle.fulfill(Value::Number(1.0));
        handle.reject(Value::Number(2.0));
        assert_eq!(handle.state(), PromiseState::Fulfilled);
        assert_eq!(handle.outcome().unwrap().value(), &Value::Number(1.0));
        assert_eq!(el.stats().promises_settled, 1);
    }

    #[test]
    fn test_tasks_enqueued_while_draining_run() {
        let el = EventLoop::new();
        let count = Rc::new(Cell::new(0));

        let inner_loop = el.clone();
        let c = count.clone();
        el.enqueue_microtask(Box::new(move || {
            c.set(c.get() + 1);
            let c2 = c.clone();
            inner_loop.enqueue_microtask(Box::new(move || c2.set(c2.get() + 1)));
        }));

        assert_eq!(el.run_microtasks(), 2);
        assert_eq!(count.get(), 2);
        assert_eq!(el.stats().microtasks_run, 2);
    }
}
