// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Update sessions: the fluent API on top of the ledger and the cloner.
//!
//! A [`Session`] holds a validated [`Selector`] and can be bound to any number of values. Each
//! binding yields an [`UpdateBuilder`], which queues operations and finally applies them.
//!
//! # Example
//!
//! ```
//! use graftree::{Session, value};
//!
//! let session = Session::try_from(&value!({ "user" => { "tags" => "#", "name" => "#/name" } }))
//!     .unwrap();
//!
//! let alice = value!({ "user" => { "name" => "alice", "tags" => ["admin"] } });
//!
//! let mut tx = session.bind(&alice);
//! tx.append("owner");
//! tx.of("#/name").pipe(|name| name.as_str().map(str::to_uppercase).into());
//!
//! let updated = tx.apply().unwrap();
//! assert_eq!(updated, value!({ "user" => { "name" => "ALICE", "tags" => ["admin", "owner"] } }));
//! ```
//!
//! # Builder Semantics
//!
//! - The builder starts out on the default pointer (`#`). [`UpdateBuilder::of`] switches to a
//!   named pointer for the operations that follow.
//! - Every operation method records one entry for the current pointer, replacing whatever was
//!   queued for that pointer before. Payloads are not checked until the update is applied.
//! - [`UpdateBuilder::apply`] takes `&self`: the builder stays usable afterwards, and changes made
//!   to it later do not affect results that were already returned.
//!
//! # Ownership
//!
//! The builder borrows the original value for its whole lifetime, which guarantees the value is
//! neither moved nor mutated while updates are pending. The ledger and the current pointer belong
//! to the builder alone, so independent builders never see each other's operations.
use crate::{
    Array, Key, Ledger, Object, Operation, Pointer, Selector, SelectorError, Value,
    cloner::{ApplyError, select_transform_with},
    sentinel::{DummySentinel, LeafSentinel, Visit},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates `selector` and returns a session for it.
///
/// Fails with [`SelectorError::InvalidSelector`] if `selector` is not an object with at least one
/// key, before any value is touched.
pub fn create_session(selector: &Value) -> Result<Session, SelectorError> {
    Session::try_from(selector)
}

/// A reusable update session for one selector.
///
/// Cloning a session is cheap; clones share the selector.
#[derive(Debug, Clone)]
pub struct Session {
    selector: Arc<Selector>,
}

impl Session {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector: Arc::new(selector),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Binds the session to `original`, starting a fresh set of pending operations.
    pub fn bind<'a>(&'a self, original: &'a Value) -> UpdateBuilder<'a> {
        UpdateBuilder {
            original,
            selector: &self.selector,
            ledger: Ledger::new(),
            current: Pointer::Default,
        }
    }
}

impl From<Selector> for Session {
    fn from(value: Selector) -> Self {
        Self::new(value)
    }
}

impl TryFrom<&Value> for Session {
    type Error = SelectorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Selector::from_value(value).map(Self::new)
    }
}

/// Collects operations for one value and applies them in a single pass.
///
/// See the [module documentation](self) for the semantics of each method.
#[derive(Debug, Clone)]
pub struct UpdateBuilder<'a> {
    original: &'a Value,
    selector: &'a Selector,
    ledger: Ledger,
    current: Pointer,
}

impl<'a> UpdateBuilder<'a> {
    /// Makes `pointer` the target of subsequent operations.
    ///
    /// Only named pointers (a `#` followed by at least one character) are accepted. Anything else,
    /// including the empty string and the bare `#`, leaves the current pointer unchanged.
    pub fn of(&mut self, pointer: &str) -> &mut Self {
        match Pointer::parse_named(pointer) {
            Some(p) => self.current = p,
            None if pointer.is_empty() => {}
            None => warn!(pointer, current = %self.current, "ignoring malformed pointer"),
        }
        self
    }

    /// Queues replacing the target with `value`. A `null` value leaves the target unchanged.
    pub fn set(&mut self, value: impl Into<Value>) -> &mut Self {
        self.record(Operation::Set(value.into()))
    }

    /// Queues shallow-merging `entries` into the target object.
    pub fn merge(&mut self, entries: impl Into<Object>) -> &mut Self {
        self.record(Operation::Merge(entries.into()))
    }

    /// Queues appending all of `items` to the target array.
    pub fn extend(&mut self, items: impl Into<Array>) -> &mut Self {
        self.record(Operation::Extend(items.into()))
    }

    /// Queues appending `item` to the target array.
    pub fn append(&mut self, item: impl Into<Value>) -> &mut Self {
        self.record(Operation::Append(item.into()))
    }

    /// Queues removing `key` from the target object or array.
    pub fn delete(&mut self, key: impl Into<Key>) -> &mut Self {
        self.record(Operation::Delete(key.into()))
    }

    /// Queues replacing the target with `f` applied to it.
    pub fn pipe<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.record(Operation::pipe(f))
    }

    /// Queues an already constructed operation for the current pointer.
    pub fn record(&mut self, operation: Operation) -> &mut Self {
        self.ledger.record(self.current.clone(), operation);
        self
    }

    /// Applies the queued operations and returns the updated value.
    ///
    /// Fails with [`ApplyError::NoOperationQueued`] if the selector reaches a pointer leaf while no
    /// operation has been queued at all.
    pub fn apply(&self) -> Result<Value, ApplyError> {
        self.apply_with(&mut DummySentinel)
    }

    /// Like [`UpdateBuilder::apply`], reporting the traversal to `sentinel`.
    pub fn apply_with<S>(&self, sentinel: &mut S) -> Result<Value, ApplyError<S::Error>>
    where
        S: Visit<str> + LeafSentinel,
    {
        debug!(pending = self.ledger.len(), "applying update");
        let result =
            select_transform_with(self.original, self.selector.root(), &self.ledger, sentinel);
        match &result {
            Ok(updated) => debug!(changed = !updated.ptr_eq(self.original), "update applied"),
            Err(ApplyError::NoOperationQueued { .. }) => {
                debug!("apply reached a pointer with no operation queued")
            }
            Err(ApplyError::Rejected { .. }) => debug!("update rejected by sentinel"),
        }
        result
    }

    /// The pointer that the next operation will be recorded for.
    pub fn current_pointer(&self) -> &Pointer {
        &self.current
    }

    /// The number of pointers with a queued operation.
    pub fn pending(&self) -> usize {
        self.ledger.len()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn original(&self) -> &'a Value {
        self.original
    }
}
