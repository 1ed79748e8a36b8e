// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The selective tree cloner.
//!
//! [`select_transform`] walks a selector against a value, depth first and in selector key order:
//!
//! - At a [`SelectorNode::Branch`], the current container is shallow-cloned and every selected
//!   child is replaced with the result of recursing into it. Children the selector does not name
//!   are carried over by reference.
//! - At a [`SelectorNode::Pointer`], the pointer is resolved against the [`Ledger`]. A queued
//!   operation is applied to the current value; without one, the value is kept as is.
//!
//! If a selected key is missing from the value (or holds `null`), the branch being built at that
//! level is thrown away and the original container is used instead. That includes any sibling
//! keys that were already rewritten earlier in the same branch.
//!
//! Reaching a pointer leaf while the ledger is entirely empty is a usage error
//! ([`ApplyError::NoOperationQueued`]) and aborts the whole traversal.
use crate::{
    Ledger, Pointer, SelectorNode, Value,
    selector::Branch,
    sentinel::{DummySentinel, LeafSentinel, Visit},
    value::array_index,
};
use smallvec::SmallVec;
use std::{convert::Infallible, error, fmt};
use tracing::{debug, trace};

/// Error returned when an update cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError<E = Infallible> {
    /// A pointer leaf was reached but no operation was queued at all.
    NoOperationQueued { path: SmallVec<[String; 4]> },

    /// A sentinel rejected the update at `path`.
    Rejected {
        path: SmallVec<[String; 4]>,
        error: E,
    },
}

impl<E> ApplyError<E> {
    /// The position in the value at which the apply was aborted.
    pub fn path(&self) -> &[String] {
        match self {
            ApplyError::NoOperationQueued { path } | ApplyError::Rejected { path, .. } => path,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ApplyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::NoOperationQueued { path } => write!(
                f,
                "operation required: reached pointer at {} but no operation was queued",
                DisplayPath(path)
            ),
            ApplyError::Rejected { path, error } => {
                write!(f, "update at {} rejected: {error}", DisplayPath(path))
            }
        }
    }
}

impl<E: error::Error + 'static> error::Error for ApplyError<E> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ApplyError::NoOperationQueued { .. } => None,
            ApplyError::Rejected { error, .. } => Some(error),
        }
    }
}

struct DisplayPath<'a>(&'a [String]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<root>")?;
        for p in self.0 {
            write!(f, ".{p}")?;
        }
        Ok(())
    }
}

/// Applies the operations in `ledger` to the leaves of `node` addressed by `selector`.
///
/// `node` itself is never modified. Every subtree the selector does not reach is shared with the
/// result.
///
/// ```rust
/// use graftree::{Ledger, Operation, Pointer, SelectorNode, select_transform, value};
///
/// let mut ledger = Ledger::new();
/// ledger.record(Pointer::Default, Operation::Delete("b".into()));
///
/// let original = value!({ "a" => 1, "b" => 2 });
/// let result = select_transform(&original, &SelectorNode::Pointer(Pointer::Default), &ledger);
/// assert_eq!(result.unwrap(), value!({ "a" => 1 }));
/// ```
pub fn select_transform(
    node: &Value,
    selector: &SelectorNode,
    ledger: &Ledger,
) -> Result<Value, ApplyError> {
    select_transform_with(node, selector, ledger, &mut DummySentinel)
}

/// Like [`select_transform`], reporting the traversal to `sentinel`.
pub fn select_transform_with<S>(
    node: &Value,
    selector: &SelectorNode,
    ledger: &Ledger,
    sentinel: &mut S,
) -> Result<Value, ApplyError<S::Error>>
where
    S: Visit<str> + LeafSentinel,
{
    Cloner {
        ledger,
        sentinel,
        path: SmallVec::new(),
    }
    .transform(node, selector)
}

struct Cloner<'a, S> {
    ledger: &'a Ledger,
    sentinel: &'a mut S,
    // keys entered so far, for error reporting
    path: SmallVec<[String; 4]>,
}

impl<S> Cloner<'_, S>
where
    S: Visit<str> + LeafSentinel,
{
    fn transform(
        &mut self,
        node: &Value,
        selector: &SelectorNode,
    ) -> Result<Value, ApplyError<S::Error>> {
        match selector {
            SelectorNode::Pointer(pointer) => self.resolve(node, pointer),
            SelectorNode::Branch(branch) => self.branch(node, branch),
        }
    }

    fn resolve(&mut self, node: &Value, pointer: &Pointer) -> Result<Value, ApplyError<S::Error>> {
        if self.ledger.is_empty() {
            return Err(ApplyError::NoOperationQueued {
                path: self.path.clone(),
            });
        }

        let Some(operation) = self.ledger.resolve(pointer) else {
            trace!(%pointer, path = %DisplayPath(&self.path), "no operation queued for pointer");
            check(self.sentinel.unmatched(pointer), &self.path)?;
            return Ok(node.clone());
        };

        let new = operation.apply(node);
        trace!(
            %pointer,
            path = %DisplayPath(&self.path),
            operation = %operation.kind(),
            changed = !new.ptr_eq(node),
            "resolved pointer"
        );
        check(self.sentinel.update(pointer, node, &new), &self.path)?;
        Ok(new)
    }

    fn branch(&mut self, node: &Value, branch: &Branch) -> Result<Value, ApplyError<S::Error>> {
        let mut clone = match node {
            Value::Object(object) => Value::Object(object.shallow_clone()),
            Value::Array(array) => Value::Array(array.shallow_clone()),
            // scalars have no children, so any selected key aborts below
            _ if branch.is_empty() => return Ok(node.clone()),
            _ => node.clone(),
        };

        for (key, selector) in branch.iter() {
            let Some(child) = clone.child(key).filter(|c| !c.is_null()).cloned() else {
                debug!(
                    path = %DisplayPath(&self.path),
                    missing = key,
                    "selected key is missing, keeping original branch"
                );
                check(self.sentinel.abort(key), &self.path)?;
                return Ok(node.clone());
            };

            check(self.sentinel.enter(key), &self.path)?;
            self.path.push(key.to_string());
            let updated = self.transform(&child, selector)?;
            self.path.pop();
            check(self.sentinel.exit(), &self.path)?;

            replace_child(&mut clone, key, updated);
        }

        Ok(clone)
    }
}

fn check<E>(result: Result<(), E>, path: &SmallVec<[String; 4]>) -> Result<(), ApplyError<E>> {
    result.map_err(|error| ApplyError::Rejected {
        path: path.clone(),
        error,
    })
}

// `container` is always a fresh shallow clone here, so this never copies again.
fn replace_child(container: &mut Value, key: &str, child: Value) {
    match container {
        Value::Object(object) => {
            object.insert(key, child);
        }
        Value::Array(array) => {
            if let Some(index) = array_index(key) {
                array.set(index, child);
            }
        }
        _ => {}
    }
}
