// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Pending operations of one update session.
//!
//! A [`Ledger`] maps each [`Pointer`] to the single [`Operation`] queued for it. Recording under
//! a pointer that already has an entry replaces that entry; there is no history. The default
//! pointer (`#`) has a slot of its own, so it never collides with a named pointer.
use crate::{GraftRandomState, Operation, Pointer, create_map};
use std::collections::HashMap;

/// Operations queued per pointer, consulted while an update is applied.
#[derive(Clone, Debug)]
pub struct Ledger {
    entries: HashMap<Pointer, Operation, GraftRandomState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: create_map(),
        }
    }

    /// Queues `operation` for `pointer`, returning the operation it replaces, if any.
    pub fn record(&mut self, pointer: Pointer, operation: Operation) -> Option<Operation> {
        self.entries.insert(pointer, operation)
    }

    /// Returns the operation queued for exactly this pointer.
    pub fn resolve(&self, pointer: &Pointer) -> Option<&Operation> {
        self.entries.get(pointer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the queued operations in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pointer, &Operation)> {
        self.entries.iter()
    }
}
