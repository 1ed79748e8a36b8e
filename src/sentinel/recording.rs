// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! This module contains an implementation of Sentinel that simply records
//! all calls in a human readable form. This is mostly useful for tests.

use super::{LeafSentinel, Sentinel, Visit};
use crate::{Pointer, Value};
use std::{convert::Infallible, fmt::Display};

/// A sentinel that records all calls.
#[derive(Debug, Default)]
pub struct RecordingSentinel {
    path: Vec<String>,
    /// A string-representation of each call that the sentinel has received.
    /// This is mostly useful for tests.
    pub changes_seen: Vec<String>,
}

impl RecordingSentinel {
    /// Create a new RecordingSentinel
    pub fn new() -> RecordingSentinel {
        RecordingSentinel {
            path: vec![],
            changes_seen: vec![],
        }
    }

    fn at(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join("/")
        }
    }
}

impl Sentinel for RecordingSentinel {
    type Error = Infallible;
}

impl<K: Display + ?Sized> Visit<K> for RecordingSentinel {
    fn enter(&mut self, key: &K) -> Result<(), Self::Error> {
        self.path.push(key.to_string());
        Ok(())
    }

    fn exit(&mut self) -> Result<(), Self::Error> {
        self.path.pop();
        Ok(())
    }
}

impl LeafSentinel for RecordingSentinel {
    fn update(&mut self, pointer: &Pointer, old: &Value, new: &Value) -> Result<(), Self::Error> {
        let change = if old.ptr_eq(new) {
            format!("keep {old} at {} via {pointer}", self.at())
        } else {
            format!("update {old} -> {new} at {} via {pointer}", self.at())
        };
        self.changes_seen.push(change);
        Ok(())
    }

    fn unmatched(&mut self, pointer: &Pointer) -> Result<(), Self::Error> {
        self.changes_seen
            .push(format!("unmatched {pointer} at {}", self.at()));
        Ok(())
    }

    fn abort(&mut self, key: &str) -> Result<(), Self::Error> {
        self.changes_seen
            .push(format!("abort at {} (missing {key})", self.at()));
        Ok(())
    }
}
