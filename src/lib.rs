// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Graftree: Selector-Driven Immutable Updates
//!
//! This crate updates deeply nested, JSON-like values without mutating them. Instead of a string
//! path, the caller describes *where* to write with a [`Selector`]: a tree shaped like a subset of
//! the target value, whose leaves are **pointer markers** (strings starting with `#`). The caller
//! then queues one operation per pointer and applies them all in a single pass.
//!
//! The result shares every subtree the selector does not reach with the original value. Only the
//! containers along a matched path are shallow-cloned, so an update costs `O(depth)` allocations
//! regardless of how large the rest of the document is.
//!
//! ## Core Concepts
//!
//! - [`Value`]: the dynamically typed document. [`Array`]s and [`Object`]s are reference counted,
//!   so cloning a value is cheap and [`Value::ptr_eq`] tells whether two values are the *same*
//!   container rather than merely equal ones.
//! - [`Selector`]: the validated shape that addresses the leaves to update.
//! - [`Pointer`]: the tag at a selector leaf. The bare marker `#` is the default pointer; any
//!   longer marker such as `#/name` is a named pointer, which lets one selector carry several
//!   independent update targets.
//! - [`Operation`]: one of `set`, `merge`, `extend`, `append`, `delete` or `pipe`, with a payload
//!   typed for that operation. Operations never fail: invalid input leaves the leaf untouched.
//! - [`Ledger`]: the pending operations of one update session, keyed by pointer.
//! - [`Session`] and [`UpdateBuilder`]: the fluent surface that fills the ledger and runs the
//!   traversal.
//!
//! ## Getting Started
//!
//! ```rust
//! use graftree::{Session, Value, value};
//!
//! let original = value!({
//!     "person" => {
//!         "name" => "John Cena",
//!         "address" => {
//!             "permanent" => "Nepal",
//!             "temporary" => "China"
//!         }
//!     },
//!     "tags" => ["a", "b"]
//! });
//!
//! let session = Session::try_from(&value!({
//!     "person" => { "address" => { "permanent" => "#" } }
//! }))
//! .unwrap();
//!
//! let updated = session.bind(&original).set("Holy land").apply().unwrap();
//!
//! assert_eq!(updated["person"]["address"]["permanent"], "Holy land");
//! assert_eq!(updated["person"]["address"]["temporary"], "China");
//!
//! // the original is untouched
//! assert_eq!(original["person"]["address"]["permanent"], "Nepal");
//!
//! // containers along the path are new, everything else is shared
//! assert!(!updated["person"]["address"].ptr_eq(&original["person"]["address"]));
//! assert!(updated["tags"].ptr_eq(&original["tags"]));
//! ```
//!
//! ## Multiple Targets
//!
//! Named pointers let a single session update several leaves:
//!
//! ```rust
//! use graftree::{Session, value};
//!
//! let original = value!({ "a" => { "count" => 1 }, "b" => { "items" => [1, 2] } });
//! let session = Session::try_from(&value!({
//!     "a" => { "count" => "#/count" },
//!     "b" => { "items" => "#/items" }
//! }))
//! .unwrap();
//!
//! let updated = session
//!     .bind(&original)
//!     .of("#/count")
//!     .pipe(|v| (v.as_i64().unwrap_or(0) + 1).into())
//!     .of("#/items")
//!     .append(3)
//!     .apply()
//!     .unwrap();
//!
//! assert_eq!(updated, value!({ "a" => { "count" => 2 }, "b" => { "items" => [1, 2, 3] } }));
//! ```
//!
//! ## Missing Paths
//!
//! If a selected key is absent from the value (or holds `null`), the whole branch at that
//! selector level is left as it was in the original, *including* sibling keys that were already
//! rewritten earlier in the same branch. Updates never produce a partially applied branch.
//!
//! ## Observation and Validation
//!
//! [`UpdateBuilder::apply_with`] takes a [`Sentinel`](crate::sentinel::Sentinel) that observes
//! the traversal and every leaf update, and may reject an update to abort the whole apply. See
//! the [`sentinel`] module.
//!
//! ## Features
//!
//! - `json`: Enables conversions between [`Value`] and `serde_json::Value`. This feature is
//!   enabled by default.
//! - `serde`: Provides `serde` support for [`Value`], [`Key`] and [`OperationKind`].
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for [`Value`], useful for property-based
//!   testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use ahash::RandomState;
use std::{
    hash::BuildHasher,
    sync::atomic::{AtomicBool, Ordering},
};

// Use a constant seed for hashing so that ledgers filled the same way iterate in the same order.
// This keeps benchmark runs comparable and lets tests rely on `Ledger::iter` order.
pub(crate) const DETERMINISTIC_HASHER: RandomState = RandomState::with_seeds(48, 1516, 23, 42);

pub mod cloner;
pub use cloner::{ApplyError, select_transform};
pub mod ledger;
pub use ledger::Ledger;
pub mod registry;
pub use registry::{Operation, OperationKind, Transform};
pub mod selector;
pub use selector::{Branch, Pointer, Selector, SelectorError, SelectorNode};
pub mod sentinel;
pub mod session;
pub use session::{Session, UpdateBuilder, create_session};
pub mod value;
pub use value::{Array, Key, Object, Value};
#[cfg(feature = "json")]
mod json;
/// Macros for building values and selectors inline.
pub mod macros;
#[cfg(feature = "serde")]
mod serde;
#[cfg(any(test, feature = "arbitrary"))]
mod test_util;

static ENABLE_DETERMINISM: AtomicBool = AtomicBool::new(false);

/// Makes all hash maps in this crate use a fixed seed.
///
/// This should only be enabled for testing, as it increases the odds of DoS
/// scenarios.
#[doc(hidden)]
pub fn enable_determinism() {
    ENABLE_DETERMINISM.store(true, Ordering::Release);
}

/// Checks if determinism is enabled.
///
/// Should be used internally and for testing.
#[doc(hidden)]
pub fn determinism_enabled() -> bool {
    ENABLE_DETERMINISM.load(Ordering::Acquire)
}

/// Create a random state for a hashmap.
/// If `enable_determinism` has been used, this will return a deterministic
/// decidedly non-random RandomState, useful in tests.
#[inline]
fn make_random_state() -> RandomState {
    if determinism_enabled() {
        DETERMINISTIC_HASHER
    } else {
        RandomState::new()
    }
}

fn create_map<K, V>() -> std::collections::HashMap<K, V, GraftRandomState> {
    std::collections::HashMap::with_hasher(GraftRandomState::default())
}

fn create_map_with_capacity<K, V>(
    capacity: usize,
) -> std::collections::HashMap<K, V, GraftRandomState> {
    std::collections::HashMap::with_capacity_and_hasher(capacity, GraftRandomState::default())
}

/// This is a small wrapper around the standard RandomState.
/// This allows us to easily switch to a non-random RandomState for use in tests.
#[derive(Clone)]
pub struct GraftRandomState {
    inner: RandomState,
}

// Falls back on the regular ahash::RandomState except when 'enable_determinism'
// has been called, in which case a static only-for-test RandomState is used.
impl Default for GraftRandomState {
    #[inline]
    fn default() -> Self {
        Self {
            inner: make_random_state(),
        }
    }
}

// All we do here is delegate to the wrapped 'inner' RandomState.
impl BuildHasher for GraftRandomState {
    type Hasher = <RandomState as BuildHasher>::Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        self.inner.build_hasher()
    }
}
