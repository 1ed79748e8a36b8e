// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Observe and validate updates while they are applied.
//!
//! Sentinels are types that can be used to inspect the traversal performed by
//! [`UpdateBuilder::apply_with`](crate::UpdateBuilder::apply_with). They are useful for validating
//! that the updates conform to a policy, or simply to observe them for any other purpose (for
//! example, logging, metrics, etc).
//!
//! The main entry point for this module is the [`Sentinel`] trait, which is composed of more
//! specialized traits that can be implemented to observe different events.
//!
//! For a testing-oriented example, see [`RecordingSentinel`].
use crate::{Pointer, Value};
use std::convert::Infallible;

mod recording;
pub use recording::RecordingSentinel;

/// Observes and optionally stops an update being applied.
///
/// This is the base trait that all Sentinels should implement. The actual behaviour is split
/// into [`Visit`] (to track the position in the value) and [`LeafSentinel`] (to see what happens
/// at selector leaves).
///
/// If Error = Infallible, the Sentinel is referred to as an Observer. If it can produce an error,
/// it may be referred to as a Validator. An error from a Validator aborts the whole apply; the
/// original value is left as it was and no result is produced.
pub trait Sentinel {
    type Error;
}

/// Enables a Sentinel to keep track of the traversal.
///
/// The selector is walked depth-first and each key that is descended into is reported via this
/// interface, so that the Sentinel can update its internal pointer.
///
/// NOTE: a key is only entered if it exists in the value. If a branch is aborted because of a
/// missing key, the keys entered so far under that branch have already been exited.
#[expect(unused_variables)]
pub trait Visit<K: ?Sized>: Sentinel {
    /// Descend into a child.
    fn enter(&mut self, key: &K) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Backtrack to the parent container.
    ///
    /// NOTE: may not be called if the Sentinel produces an Err.
    fn exit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Observe what happens at selector leaves and at aborted branches.
#[expect(unused_variables)]
pub trait LeafSentinel: Sentinel {
    /// Observe and validate an operation producing `new` from `old` at the current path.
    ///
    /// Called for every leaf with a queued operation, including operations that turn out to be
    /// no-ops (in which case `new` is identical to `old`).
    fn update(&mut self, pointer: &Pointer, old: &Value, new: &Value) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Observe a leaf whose pointer has no queued operation.
    fn unmatched(&mut self, pointer: &Pointer) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Observe that the branch at the current path is reverted to the original because `key` is
    /// missing from the value.
    fn abort(&mut self, key: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A Sentinel that does nothing.
///
/// This is useful when the apply doesn't need any introspection. Using it helps the compiler
/// optimise some code away.
pub struct DummySentinel;

impl Sentinel for DummySentinel {
    type Error = Infallible;
}

impl<K: ?Sized> Visit<K> for DummySentinel {}

impl LeafSentinel for DummySentinel {}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A Sentinel that rejects every update that changes a value.
    pub struct NoChangeValidator;

    impl Sentinel for NoChangeValidator {
        type Error = String;
    }

    impl<K: ?Sized> Visit<K> for NoChangeValidator {}

    impl LeafSentinel for NoChangeValidator {
        fn update(
            &mut self,
            pointer: &Pointer,
            old: &Value,
            new: &Value,
        ) -> Result<(), Self::Error> {
            if old.ptr_eq(new) {
                Ok(())
            } else {
                Err(format!("{pointer} may not change {old}"))
            }
        }
    }

    /// A Sentinel that counts leaf events and rejects nothing.
    #[derive(Debug, Default)]
    pub struct LeafCountingObserver {
        pub updated: usize,
        pub unmatched: usize,
        pub aborted: usize,
    }

    impl Sentinel for LeafCountingObserver {
        type Error = Infallible;
    }

    impl<K: ?Sized> Visit<K> for LeafCountingObserver {}

    impl LeafSentinel for LeafCountingObserver {
        fn update(&mut self, _: &Pointer, _: &Value, _: &Value) -> Result<(), Self::Error> {
            self.updated += 1;
            Ok(())
        }

        fn unmatched(&mut self, _: &Pointer) -> Result<(), Self::Error> {
            self.unmatched += 1;
            Ok(())
        }

        fn abort(&mut self, _: &str) -> Result<(), Self::Error> {
            self.aborted += 1;
            Ok(())
        }
    }
}
