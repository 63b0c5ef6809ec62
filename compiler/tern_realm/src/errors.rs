//! Errors raised by ownership bookkeeping.
//!
//! All of these are internal invariant violations: they point at a bug in the
//! code driving the tracker, never at a mistake in the program being run.

use crate::ObjectId;

/// Ownership/persistence invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RealmError {
    /// A reference was released more times than it was taken.
    #[error("reference count of object {id} would drop below zero")]
    NegativeRefCount { id: ObjectId },

    /// Encoded object id has the wrong width.
    #[error("encoded object id must be {expected} bytes, got {got}")]
    InvalidIdLength { expected: usize, got: usize },

    /// Identity assignment was requested for an object that already has one.
    #[error("object {id} already has a persistent identity")]
    AlreadyReal { id: ObjectId },
}
