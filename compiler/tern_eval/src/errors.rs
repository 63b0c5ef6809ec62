//! Evaluation errors.
//!
//! Three classes share one enum:
//! - internal invariant violations: the tree handed to the machine was not
//!   what preprocessing promises (or the machine itself is broken)
//! - unsupported features: deliberately refused, such as floating point
//! - run-time errors of the program: division by zero, bad index, nil
//!   dereference, failed type assertion
//!
//! None of them is recovered from inside the machine.

use tern_ir::{NodeId, ScopeError, ValueError};
use tern_realm::RealmError;

/// Error raised while evaluating.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Realm(#[from] RealmError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("{feature} not supported")]
    Unsupported { feature: &'static str },

    #[error("cannot evaluate {kind} at {node}")]
    UnexpectedNode { node: NodeId, kind: &'static str },

    #[error("type mismatch: {detail}")]
    TypeMismatch { detail: String },

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("negative shift count")]
    NegativeShift,

    #[error("index {index} out of range [0:{len}]")]
    IndexOutOfRange { index: i128, len: usize },

    #[error("nil pointer dereference")]
    NilDereference,

    #[error("cannot call non-function {what}")]
    NotCallable { what: String },

    #[error("expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("interface conversion: {got} is not {want}")]
    TypeAssertion { got: String, want: String },

    #[error("step budget of {limit} exhausted")]
    StepBudgetExceeded { limit: u64 },

    #[error("call depth exceeds {limit}")]
    CallDepthExceeded { limit: usize },

    #[error("{stack} stack underflow")]
    StackUnderflow { stack: &'static str },

    #[error("internal error: {0}")]
    Internal(String),
}

impl EvalError {
    pub(crate) fn mismatch(detail: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            detail: detail.into(),
        }
    }

    /// Whether this points at a bug in an earlier pass or in the machine,
    /// rather than at the program being run.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            EvalError::Scope(_)
                | EvalError::Realm(_)
                | EvalError::Value(_)
                | EvalError::UnexpectedNode { .. }
                | EvalError::TypeMismatch { .. }
                | EvalError::ArityMismatch { .. }
                | EvalError::StackUnderflow { .. }
                | EvalError::Internal(_)
        )
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, EvalError::Unsupported { .. })
    }

    /// Resource limits configured on the machine.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            EvalError::StepBudgetExceeded { .. } | EvalError::CallDepthExceeded { .. }
        )
    }
}

pub type EvalResult<T = ()> = Result<T, EvalError>;
