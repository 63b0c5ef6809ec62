//! Errors raised by scope resolution and value handling.
//!
//! Both enums describe internal invariant violations: the preprocessing pass
//! hands over a well-typed, path-resolved tree, so none of these can be caused
//! by a well-typed program.

use crate::{LitKind, Name, ScopeId, ValuePath};

/// Scope-chain invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("static block {scope:?} already initialized")]
    AlreadyInitialized { scope: ScopeId },

    #[error("static block {scope:?} used before initialization")]
    Uninitialized { scope: ScopeId },

    #[error("cannot define empty name")]
    EmptyName,

    #[error("too many names in block: cannot define {name}")]
    TooManyNames { name: Name },

    #[error("block holds {names} names but counts {num_names}")]
    NameCountMismatch { names: usize, num_names: u16 },

    #[error("cannot define {name} with a value but no type")]
    ValueWithoutType { name: Name },

    #[error("cannot redefine {name} without a type")]
    RedefinitionWithoutType { name: Name },

    #[error("cannot change type of {name} from {old} to {new}")]
    TypeChanged { name: Name, old: String, new: String },

    #[error("cannot change value of {name}")]
    ValueChanged { name: Name },

    #[error("{name} already defined")]
    AlreadyDefined { name: Name },

    #[error("name {name} not declared")]
    Undeclared { name: Name },

    #[error("scope chain too deep to address {name}")]
    ChainTooDeep { name: Name },

    #[error("blank identifier has no slot")]
    BlankName,

    #[error("path {path} does not address a slot")]
    InvalidPath { path: ValuePath },

    #[error("name {name} not defined in package")]
    DeclNotFound { name: Name },
}

/// Malformed value or type access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("malformed {kind:?} literal {text}: {reason}")]
    MalformedLiteral {
        kind: LitKind,
        text: String,
        reason: &'static str,
    },

    #[error("{ty} is not a valid map key type")]
    InvalidMapKey { ty: String },

    #[error("path {path} is deeper than declared-type access allows")]
    PathDepthTooLarge { path: ValuePath },

    #[error("{ty} has no field or method {name}")]
    UnknownMember { name: Name, ty: String },
}
