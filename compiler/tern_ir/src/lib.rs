//! Tern IR: syntax tree, values, types and the scope chain.
//!
//! This crate holds the data the execution core works on:
//! - Names: process-wide interned identifiers
//! - Nodes: flat arenas of expressions, statements, declarations, files and
//!   packages, addressed by typed ids
//! - Types and values: run-time types, typed values, heap objects
//! - Static blocks: the compile-time scope chain resolving names to
//!   [`ValuePath`]s, and its instantiation into run-time [`Block`]s
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: children are ids into the [`Ast`] arenas, never
//!   boxed subtrees
//! - **Paths, not names**: by the time a tree is evaluated every identifier
//!   carries a `(depth, index)` path, so lookups cost a fixed number of hops
//! - **Heap values are objects**: arrays, structs, maps and blocks implement
//!   [`tern_realm::Object`] so ownership can be tracked

pub mod ast;
mod errors;
mod ids;
mod name;
mod ops;
mod path;
mod scope;
mod types;
pub mod value;

pub use ast::{
    AttrKey, AttrValue, Attributes, Ast, DeclKind, ExprKind, FileNode, KeyValue, NodeDisplay,
    PackageNode, StmtKind,
};
pub use errors::{ScopeError, ValueError};
pub use ids::{DeclId, ExprId, FileId, NodeId, PackageId, ScopeId, StmtId};
pub use name::Name;
pub use ops::{AssignOp, BinaryOp, BranchOp, ChanDir, IncDecOp, LitKind, UnaryOp};
pub use path::ValuePath;
pub use scope::StaticBlock;
pub use types::{
    ArrayType, ChanType, DeclaredType, FieldType, FuncType, InterfaceType, MapType, Method,
    PointerType, PrimitiveType, SliceType, StructType, Type,
};
pub use value::{
    ArrayRef, ArrayValue, Block, BlockRef, BoundMethod, Builtin, FuncSource, FuncValue, MapKey,
    MapRef, MapValue, PointerValue, SliceValue, SlotRef, StructRef, StructValue, TypedValue,
    Value,
};
