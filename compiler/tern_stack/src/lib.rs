//! Stack safety for the recursive tree passes.
//!
//! Evaluation itself never recurses on the host stack; the machine in
//! `tern_eval` keeps all of its state on explicit stacks. A few walks are
//! still naturally recursive: deep-copying or rendering a syntax subtree, and
//! registering the nested objects of a stored value with a realm. Those wrap
//! each recursive step in [`ensure_sufficient_stack`] so that trees nested as
//! deeply as the evaluator accepts can also be walked.
//!
//! # Platform Support
//!
//! - **Native targets**: the `stacker` crate grows the stack on demand.
//! - **WASM targets**: no-op passthrough.
//!
//! # Configuration
//!
//! - **Red zone**: 64KB. Below this, a new segment is allocated.
//! - **Growth size**: 1MB per new segment.

/// Minimum stack space to keep available before recursing.
const RED_ZONE: usize = 64 * 1024;

/// Stack space allocated per growth.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn copy_expr(&mut self, id: ExprId) -> ExprId {
///     ensure_sufficient_stack(|| {
///         // ... copy children recursively ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
