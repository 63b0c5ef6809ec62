//! Tern Eval - the explicit-stack execution core.
//!
//! Evaluates a preprocessed, path-resolved [`tern_ir::Ast`] without
//! recursing on the host stack, so arbitrarily deep expressions cannot
//! overflow it and evaluation can be metered step by step.
//!
//! # Architecture
//!
//! - [`Machine`]: the continuation evaluator, its stacks and its drivers
//! - [`MachineBuilder`] / [`MachineConfig`]: construction and limits
//! - [`Universe`]: predeclared names at depth 0
//! - [`ops`]: operators and conversions on typed values
//!
//! Heap writes go through the machine so that, with a [`tern_realm::Realm`]
//! attached, every ownership change is recorded for the commit step.

mod config;
mod errors;
mod machine;
pub mod ops;
mod universe;

use std::sync::Once;

pub use config::{MachineBuilder, MachineConfig};
pub use errors::{EvalError, EvalResult};
pub use machine::{Machine, Op, Step};
pub use universe::Universe;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=tern_eval=trace` to see every step.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
