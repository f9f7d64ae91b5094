#![doc(test(attr(deny(warnings))))]

//! Trio Budget tracks monthly income against a three-way allocation and keeps
//! long-term savings goals in step with the monthly ledgers.
//!
//! The heavy lifting lives in the workspace crates; this package wires them
//! together behind a small command shell.

pub mod cli;
pub mod errors;
pub mod utils;

pub use errors::{BudgetError, CliError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, preferring `RUST_LOG`, then `directive`, then
/// the built-in default. Later calls are ignored.
pub fn init_with_filter(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("Trio Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter(Some("trio_budget=debug"));
    }
}
