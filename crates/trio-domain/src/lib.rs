//! trio-domain
//!
//! Pure domain models (months, entries, allocation policy, savings goals).
//! No I/O, no CLI, no storage. Only data types and the arithmetic they own.

pub mod allocation;
pub mod common;
pub mod entry;
pub mod goal;
pub mod month;
pub mod report;

pub use allocation::*;
pub use common::*;
pub use entry::*;
pub use goal::*;
pub use month::*;
pub use report::*;
