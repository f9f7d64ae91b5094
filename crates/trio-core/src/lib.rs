//! trio-core
//!
//! Business logic and services for the three-bucket budget.
//! Depends on trio-domain. No CLI, no terminal I/O; durable storage is reached
//! only through the [`storage::DocumentStore`] trait.

pub mod allocation_service;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod goal_service;
pub mod month_service;
pub mod session;
pub mod state;
pub mod storage;
pub mod validation;

pub use allocation_service::*;
pub use clock::*;
pub use coordinator::*;
pub use error::CoreError;
pub use goal_service::*;
pub use month_service::*;
pub use session::*;
pub use state::*;
pub use storage::{DocumentKey, DocumentStore, MemoryStore, PersistenceGateway};
