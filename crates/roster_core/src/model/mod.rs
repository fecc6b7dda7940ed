//! Domain model for the user directory and the client-local task list.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Fix the JSON wire names shared with HTTP and UI callers.
//!
//! # Invariants
//! - Every persisted user is identified by a stable `UserId`.
//! - Every task is identified by a `TaskId` unique within its list.

pub mod task;
pub mod user;
