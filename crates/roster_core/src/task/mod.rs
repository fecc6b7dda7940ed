//! Client-local task list.
//!
//! # Responsibility
//! - Own task list state transitions (`list`).
//! - Persist the list to client-local key/value storage (`storage`).
//!
//! No server-side rules apply to tasks; any title is accepted.

pub mod list;
pub mod storage;
