//! Flutter-facing bindings for Roster.
//!
//! Everything exported to Dart lives in [`api`]; this crate holds no domain
//! rules of its own.

pub mod api;
