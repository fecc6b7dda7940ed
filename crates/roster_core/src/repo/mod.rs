//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes accept only rule-set-checked input (`ValidUser`).
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateEmail`)
//!   in addition to DB transport errors.

pub mod user_repo;
