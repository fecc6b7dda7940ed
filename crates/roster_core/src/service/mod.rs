//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, uniqueness checks and repository calls into
//!   use-case level APIs.
//! - Keep HTTP/UI layers decoupled from storage details.

pub mod user_service;
