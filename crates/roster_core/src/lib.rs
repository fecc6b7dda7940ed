//! Core domain logic for Roster.
//! This crate is the single source of truth for business invariants: the
//! user validation rule set, email uniqueness, and task list state.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod task;
pub mod validation;

pub use form::{FormError, SubmitMethod, SubmitRequest, UserForm};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, normalize_level,
    LogTarget,
};
pub use model::task::{TaskDraft, TaskId, TaskRecord};
pub use model::user::{MobileInput, User, UserDraft, UserId};
pub use repo::user_repo::{
    RepoError, RepoResult, SqliteUserRepository, UserRepository,
};
pub use service::user_service::{ServiceResult, UserService, UserServiceError};
pub use task::list::{TaskError, TaskFilter, TaskList, TaskResult};
pub use task::storage::{
    load_tasks, save_tasks, FileLocalStorage, LocalStorage, MemoryLocalStorage, StorageError,
    TASKS_STORAGE_KEY,
};
pub use validation::{validate_user, FieldErrors, UserField, ValidUser};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
