//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the shared user rule set so forms can show field errors inline.
//! - Own the user form state, including the single-flight submit flag.
//! - Expose the client-local task list backed by a directory store.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as envelope values, never as Dart exceptions.
//! - Task mutations are serialized within one process.

use log::{error, info};
use roster_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_tasks,
    ping as ping_inner, save_tasks, validate_user, FieldErrors, FileLocalStorage, FormError,
    MobileInput, TaskDraft, TaskFilter, TaskList, TaskRecord, UserDraft, UserForm, UserId,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const TASKS_DIR_NAME: &str = "roster_tasks";
static TASKS_DIR: OnceLock<PathBuf> = OnceLock::new();
static TASKS_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    /// Wire name of the field (`user|interest|age|mobile|email`).
    pub field: String,
    pub message: String,
}

/// Result of validating the user form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFormValidation {
    /// `true` when every rule passed and the form may be submitted.
    pub ok: bool,
    /// Failed rules in field order; empty when `ok`.
    pub errors: Vec<FieldMessage>,
}

/// Runs the shared user rule set against raw form values.
///
/// `age = None` means the field was left empty. `mobile` is checked in its
/// textual form.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn user_form_validate(
    user: String,
    interests: Vec<String>,
    age: Option<i64>,
    mobile: String,
    email: String,
) -> UserFormValidation {
    let draft = UserDraft {
        user: Some(user),
        interest: Some(interests),
        age,
        mobile: Some(MobileInput::Text(mobile)),
        email: Some(email),
    };

    match validate_user(&draft) {
        Ok(_) => UserFormValidation {
            ok: true,
            errors: Vec::new(),
        },
        Err(errors) => UserFormValidation {
            ok: false,
            errors: field_messages(&errors),
        },
    }
}

/// Request the UI should send after a successful `begin_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPlan {
    /// Whether a submission was started.
    pub ok: bool,
    /// `POST` or `PUT`; empty when `ok = false`.
    pub method: String,
    /// `/users` or `/users/{id}`; empty when `ok = false`.
    pub path: String,
    /// JSON request body; empty when `ok = false`.
    pub body_json: String,
    /// Failed rules when the form is invalid.
    pub errors: Vec<FieldMessage>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl SubmitPlan {
    fn refused(message: impl Into<String>, errors: Vec<FieldMessage>) -> Self {
        Self {
            ok: false,
            method: String::new(),
            path: String::new(),
            body_json: String::new(),
            errors,
            message: message.into(),
        }
    }
}

/// Create/edit user form held on the Rust side.
///
/// # FFI contract
/// - Opaque handle; Dart never sees the fields.
/// - At most one submission is in flight per session.
#[flutter_rust_bridge::frb(opaque)]
pub struct UserFormSession {
    form: UserForm,
}

impl UserFormSession {
    /// Empty create form.
    #[flutter_rust_bridge::frb(sync)]
    pub fn new() -> Self {
        Self {
            form: UserForm::new(),
        }
    }

    /// Edit form for `id`; `None` when `id` is not a valid user id.
    #[flutter_rust_bridge::frb(sync)]
    pub fn edit(
        id: String,
        user: String,
        interests: Vec<String>,
        age: Option<i64>,
        mobile: String,
        email: String,
    ) -> Option<Self> {
        let id = UserId::parse_str(id.trim()).ok()?;
        let draft = UserDraft {
            user: Some(user),
            interest: Some(interests),
            age,
            mobile: Some(MobileInput::Text(mobile)),
            email: Some(email),
        };
        Some(Self {
            form: UserForm::edit_draft(id, draft),
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn is_edit(&self) -> bool {
        self.form.is_edit()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_user(&mut self, value: String) {
        self.form.set_user(value);
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_age(&mut self, value: Option<i64>) {
        self.form.set_age(value);
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_mobile(&mut self, value: String) {
        self.form.set_mobile(value);
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_email(&mut self, value: String) {
        self.form.set_email(value);
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_interest_input(&mut self, value: String) {
        self.form.set_interest_input(value);
    }

    /// Moves the pending interest input into the list; blank input is ignored.
    #[flutter_rust_bridge::frb(sync)]
    pub fn add_interest(&mut self) -> bool {
        self.form.add_interest()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn remove_interest(&mut self, index: u32) -> bool {
        usize::try_from(index).is_ok_and(|index| self.form.remove_interest(index))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn interests(&self) -> Vec<String> {
        self.form.interests().to_vec()
    }

    /// Runs the shared rule set and keeps its errors on the session.
    #[flutter_rust_bridge::frb(sync)]
    pub fn validate(&mut self) -> UserFormValidation {
        let ok = self.form.validate();
        UserFormValidation {
            ok,
            errors: field_messages(self.form.errors()),
        }
    }

    /// Validates and, when clean, marks the session as submitting.
    ///
    /// # FFI contract
    /// - Never panics.
    /// - Refuses while a previous submission has not been finished.
    #[flutter_rust_bridge::frb(sync)]
    pub fn begin_submit(&mut self) -> SubmitPlan {
        let request = match self.form.begin_submit() {
            Ok(request) => request,
            Err(FormError::Invalid(errors)) => {
                return SubmitPlan::refused("Form has invalid fields.", field_messages(&errors));
            }
            Err(err @ FormError::AlreadySubmitting) => {
                return SubmitPlan::refused(err.to_string(), Vec::new());
            }
        };

        match serde_json::to_string(&request.body) {
            Ok(body_json) => SubmitPlan {
                ok: true,
                method: request.method.as_str().to_string(),
                path: request.path,
                body_json,
                errors: Vec::new(),
                message: "Submitting.".to_string(),
            },
            Err(err) => {
                error!("event=form_submit module=ffi status=error error={err}");
                self.form.finish_submit(Err(String::new()));
                SubmitPlan::refused(format!("begin_submit failed: {err}"), Vec::new())
            }
        }
    }

    /// Records the server outcome: `None` on success, else its `error` text.
    #[flutter_rust_bridge::frb(sync)]
    pub fn finish_submit(&mut self, error: Option<String>) {
        self.form.finish_submit(error.map_or(Ok(()), Err));
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn is_submitting(&self) -> bool {
        self.form.is_submitting()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn submit_error(&self) -> Option<String> {
        self.form.submit_error().map(str::to_string)
    }
}

impl Default for UserFormSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Task row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
}

/// Task list envelope with per-status counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Tasks matching the requested filter, newest first.
    pub items: Vec<TaskItem>,
    /// Effective filter (`all|active|completed`).
    pub applied_filter: String,
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected task ID.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: String) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Lists stored tasks.
///
/// `filter` accepts `all|active|completed`; `None` or blank means `all`.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
/// - Unknown filters return an empty list and an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(filter: Option<String>) -> TaskListResponse {
    let parsed = match filter.as_deref().map(str::trim) {
        None | Some("") => Ok(TaskFilter::All),
        Some(raw) => raw.parse::<TaskFilter>(),
    };
    let filter = match parsed {
        Ok(filter) => filter,
        Err(err) => return empty_task_list(TaskFilter::All, format!("task_list failed: {err}")),
    };

    match read_task_list() {
        Ok(list) => {
            let items = list
                .filtered(filter)
                .into_iter()
                .map(to_task_item)
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            TaskListResponse {
                items,
                applied_filter: filter.as_str().to_string(),
                total: count_u32(list.count(TaskFilter::All)),
                active: count_u32(list.count(TaskFilter::Active)),
                completed: count_u32(list.count(TaskFilter::Completed)),
                message,
            }
        }
        Err(err) => empty_task_list(filter, format!("task_list failed: {err}")),
    }
}

/// Adds a task at the top of the list.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
/// - Any title is accepted, including an empty one.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, description: Option<String>) -> TaskActionResponse {
    let result = with_task_list(|list| {
        let task = list.add(TaskDraft::new(title, description), chrono::Utc::now());
        Ok(task.id.clone())
    });
    match result {
        Ok(id) => TaskActionResponse::success("Task added.", id),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Replaces title and description of an active task.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
/// - Completed or missing tasks return `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: String, title: String, description: Option<String>) -> TaskActionResponse {
    let result = with_task_list(|list| {
        list.update(&id, TaskDraft::new(title, description))
            .map(|task| task.id.clone())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => TaskActionResponse::success("Task updated.", id),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Removes a task.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    let result = with_task_list(|list| {
        list.delete(&id)
            .map(|task| task.id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(id) => TaskActionResponse::success("Task deleted.", id),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Flips the completion flag of a task.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
/// - Message reports the new state (`completed|active`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    let result = with_task_list(|list| list.toggle(&id).map_err(|err| err.to_string()));
    match result {
        Ok(true) => TaskActionResponse::success("Task completed.", id),
        Ok(false) => TaskActionResponse::success("Task reopened.", id),
        Err(err) => TaskActionResponse::failure(format!("task_toggle failed: {err}")),
    }
}

fn resolve_tasks_dir() -> PathBuf {
    TASKS_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("ROSTER_TASKS_DIR") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASKS_DIR_NAME)
        })
        .clone()
}

fn read_task_list() -> Result<TaskList, String> {
    let _guard = TASKS_LOCK
        .lock()
        .map_err(|_| "task store lock poisoned".to_string())?;
    let storage = FileLocalStorage::open(resolve_tasks_dir())
        .map_err(|err| format!("task store open failed: {err}"))?;
    load_tasks(&storage).map_err(|err| err.to_string())
}

/// Loads the list, applies `f` and writes the whole list back on success.
fn with_task_list<T>(f: impl FnOnce(&mut TaskList) -> Result<T, String>) -> Result<T, String> {
    let _guard = TASKS_LOCK
        .lock()
        .map_err(|_| "task store lock poisoned".to_string())?;
    let mut storage = FileLocalStorage::open(resolve_tasks_dir())
        .map_err(|err| format!("task store open failed: {err}"))?;
    let mut list = load_tasks(&storage).map_err(|err| err.to_string())?;

    let value = f(&mut list)?;
    if let Err(err) = save_tasks(&mut storage, &list) {
        error!("event=tasks_save module=ffi status=error error={err}");
        return Err(err.to_string());
    }
    info!("event=tasks_mutate module=ffi status=ok count={}", list.len());
    Ok(value)
}

fn field_messages(errors: &FieldErrors) -> Vec<FieldMessage> {
    errors
        .iter()
        .map(|(field, message)| FieldMessage {
            field: field.as_str().to_string(),
            message: message.to_string(),
        })
        .collect()
}

fn empty_task_list(filter: TaskFilter, message: String) -> TaskListResponse {
    TaskListResponse {
        items: Vec::new(),
        applied_filter: filter.as_str().to_string(),
        total: 0,
        active: 0,
        completed: 0,
        message,
    }
}

fn to_task_item(task: &TaskRecord) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        created_at_ms: task.created_at.timestamp_millis(),
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
