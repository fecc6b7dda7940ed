//! Client-side user form state.
//!
//! # Responsibility
//! - Hold the draft being edited, its field errors and the interest input.
//! - Run the shared rule set for immediate feedback before submission.
//! - Guard submission with a single-flight flag.
//!
//! # Invariants
//! - Submission is refused while any field error exists.
//! - At most one submission is in flight per form.
//! - The server re-validates; nothing here is trusted by storage.

use crate::model::user::{MobileInput, User, UserDraft, UserId};
use crate::validation::{normalize_interests, validate_user, FieldErrors};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to submit form";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Invalid(FieldErrors),
    AlreadySubmitting,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "form has invalid fields: {errors}"),
            Self::AlreadySubmitting => write!(f, "form submission already in flight"),
        }
    }
}

impl Error for FormError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMethod {
    Post,
    Put,
}

impl SubmitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// Request the caller should send after a successful `begin_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub method: SubmitMethod,
    /// `/users` for create, `/users/{id}` for edit.
    pub path: String,
    pub body: UserDraft,
}

/// Create/edit form for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    draft: UserDraft,
    editing: Option<UserId>,
    errors: FieldErrors,
    submit_error: Option<String>,
    interest_input: String,
    submitting: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UserForm {
    /// Empty create form.
    pub fn new() -> Self {
        Self {
            draft: UserDraft {
                user: Some(String::new()),
                interest: Some(Vec::new()),
                age: None,
                mobile: None,
                email: Some(String::new()),
            },
            editing: None,
            errors: FieldErrors::default(),
            submit_error: None,
            interest_input: String::new(),
            submitting: false,
        }
    }

    /// Edit form prefilled from a stored user.
    pub fn edit(user: &User) -> Self {
        Self::edit_draft(user.id, user.to_draft())
    }

    /// Edit form for `id` prefilled with caller-held values.
    pub fn edit_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            draft,
            editing: Some(id),
            ..Self::new()
        }
    }

    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn set_user(&mut self, value: impl Into<String>) {
        self.draft.user = Some(value.into());
    }

    pub fn set_age(&mut self, value: Option<i64>) {
        self.draft.age = value;
    }

    pub fn set_mobile(&mut self, value: impl Into<String>) {
        self.draft.mobile = Some(MobileInput::Text(value.into()));
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.draft.email = Some(value.into());
    }

    pub fn set_interest_input(&mut self, value: impl Into<String>) {
        self.interest_input = value.into();
    }

    pub fn interest_input(&self) -> &str {
        &self.interest_input
    }

    pub fn interests(&self) -> &[String] {
        self.draft.interest.as_deref().unwrap_or_default()
    }

    /// Moves the pending interest input into the list.
    ///
    /// Blank input is ignored and returns `false`. Blank entries already in
    /// the list are dropped at the same time.
    pub fn add_interest(&mut self) -> bool {
        let value = self.interest_input.trim();
        if value.is_empty() {
            return false;
        }
        let mut interests = normalize_interests(self.interests());
        interests.push(value.to_string());
        self.draft.interest = Some(interests);
        self.interest_input.clear();
        true
    }

    /// Removes the interest at `index`; returns whether one was removed.
    pub fn remove_interest(&mut self, index: usize) -> bool {
        match self.draft.interest.as_mut() {
            Some(interests) if index < interests.len() => {
                interests.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Runs the shared rule set and records its errors on the form.
    pub fn validate(&mut self) -> bool {
        match validate_user(&self.draft) {
            Ok(_) => {
                self.errors.clear();
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error returned by the last failed submission, if any.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates and, when clean, marks the form as submitting.
    ///
    /// # Errors
    /// - `AlreadySubmitting` when a previous submission has not finished.
    /// - `Invalid` when any field rule fails; the form stays idle.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, FormError> {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if !self.validate() {
            return Err(FormError::Invalid(self.errors.clone()));
        }

        self.submitting = true;
        self.submit_error = None;
        let (method, path) = match self.editing {
            Some(id) => (SubmitMethod::Put, format!("/users/{id}")),
            None => (SubmitMethod::Post, "/users".to_string()),
        };
        Ok(SubmitRequest {
            method,
            path,
            body: self.draft.clone(),
        })
    }

    /// Records the outcome of the in-flight submission and clears the flag.
    ///
    /// `Err` carries the server's `error` message; blank messages fall back to
    /// a generic one.
    pub fn finish_submit(&mut self, outcome: Result<(), String>) {
        self.submitting = false;
        self.submit_error = match outcome {
            Ok(()) => None,
            Err(message) if message.trim().is_empty() => {
                Some(SUBMIT_FALLBACK_MESSAGE.to_string())
            }
            Err(message) => Some(message),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{FormError, SubmitMethod, UserForm};
    use crate::model::user::User;
    use crate::validation::{UserField, AGE_REQUIRED, USERNAME_TOO_SHORT};
    use uuid::Uuid;

    fn filled_form() -> UserForm {
        let mut form = UserForm::new();
        form.set_user("ab");
        form.set_interest_input("chess");
        assert!(form.add_interest());
        form.set_age(Some(30));
        form.set_mobile("1234567890");
        form.set_email("a@b.com");
        form
    }

    #[test]
    fn new_form_reports_every_missing_field() {
        let mut form = UserForm::new();
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 5);
        assert_eq!(form.errors().get(UserField::Age), Some(AGE_REQUIRED));
    }

    #[test]
    fn add_interest_trims_ignores_blank_and_clears_input() {
        let mut form = UserForm::new();
        form.set_interest_input("   ");
        assert!(!form.add_interest());

        form.set_interest_input("  go  ");
        assert!(form.add_interest());
        assert_eq!(form.interests(), ["go".to_string()]);
        assert_eq!(form.interest_input(), "");

        assert!(form.remove_interest(0));
        assert!(!form.remove_interest(0));
    }

    #[test]
    fn invalid_form_cannot_be_submitted() {
        let mut form = filled_form();
        form.set_user("a");

        let err = form.begin_submit().unwrap_err();
        match err {
            FormError::Invalid(errors) => {
                assert_eq!(errors.get(UserField::User), Some(USERNAME_TOO_SHORT));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!form.is_submitting());
    }

    #[test]
    fn submission_is_single_flight() {
        let mut form = filled_form();

        let request = form.begin_submit().unwrap();
        assert_eq!(request.method, SubmitMethod::Post);
        assert_eq!(request.path, "/users");
        assert_eq!(
            form.begin_submit().unwrap_err(),
            FormError::AlreadySubmitting
        );

        form.finish_submit(Err(String::new()));
        assert!(!form.is_submitting());
        assert_eq!(form.submit_error(), Some("Failed to submit form"));

        form.begin_submit().unwrap();
        form.finish_submit(Ok(()));
        assert_eq!(form.submit_error(), None);
    }

    #[test]
    fn edit_form_targets_the_user_resource() {
        let user = User {
            id: Uuid::new_v4(),
            user: "ab".to_string(),
            interest: vec!["x".to_string()],
            age: 30,
            mobile: "1234567890".to_string(),
            email: "a@b.com".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let mut form = UserForm::edit(&user);
        assert!(form.is_edit());
        let request = form.begin_submit().unwrap();
        assert_eq!(request.method, SubmitMethod::Put);
        assert_eq!(request.path, format!("/users/{}", user.id));
        assert_eq!(request.method.as_str(), "PUT");
    }
}
