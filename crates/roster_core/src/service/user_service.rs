//! User directory use-case service.
//!
//! # Responsibility
//! - Gate every write with the shared rule set and the email uniqueness check.
//! - Map repository outcomes onto the caller-facing error taxonomy.
//!
//! # Invariants
//! - Validation and uniqueness failures are detected before any mutation.
//! - Update never changes a record's identifier.
//! - Service layer remains storage-agnostic.

use crate::model::user::{User, UserDraft, UserId};
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::validation::{validate_user, FieldErrors};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, UserServiceError>;

/// Outcome taxonomy for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    /// One or more field rules failed.
    Validation(FieldErrors),
    /// Another record already holds the email.
    DuplicateEmail,
    NotFound(UserId),
    /// Unexpected storage fault.
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::DuplicateEmail => write!(f, "email already registered"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            Self::DuplicateEmail | Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail => Self::DuplicateEmail,
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<crate::db::DbError> for UserServiceError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Use-case service for user directory operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, checks email uniqueness, then persists a new user.
    ///
    /// # Errors
    /// - `Validation` when any field rule fails; nothing is written.
    /// - `DuplicateEmail` when any record holds the email in any letter case.
    pub fn create_user(&self, draft: &UserDraft) -> ServiceResult<User> {
        let valid = validate_user(draft).map_err(|errors| {
            info!(
                "event=user_create module=service status=rejected reason=validation fields={}",
                errors.len()
            );
            UserServiceError::Validation(errors)
        })?;

        if let Some(existing) = self.repo.find_id_by_email(valid.email(), None)? {
            info!(
                "event=user_create module=service status=rejected reason=duplicate_email existing_id={existing}"
            );
            return Err(UserServiceError::DuplicateEmail);
        }

        let user = self.repo.create_user(&valid).inspect_err(|err| {
            warn!("event=user_create module=service status=error error={err}");
        })?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Validates, checks email uniqueness excluding `id`, then replaces the
    /// user's attributes.
    ///
    /// Keeping one's own email is never a conflict.
    pub fn update_user(&self, id: UserId, draft: &UserDraft) -> ServiceResult<User> {
        let valid = validate_user(draft).map_err(|errors| {
            info!(
                "event=user_update module=service status=rejected reason=validation user_id={id} fields={}",
                errors.len()
            );
            UserServiceError::Validation(errors)
        })?;

        if let Some(existing) = self.repo.find_id_by_email(valid.email(), Some(id))? {
            info!(
                "event=user_update module=service status=rejected reason=duplicate_email user_id={id} existing_id={existing}"
            );
            return Err(UserServiceError::DuplicateEmail);
        }

        let user = self.repo.update_user(id, &valid)?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.repo
            .get_user(id)?
            .ok_or(UserServiceError::NotFound(id))
    }

    pub fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list_users()?)
    }

    pub fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }
}
