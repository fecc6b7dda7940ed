//! HTTP handlers for the user resource.
//!
//! # Responsibility
//! - Decode bodies and path ids, then hand off to `UserService`.
//! - Run blocking storage work off the async executor.
//!
//! # Invariants
//! - Each call ends in exactly one response.
//! - Malformed ids are indistinguishable from unknown ones.

use super::error::ApiError;
use super::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::{ServiceResult, SqliteUserRepository, User, UserDraft, UserId, UserService};
use serde::Serialize;
use std::sync::Arc;

pub const USER_DELETED_MESSAGE: &str = "User deleted successfully";

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /users`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = with_user_service(&state, |service| service.list_users()).await?;
    Ok(Json(users))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let draft = parse_draft(&body)?;
    let user = with_user_service(&state, move |service| service.create_user(&draft)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;
    let user = with_user_service(&state, move |service| service.get_user(id)).await?;
    Ok(Json(user))
}

/// `PUT /users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;
    let draft = parse_draft(&body)?;
    let user = with_user_service(&state, move |service| service.update_user(id, &draft)).await?;
    Ok(Json(user))
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_user_id(&id)?;
    with_user_service(&state, move |service| service.delete_user(id)).await?;
    Ok(Json(MessageBody {
        message: USER_DELETED_MESSAGE,
    }))
}

/// `GET /health`
pub async fn health_check() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: roster_core::core_version(),
    })
}

/// Any unsupported method on a user route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Any path outside the routing table.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Decodes a user body. An empty body is an empty draft, so every field
/// reports as required.
fn parse_draft(body: &[u8]) -> Result<UserDraft, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UserDraft::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::MalformedBody(err.to_string()))
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse_str(raw).map_err(|_| ApiError::UserNotFound)
}

async fn with_user_service<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&UserService<SqliteUserRepository<'_>>) -> ServiceResult<T> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    let joined = tokio::task::spawn_blocking(move || {
        db.with_conn(|conn| {
            let service = UserService::new(SqliteUserRepository::new(conn));
            f(&service)
        })
    })
    .await;

    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => Err(ApiError::Internal(format!("storage task failed: {err}"))),
    }
}
