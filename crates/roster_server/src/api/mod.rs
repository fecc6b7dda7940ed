//! REST surface for the user directory.
//!
//! Routes are served at `/users` and mirrored under `/api/users`.

pub mod error;
pub mod handlers;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::info;
use roster_core::db::SharedDb;
use std::sync::Arc;
use std::time::Instant;

pub use error::{ApiError, ErrorBody};
pub use handlers::{
    create_user, delete_user, get_user, health_check, list_users, method_not_allowed,
    route_not_found, update_user,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SharedDb>,
}

impl AppState {
    pub fn new(db: SharedDb) -> Self {
        Self { db: Arc::new(db) }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(user_routes())
        .nest("/api", user_routes())
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users)
                .post(create_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/{id}",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(method_not_allowed),
        )
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=api status=ok method={method} path={path} http_status={} duration_ms={}",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
