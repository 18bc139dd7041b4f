pub mod admin;
pub mod auth;
pub mod contribution;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
///
/// /contributions                               submit (public)
///
/// /admin/contributions                         list by status (admin only)
/// /admin/contributions/{id}                    get
/// /admin/contributions/{id}/moderate           approve or reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/contributions", contribution::router())
        .nest("/admin/contributions", admin::router())
}
