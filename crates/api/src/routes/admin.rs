//! Route definitions for the moderation queue.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::moderation;
use crate::state::AppState;

/// Routes mounted at `/admin/contributions`. Every handler requires the
/// `admin` role.
///
/// ```text
/// GET  /                 -> list_contributions
/// GET  /{id}             -> get_contribution
/// POST /{id}/moderate    -> moderate_contribution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(moderation::list_contributions))
        .route("/{id}", get(moderation::get_contribution))
        .route("/{id}/moderate", post(moderation::moderate_contribution))
}
