use axum::routing::post;
use axum::Router;

use crate::handlers::contribution;
use crate::state::AppState;

/// Routes mounted at `/contributions`.
///
/// ```text
/// POST /    -> submit_contribution
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(contribution::submit_contribution))
}
