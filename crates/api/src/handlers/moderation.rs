//! Admin moderation queue: list, inspect, approve and reject contributions.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atlas_core::contribution::{Contribution, ContributionStatus};
use atlas_core::error::CoreError;
use atlas_core::merge::MergeOutcome;
use atlas_core::types::ContributionId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/contributions`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Defaults to `pending`.
    pub status: Option<String>,
}

/// Request body for `POST /admin/contributions/{id}/moderate`.
#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    /// `approve` or `reject`. Anything else, including a missing value, is
    /// reported as an invalid action.
    #[serde(default)]
    pub action: String,
    pub moderator_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModerateResponse {
    pub success: bool,
    pub data: Contribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeOutcome>,
}

/// Read the `{id}` segment. An id that is not a UUID cannot name any stored
/// contribution, so it is reported as not found.
fn contribution_id(path: Result<Path<String>, PathRejection>) -> AppResult<ContributionId> {
    let Path(raw) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    raw.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Contribution",
            id: raw.clone(),
        })
    })
}

/// GET /api/v1/admin/contributions?status=pending
pub async fn list_contributions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Contribution>>>> {
    let status = match params.status.as_deref() {
        None | Some("") => ContributionStatus::Pending,
        Some(raw) => raw.parse()?,
    };
    let contributions = state.moderation.list(status).await?;
    Ok(Json(DataResponse {
        data: contributions,
    }))
}

/// GET /api/v1/admin/contributions/{id}
pub async fn get_contribution(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<DataResponse<Contribution>>> {
    let id = contribution_id(path)?;
    let contribution = state.moderation.get(id).await?;
    Ok(Json(DataResponse { data: contribution }))
}

/// POST /api/v1/admin/contributions/{id}/moderate
///
/// Approving merges the payload into its entity table. If that write fails
/// the contribution is put back to `pending` and the response is a
/// `MERGE_FAILED` error carrying the database's message.
pub async fn moderate_contribution(
    admin: RequireAdmin,
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ModerateRequest>, JsonRejection>,
) -> AppResult<Json<ModerateResponse>> {
    let id = contribution_id(path)?;
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let moderator = admin.moderator();
    let result = state
        .moderation
        .moderate(
            Some(&moderator),
            id,
            &input.action,
            input.moderator_notes.as_deref(),
        )
        .await?;

    Ok(Json(ModerateResponse {
        success: true,
        data: result.contribution,
        merge: result.merge,
    }))
}
