//! Public contribution submission.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use atlas_core::contribution::ContributionStatus;
use atlas_core::intake::SubmissionOutcome;
use atlas_core::types::ContributionId;
use atlas_core::validation::SubmissionRequest;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// What the submitter gets back.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: ContributionId,
    pub status: ContributionStatus,
}

/// POST /api/v1/contributions
///
/// Queue a proposed change for moderation. Honeypot submissions receive an
/// ordinary-looking receipt for an id that was never stored.
pub async fn submit_contribution(
    State(state): State<AppState>,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let receipt = match state.intake.submit(request).await? {
        SubmissionOutcome::Created(contribution) => SubmissionReceipt {
            id: contribution.id,
            status: contribution.status,
        },
        SubmissionOutcome::Discarded => SubmissionReceipt {
            id: Uuid::new_v4(),
            status: ContributionStatus::Pending,
        },
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}
