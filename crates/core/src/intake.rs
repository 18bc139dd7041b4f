//! Public contribution intake.

use std::sync::Arc;

use crate::contribution::Contribution;
use crate::error::CoreError;
use crate::moderation::store_error;
use crate::store::ContributionStore;
use crate::validation::{validate_submission, SubmissionRequest};

/// What happened to a submission that was not rejected.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Stored as a new `pending` contribution.
    Created(Contribution),
    /// The honeypot was filled in; nothing was stored.
    Discarded,
}

/// Validates and queues public submissions.
#[derive(Clone)]
pub struct ContributionIntake {
    store: Arc<dyn ContributionStore>,
}

impl ContributionIntake {
    pub fn new(store: Arc<dyn ContributionStore>) -> Self {
        Self { store }
    }

    /// Validate `request` and store it as `pending`.
    ///
    /// Honeypot submissions are reported as [`SubmissionOutcome::Discarded`]
    /// before validation so that bots never see a validation error either.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, CoreError> {
        if request.is_honeypot_triggered() {
            tracing::info!("Honeypot field filled, discarding submission");
            return Ok(SubmissionOutcome::Discarded);
        }

        let input = validate_submission(request).map_err(CoreError::InvalidFields)?;
        let contribution = self
            .store
            .insert_pending(&input)
            .await
            .map_err(store_error)?;

        tracing::info!(
            contribution_id = %contribution.id,
            contribution_type = %contribution.contribution_type,
            "Contribution submitted"
        );

        Ok(SubmissionOutcome::Created(contribution))
    }
}
