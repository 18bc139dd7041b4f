use crate::types::ContributionId;
use crate::validation::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    InvalidFields(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid moderation action '{0}'. Must be one of: approve, reject")]
    InvalidAction(String),

    #[error("Unknown contribution type '{0}'")]
    UnknownContributionType(String),

    #[error("Merge failed for contribution {contribution_id}: {detail}")]
    MergeFailed {
        contribution_id: ContributionId,
        detail: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
