//! Row model for the `contributions` table.

use atlas_core::contribution::{Contribution, ContributionStatus, ContributionType};
use atlas_core::error::CoreError;
use atlas_core::types::{ContributionId, Timestamp};
use serde_json::Value;
use sqlx::FromRow;

/// A contribution row as stored. `type` and `status` are plain text
/// columns and are parsed when converting to the core type.
#[derive(Debug, Clone, FromRow)]
pub struct ContributionRow {
    pub id: ContributionId,
    #[sqlx(rename = "type")]
    pub contribution_type: String,
    pub proposed_payload: Value,
    pub contributor_email: Option<String>,
    pub contributor_name: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub moderator_notes: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ContributionRow> for Contribution {
    type Error = CoreError;

    fn try_from(row: ContributionRow) -> Result<Self, Self::Error> {
        let contribution_type: ContributionType = row.contribution_type.parse()?;
        let status: ContributionStatus = row.status.parse()?;
        let proposed_payload = match row.proposed_payload {
            Value::Object(map) => map,
            other => {
                return Err(CoreError::Internal(format!(
                    "contribution {} has a non-object payload: {other}",
                    row.id
                )))
            }
        };

        Ok(Contribution {
            id: row.id,
            contribution_type,
            proposed_payload,
            contributor_email: row.contributor_email,
            contributor_name: row.contributor_name,
            notes: row.notes,
            status,
            moderator_notes: row.moderator_notes,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
