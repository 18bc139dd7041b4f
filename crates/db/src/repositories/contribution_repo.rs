//! Repository for the `contributions` table.

use atlas_core::contribution::{ContributionStatus, NewContribution};
use atlas_core::types::ContributionId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::contribution::ContributionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, type, proposed_payload, contributor_email, contributor_name, notes, \
                       status, moderator_notes, reviewed_at, created_at, updated_at";

pub struct ContributionRepo;

impl ContributionRepo {
    /// Insert a new contribution. Status defaults to `pending` in the schema.
    pub async fn insert_pending(
        pool: &PgPool,
        input: &NewContribution,
    ) -> Result<ContributionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO contributions
                (type, proposed_payload, contributor_email, contributor_name, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContributionRow>(&query)
            .bind(input.contribution_type.as_str())
            .bind(Json(&input.proposed_payload))
            .bind(&input.contributor_email)
            .bind(&input.contributor_name)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// List contributions with the given status, oldest first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: ContributionStatus,
    ) -> Result<Vec<ContributionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contributions
             WHERE status = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ContributionRow>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: ContributionId,
    ) -> Result<Option<ContributionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contributions WHERE id = $1");
        sqlx::query_as::<_, ContributionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the status of a contribution.
    ///
    /// `reviewed_at` is stamped for `approved`/`rejected` and cleared for
    /// `pending`. `moderator_notes` keeps its current value when `None`.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: ContributionId,
        status: ContributionStatus,
        moderator_notes: Option<&str>,
    ) -> Result<Option<ContributionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contributions SET
                status = $2,
                moderator_notes = COALESCE($3, moderator_notes),
                reviewed_at = CASE WHEN $2 = 'pending' THEN NULL ELSE NOW() END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContributionRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(moderator_notes)
            .fetch_optional(pool)
            .await
    }
}
