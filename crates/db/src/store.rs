//! PostgreSQL implementations of the core storage ports.

use async_trait::async_trait;
use atlas_core::contribution::{Contribution, ContributionStatus, NewContribution};
use atlas_core::error::CoreError;
use atlas_core::merge::MergeOperation;
use atlas_core::store::{ContributionStore, EntityWriter, StoreError};
use atlas_core::types::ContributionId;

use crate::models::contribution::ContributionRow;
use crate::repositories::{ContributionRepo, EntityRepo};
use crate::DbPool;

/// Backs both [`ContributionStore`] and [`EntityWriter`] with one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ContributionStore for PgStore {
    async fn insert_pending(&self, input: &NewContribution) -> Result<Contribution, StoreError> {
        let row = ContributionRepo::insert_pending(&self.pool, input)
            .await
            .map_err(store_error)?;
        to_contribution(row)
    }

    async fn list_by_status(
        &self,
        status: ContributionStatus,
    ) -> Result<Vec<Contribution>, StoreError> {
        ContributionRepo::list_by_status(&self.pool, status)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_contribution)
            .collect()
    }

    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, StoreError> {
        ContributionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(to_contribution)
            .transpose()
    }

    async fn set_status(
        &self,
        id: ContributionId,
        status: ContributionStatus,
        moderator_notes: Option<&str>,
    ) -> Result<Contribution, StoreError> {
        let row = ContributionRepo::set_status(&self.pool, id, status, moderator_notes)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::RowNotFound)?;
        to_contribution(row)
    }
}

#[async_trait]
impl EntityWriter for PgStore {
    async fn apply(&self, operation: &MergeOperation) -> Result<u64, StoreError> {
        EntityRepo::apply(&self.pool, operation)
            .await
            .map_err(store_error)
    }
}

fn to_contribution(row: ContributionRow) -> Result<Contribution, StoreError> {
    Contribution::try_from(row).map_err(|e| match e {
        CoreError::UnknownContributionType(tag) => StoreError::UnknownContributionType(tag),
        other => StoreError::Backend(other.to_string()),
    })
}

/// Map a sqlx error onto the port's error type.
///
/// Database errors keep PostgreSQL's own message, which names the violated
/// constraint or missing column.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::RowNotFound,
        sqlx::Error::Database(db_err) => StoreError::Backend(db_err.message().to_string()),
        sqlx::Error::ColumnNotFound(column) => {
            StoreError::Backend(format!("column \"{column}\" does not exist"))
        }
        other => StoreError::Backend(other.to_string()),
    }
}
