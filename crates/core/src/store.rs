//! Storage ports used by the contribution pipeline.
//!
//! The pipeline only ever talks to these traits. `atlas-db` provides the
//! PostgreSQL implementations and [`crate::memory::MemoryStore`] provides an
//! in-process one, so the same orchestration runs against either.

use async_trait::async_trait;

use crate::contribution::{Contribution, ContributionStatus, NewContribution};
use crate::merge::MergeOperation;
use crate::types::ContributionId;

/// Failure reported by a store implementation.
///
/// `RowNotFound` is kept distinct from every other backend failure so that
/// callers can turn it into a 404.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no matching row")]
    RowNotFound,

    /// A stored row carries a `type` tag this build does not know.
    #[error("Unknown contribution type '{0}'")]
    UnknownContributionType(String),

    #[error("{0}")]
    Backend(String),
}

/// Persistence for the contribution queue.
#[async_trait]
pub trait ContributionStore: Send + Sync {
    /// Insert a new contribution with status `pending` and a store-generated id.
    async fn insert_pending(&self, input: &NewContribution) -> Result<Contribution, StoreError>;

    /// All `pending` contributions, oldest first.
    async fn list_pending(&self) -> Result<Vec<Contribution>, StoreError> {
        self.list_by_status(ContributionStatus::Pending).await
    }

    /// All contributions with the given status, oldest first.
    async fn list_by_status(
        &self,
        status: ContributionStatus,
    ) -> Result<Vec<Contribution>, StoreError>;

    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, StoreError>;

    /// Overwrite the status of a contribution and return the updated record.
    ///
    /// `reviewed_at` is stamped when the new status is not `pending` and
    /// cleared when it is. `moderator_notes` is only replaced when `Some`.
    /// Fails with [`StoreError::RowNotFound`] if `id` does not exist.
    async fn set_status(
        &self,
        id: ContributionId,
        status: ContributionStatus,
        moderator_notes: Option<&str>,
    ) -> Result<Contribution, StoreError>;
}

/// Single-statement writes against the entity tables.
#[async_trait]
pub trait EntityWriter: Send + Sync {
    /// Execute one insert or update and return the number of rows affected.
    async fn apply(&self, operation: &MergeOperation) -> Result<u64, StoreError>;
}
