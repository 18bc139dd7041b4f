//! Moderation orchestrator.
//!
//! Applies an admin's approve/reject decision to a pending contribution. On
//! approve, the status is flipped first and the payload merged second; the two
//! writes are not atomic, so a failed merge is compensated by putting the
//! contribution back to `pending` before the error is reported.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::contribution::{Contribution, ContributionStatus};
use crate::error::CoreError;
use crate::merge::{MergeDispatcher, MergeOutcome};
use crate::store::{ContributionStore, StoreError};
use crate::types::ContributionId;

/// A moderator's decision on a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
        }
    }

    /// Status the contribution moves to when this action is applied.
    pub fn target_status(self) -> ContributionStatus {
        match self {
            ModerationAction::Approve => ContributionStatus::Approved,
            ModerationAction::Reject => ContributionStatus::Rejected,
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "reject" => Ok(ModerationAction::Reject),
            other => Err(CoreError::InvalidAction(other.to_string())),
        }
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderator {
    pub username: String,
}

/// Result of a successful moderation.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationResult {
    pub contribution: Contribution,
    /// Present when the action was an approve.
    pub merge: Option<MergeOutcome>,
}

/// Coordinates status changes, merges and rollbacks.
#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn ContributionStore>,
    dispatcher: MergeDispatcher,
}

impl ModerationService {
    pub fn new(store: Arc<dyn ContributionStore>, dispatcher: MergeDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Contributions awaiting review, oldest first.
    pub async fn pending_queue(&self) -> Result<Vec<Contribution>, CoreError> {
        self.store.list_pending().await.map_err(store_error)
    }

    pub async fn list(&self, status: ContributionStatus) -> Result<Vec<Contribution>, CoreError> {
        self.store.list_by_status(status).await.map_err(store_error)
    }

    pub async fn get(&self, id: ContributionId) -> Result<Contribution, CoreError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Apply `action` to contribution `id`.
    ///
    /// Nothing is written unless the moderator is present, the action parses,
    /// the contribution exists and its current status allows the move.
    pub async fn moderate(
        &self,
        moderator: Option<&Moderator>,
        id: ContributionId,
        action: &str,
        moderator_notes: Option<&str>,
    ) -> Result<ModerationResult, CoreError> {
        let moderator = moderator.ok_or_else(|| {
            CoreError::Unauthorized("Admin authentication required".into())
        })?;
        let action: ModerationAction = action.parse()?;

        let current = self.get(id).await?;
        let target = action.target_status();
        if !current.status.can_transition_to(target) {
            return Err(CoreError::Conflict(format!(
                "Contribution {id} is {} and cannot be moved to {target}",
                current.status
            )));
        }

        let notes = moderator_notes.map(str::trim).filter(|n| !n.is_empty());
        let updated = self
            .store
            .set_status(id, target, notes)
            .await
            .map_err(|e| lookup_error(e, id))?;

        tracing::info!(
            contribution_id = %id,
            moderator = %moderator.username,
            action = %action,
            contribution_type = %updated.contribution_type,
            "Contribution status updated"
        );

        if action == ModerationAction::Reject {
            return Ok(ModerationResult {
                contribution: updated,
                merge: None,
            });
        }

        match self.dispatcher.merge(&updated).await {
            Ok(outcome) => {
                tracing::info!(
                    contribution_id = %id,
                    table = outcome.entity.table(),
                    rows_affected = outcome.rows_affected,
                    "Approved contribution merged"
                );
                Ok(ModerationResult {
                    contribution: updated,
                    merge: Some(outcome),
                })
            }
            Err(merge_err) => {
                tracing::warn!(
                    contribution_id = %id,
                    error = %merge_err,
                    "Merge failed, reverting contribution to pending"
                );
                let detail = match self
                    .store
                    .set_status(id, ContributionStatus::Pending, None)
                    .await
                {
                    Ok(_) => merge_err.to_string(),
                    Err(rollback_err) => {
                        tracing::error!(
                            contribution_id = %id,
                            error = %rollback_err,
                            "Rollback to pending failed; contribution left approved"
                        );
                        format!("{merge_err}; rollback to pending also failed: {rollback_err}")
                    }
                };
                Err(CoreError::MergeFailed {
                    contribution_id: id,
                    detail,
                })
            }
        }
    }
}

fn not_found(id: ContributionId) -> CoreError {
    CoreError::NotFound {
        entity: "Contribution",
        id: id.to_string(),
    }
}

fn lookup_error(err: StoreError, id: ContributionId) -> CoreError {
    match err {
        StoreError::RowNotFound => not_found(id),
        other => store_error(other),
    }
}

pub(crate) fn store_error(err: StoreError) -> CoreError {
    match err {
        StoreError::UnknownContributionType(tag) => CoreError::UnknownContributionType(tag),
        other => CoreError::Store(other.to_string()),
    }
}
