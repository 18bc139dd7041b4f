//! Merge dispatch: turning an approved contribution into one entity write.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::contribution::{Contribution, ContributionType};
use crate::entity::{EntityKind, WriteMode};
use crate::store::{EntityWriter, StoreError};
use crate::types::EntityRow;

/// A single write against an entity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MergeOperation {
    /// Insert `row` verbatim.
    Insert { entity: EntityKind, row: EntityRow },
    /// Set `changes` on every row whose key column equals `key`.
    ///
    /// `key` is `Null` when the payload carried no key; such an update
    /// matches nothing.
    Update {
        entity: EntityKind,
        key: Value,
        changes: EntityRow,
    },
}

impl MergeOperation {
    /// Build the write for a contribution type and payload. Pure.
    pub fn plan(contribution_type: ContributionType, payload: &EntityRow) -> Self {
        let (entity, mode) = contribution_type.target();
        match mode {
            WriteMode::Insert => MergeOperation::Insert {
                entity,
                row: payload.clone(),
            },
            WriteMode::Update => {
                let key_field = entity.key_field();
                let key = payload.get(key_field).cloned().unwrap_or(Value::Null);
                let changes = payload
                    .iter()
                    .filter(|(k, _)| k.as_str() != key_field)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                MergeOperation::Update {
                    entity,
                    key,
                    changes,
                }
            }
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            MergeOperation::Insert { entity, .. } | MergeOperation::Update { entity, .. } => {
                *entity
            }
        }
    }

    pub fn mode(&self) -> WriteMode {
        match self {
            MergeOperation::Insert { .. } => WriteMode::Insert,
            MergeOperation::Update { .. } => WriteMode::Update,
        }
    }

    /// Every column name the operation writes.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        match self {
            MergeOperation::Insert { row, .. } => row.keys(),
            MergeOperation::Update { changes, .. } => changes.keys(),
        }
        .map(String::as_str)
    }

    /// First written column that is not part of the entity's schema.
    pub fn unknown_column(&self) -> Option<&str> {
        let entity = self.entity();
        self.columns().find(|c| !entity.has_column(c))
    }
}

/// Render a key value as the text the store compares against.
///
/// Strings are used as-is, numbers in their JSON form. Anything else has no
/// textual key and matches no row.
pub fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The entity write behind a merge failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{mode:?} into {table} failed: {source}")]
pub struct MergeError {
    pub table: &'static str,
    pub mode: WriteMode,
    #[source]
    pub source: StoreError,
}

/// What a successful merge did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub entity: EntityKind,
    pub mode: WriteMode,
    pub rows_affected: u64,
}

/// Routes approved contributions to their entity table.
#[derive(Clone)]
pub struct MergeDispatcher {
    writer: Arc<dyn EntityWriter>,
}

impl MergeDispatcher {
    pub fn new(writer: Arc<dyn EntityWriter>) -> Self {
        Self { writer }
    }

    /// Apply a contribution's payload with exactly one write.
    ///
    /// The payload shape is trusted; it was checked at submission. An update
    /// that matches zero rows is still a success.
    pub async fn merge(&self, contribution: &Contribution) -> Result<MergeOutcome, MergeError> {
        let operation =
            MergeOperation::plan(contribution.contribution_type, &contribution.proposed_payload);
        let entity = operation.entity();
        let mode = operation.mode();

        let rows_affected = self
            .writer
            .apply(&operation)
            .await
            .map_err(|source| MergeError {
                table: entity.table(),
                mode,
                source,
            })?;

        if mode == WriteMode::Update && rows_affected == 0 {
            tracing::warn!(
                contribution_id = %contribution.id,
                table = entity.table(),
                key_field = entity.key_field(),
                "Update contribution matched no rows"
            );
        } else {
            tracing::debug!(
                contribution_id = %contribution.id,
                table = entity.table(),
                rows_affected,
                "Contribution merged"
            );
        }

        Ok(MergeOutcome {
            entity,
            mode,
            rows_affected,
        })
    }
}
