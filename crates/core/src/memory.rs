//! In-process store used when `DATA_SOURCE=memory` and in tests.
//!
//! Implements both storage ports over plain collections. Entity writes are
//! checked against the constraints the migrations declare: known columns,
//! not-null columns and the `uq_*` unique keys, on inserts and updates alike.
//! Failures carry messages shaped like the database's own. Like the schema,
//! cross-table ids are not checked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::contribution::{Contribution, ContributionStatus, NewContribution};
use crate::entity::{EntityKind, AFRICAN_REGIONS};
use crate::merge::{key_text, MergeOperation};
use crate::store::{ContributionStore, EntityWriter, StoreError};
use crate::types::{ContributionId, EntityRow};

#[derive(Default)]
pub struct MemoryStore {
    /// Insertion order doubles as creation order.
    contributions: RwLock<Vec<Contribution>>,
    tables: RwLock<HashMap<EntityKind, Vec<EntityRow>>>,
    /// Injected failures, keyed by table.
    failures: RwLock<HashMap<EntityKind, String>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the same reference rows the migrations seed.
    pub fn with_african_regions() -> Self {
        let regions = AFRICAN_REGIONS
            .iter()
            .map(|(code, name_fr, name_en)| {
                let mut row = EntityRow::new();
                row.insert("id".into(), Value::from(*code));
                row.insert("code".into(), Value::from(*code));
                row.insert("name_fr".into(), Value::from(*name_fr));
                row.insert("name_en".into(), Value::from(*name_en));
                row
            })
            .collect();

        Self {
            tables: RwLock::new(HashMap::from([(EntityKind::Region, regions)])),
            ..Self::default()
        }
    }

    /// Insert an entity row directly, bypassing constraint checks.
    pub async fn seed(&self, entity: EntityKind, mut row: EntityRow) {
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        self.tables.write().await.entry(entity).or_default().push(row);
    }

    /// First row of `entity` whose `column` renders to `value`.
    pub async fn find_entity(
        &self,
        entity: EntityKind,
        column: &str,
        value: &str,
    ) -> Option<EntityRow> {
        self.tables
            .read()
            .await
            .get(&entity)?
            .iter()
            .find(|row| row.get(column).and_then(key_text).as_deref() == Some(value))
            .cloned()
    }

    /// Make every subsequent write to `entity` fail with `message`.
    pub async fn fail_writes_to(&self, entity: EntityKind, message: impl Into<String>) {
        self.failures.write().await.insert(entity, message.into());
    }

    pub async fn clear_write_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Number of entity writes that succeeded so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContributionStore for MemoryStore {
    async fn insert_pending(&self, input: &NewContribution) -> Result<Contribution, StoreError> {
        let now = Utc::now();
        let contribution = Contribution {
            id: Uuid::new_v4(),
            contribution_type: input.contribution_type,
            proposed_payload: input.proposed_payload.clone(),
            contributor_email: input.contributor_email.clone(),
            contributor_name: input.contributor_name.clone(),
            notes: input.notes.clone(),
            status: ContributionStatus::Pending,
            moderator_notes: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.contributions.write().await.push(contribution.clone());
        Ok(contribution)
    }

    async fn list_by_status(
        &self,
        status: ContributionStatus,
    ) -> Result<Vec<Contribution>, StoreError> {
        Ok(self
            .contributions
            .read()
            .await
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, StoreError> {
        Ok(self
            .contributions
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn set_status(
        &self,
        id: ContributionId,
        status: ContributionStatus,
        moderator_notes: Option<&str>,
    ) -> Result<Contribution, StoreError> {
        let mut contributions = self.contributions.write().await;
        let contribution = contributions
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::RowNotFound)?;

        let now = Utc::now();
        contribution.status = status;
        contribution.reviewed_at = (status != ContributionStatus::Pending).then_some(now);
        if let Some(notes) = moderator_notes {
            contribution.moderator_notes = Some(notes.to_string());
        }
        contribution.updated_at = now;
        Ok(contribution.clone())
    }
}

#[async_trait]
impl EntityWriter for MemoryStore {
    async fn apply(&self, operation: &MergeOperation) -> Result<u64, StoreError> {
        let entity = operation.entity();
        let table = entity.table();

        if let Some(message) = self.failures.read().await.get(&entity) {
            return Err(StoreError::Backend(message.clone()));
        }
        if let Some(column) = operation.unknown_column() {
            return Err(StoreError::Backend(format!(
                "column \"{column}\" of relation \"{table}\" does not exist"
            )));
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(entity).or_default();

        let affected = match operation {
            MergeOperation::Insert { row, .. } => {
                check_not_null(entity, row, true)?;
                if rows.iter().any(|existing| same_unique_key(entity, existing, row)) {
                    return Err(duplicate_key(entity));
                }
                let mut row = row.clone();
                row.entry("id")
                    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                rows.push(row);
                1
            }
            MergeOperation::Update { key, changes, .. } => {
                check_not_null(entity, changes, false)?;
                let key_field = entity.key_field();
                let matched: Vec<usize> = match key_text(key) {
                    None => Vec::new(),
                    Some(key) => rows
                        .iter()
                        .enumerate()
                        .filter(|(_, r)| {
                            r.get(key_field).and_then(key_text).as_deref() == Some(key.as_str())
                        })
                        .map(|(i, _)| i)
                        .collect(),
                };

                // Validate every updated row before touching any, as one
                // statement would.
                let mut updated: Vec<(usize, EntityRow)> = Vec::with_capacity(matched.len());
                for &i in &matched {
                    let mut candidate = rows[i].clone();
                    for (column, value) in changes {
                        candidate.insert(column.clone(), value.clone());
                    }
                    let clashes = rows.iter().enumerate().any(|(j, other)| {
                        !matched.contains(&j) && same_unique_key(entity, other, &candidate)
                    }) || updated
                        .iter()
                        .any(|(_, done)| same_unique_key(entity, done, &candidate));
                    if clashes {
                        return Err(duplicate_key(entity));
                    }
                    updated.push((i, candidate));
                }

                let affected = updated.len() as u64;
                for (i, row) in updated {
                    rows[i] = row;
                }
                affected
            }
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(affected)
    }
}

/// Name of the unique constraint guarding `entity`, as in the migrations.
pub fn unique_constraint_name(entity: EntityKind) -> String {
    format!("uq_{}_{}", entity.table(), entity.unique_columns().join("_"))
}

/// On insert every required column must be present and non-null; on update
/// only the columns being set are checked.
fn check_not_null(entity: EntityKind, row: &EntityRow, insert: bool) -> Result<(), StoreError> {
    for column in entity.required_columns() {
        let violates = match row.get(*column) {
            Some(value) => value.is_null(),
            None => insert,
        };
        if violates {
            return Err(StoreError::Backend(format!(
                "null value in column \"{column}\" of relation \"{}\" \
                 violates not-null constraint",
                entity.table()
            )));
        }
    }
    Ok(())
}

fn duplicate_key(entity: EntityKind) -> StoreError {
    StoreError::Backend(format!(
        "duplicate key value violates unique constraint \"{}\"",
        unique_constraint_name(entity)
    ))
}

fn same_unique_key(entity: EntityKind, a: &EntityRow, b: &EntityRow) -> bool {
    entity.unique_columns().iter().all(|column| {
        let left = a.get(*column).and_then(key_text);
        left.is_some() && left == b.get(*column).and_then(key_text)
    })
}
