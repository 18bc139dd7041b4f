//! Writes and lookups for the demographic entity tables.
//!
//! Merge writes are built from [`MergeOperation`]s. Values never reach the
//! SQL text: the row is bound as one JSONB parameter and expanded with
//! `jsonb_populate_record`, which casts every field to its column type.
//! Column names are interpolated, so only names from the entity's column
//! allowlist are accepted.

use atlas_core::entity::EntityKind;
use atlas_core::merge::{key_text, MergeOperation};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::entity::{Country, EthnicGroup, Presence, Region};

const REGION_COLUMNS: &str = "id, code, name_fr, name_en, total_population, created_at, updated_at";

const COUNTRY_COLUMNS: &str = "id, slug, name_fr, name_en, iso_code_2, iso_code_3, region_id, \
                               population_2025, population_source, percentage_in_region, \
                               percentage_in_africa, created_at, updated_at";

const ETHNIC_GROUP_COLUMNS: &str = "id, slug, name_fr, name_en, parent_id, total_population, \
                                    percentage_in_africa, created_at, updated_at";

const PRESENCE_COLUMNS: &str = "id, ethnic_group_id, country_id, population, \
                                percentage_in_country, percentage_in_region, \
                                percentage_in_africa, created_at, updated_at";

pub struct EntityRepo;

impl EntityRepo {
    /// Execute a merge operation as a single statement and return the
    /// number of rows affected.
    ///
    /// An update whose key is missing or not a scalar binds `NULL` and
    /// therefore matches no row.
    pub async fn apply(pool: &PgPool, operation: &MergeOperation) -> Result<u64, sqlx::Error> {
        if let Some(column) = operation.unknown_column() {
            return Err(sqlx::Error::ColumnNotFound(column.to_string()));
        }

        let entity = operation.entity();
        let columns: Vec<&str> = operation.columns().collect();

        let result = match operation {
            MergeOperation::Insert { row, .. } => {
                sqlx::query(&insert_sql(entity, &columns))
                    .bind(Json(row))
                    .execute(pool)
                    .await?
            }
            MergeOperation::Update { key, changes, .. } => {
                sqlx::query(&update_sql(entity, &columns))
                    .bind(Json(changes))
                    .bind(key_text(key))
                    .execute(pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    pub async fn find_region_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {REGION_COLUMNS} FROM african_regions WHERE code = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all regions ordered by code.
    pub async fn list_regions(pool: &PgPool) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!("SELECT {REGION_COLUMNS} FROM african_regions ORDER BY code");
        sqlx::query_as::<_, Region>(&query).fetch_all(pool).await
    }

    pub async fn find_country_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Country>, sqlx::Error> {
        let query = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE slug = $1");
        sqlx::query_as::<_, Country>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_ethnic_group_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<EthnicGroup>, sqlx::Error> {
        let query = format!("SELECT {ETHNIC_GROUP_COLUMNS} FROM ethnic_groups WHERE slug = $1");
        sqlx::query_as::<_, EthnicGroup>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find the presence row linking an ethnic group to a country.
    pub async fn find_presence(
        pool: &PgPool,
        ethnic_group_id: &str,
        country_id: &str,
    ) -> Result<Option<Presence>, sqlx::Error> {
        let query = format!(
            "SELECT {PRESENCE_COLUMNS} FROM ethnic_group_presence
             WHERE ethnic_group_id = $1 AND country_id = $2"
        );
        sqlx::query_as::<_, Presence>(&query)
            .bind(ethnic_group_id)
            .bind(country_id)
            .fetch_optional(pool)
            .await
    }
}

fn quote(column: &str) -> String {
    format!("\"{column}\"")
}

/// `INSERT ... SELECT` over the populated record. Columns absent from the
/// row are left out so their schema defaults apply.
fn insert_sql(entity: EntityKind, columns: &[&str]) -> String {
    let table = entity.table();
    if columns.is_empty() {
        return format!("INSERT INTO {table} DEFAULT VALUES");
    }
    let targets: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    let sources: Vec<String> = columns.iter().map(|c| format!("r.{}", quote(c))).collect();
    format!(
        "INSERT INTO {table} ({}) SELECT {} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) AS r",
        targets.join(", "),
        sources.join(", ")
    )
}

/// `UPDATE ... FROM` the populated record, matching the key column as text
/// so numeric and string keys compare alike.
fn update_sql(entity: EntityKind, columns: &[&str]) -> String {
    let table = entity.table();
    let key = quote(entity.key_field());
    let mut assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = r.{}", quote(c), quote(c)))
        .collect();
    assignments.push("\"updated_at\" = NOW()".to_string());
    format!(
        "UPDATE {table} AS t SET {} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) AS r \
         WHERE t.{key}::text = $2",
        assignments.join(", ")
    )
}
