//! Read models for the demographic entity tables.
//!
//! Writes go through [`crate::repositories::EntityRepo::apply`]; these
//! structs are only used to read rows back.

use atlas_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `african_regions`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: String,
    pub code: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub total_population: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `countries`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Country {
    pub id: String,
    pub slug: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub iso_code_2: Option<String>,
    pub iso_code_3: Option<String>,
    pub region_id: Option<String>,
    pub population_2025: Option<i64>,
    pub population_source: Option<String>,
    pub percentage_in_region: Option<f64>,
    pub percentage_in_africa: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `ethnic_groups`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EthnicGroup {
    pub id: String,
    pub slug: String,
    pub name_fr: String,
    pub name_en: Option<String>,
    pub parent_id: Option<String>,
    pub total_population: Option<i64>,
    pub percentage_in_africa: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `ethnic_group_presence`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Presence {
    pub id: String,
    pub ethnic_group_id: String,
    pub country_id: String,
    pub population: Option<i64>,
    pub percentage_in_country: Option<f64>,
    pub percentage_in_region: Option<f64>,
    pub percentage_in_africa: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
