//! Target entity tables that approved contributions are merged into.

use serde::Serialize;

/// One of the normalized demographic tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Region,
    Country,
    EthnicGroup,
    Presence,
}

/// How a contribution's payload is written to its entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Insert,
    Update,
}

/// The five African sub-regions every deployment starts with, as
/// `(code, name_fr, name_en)`. The region id equals its code.
pub const AFRICAN_REGIONS: [(&str, &str, &str); 5] = [
    ("afrique_du_nord", "Afrique du Nord", "North Africa"),
    ("afrique_de_l_ouest", "Afrique de l'Ouest", "West Africa"),
    ("afrique_centrale", "Afrique centrale", "Central Africa"),
    ("afrique_de_l_est", "Afrique de l'Est", "East Africa"),
    ("afrique_australe", "Afrique australe", "Southern Africa"),
];

const REGION_COLUMNS: &[&str] = &["id", "code", "name_fr", "name_en", "total_population"];

const COUNTRY_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "name_fr",
    "name_en",
    "iso_code_2",
    "iso_code_3",
    "region_id",
    "population_2025",
    "population_source",
    "percentage_in_region",
    "percentage_in_africa",
];

const ETHNIC_GROUP_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "name_fr",
    "name_en",
    "parent_id",
    "total_population",
    "percentage_in_africa",
];

const PRESENCE_COLUMNS: &[&str] = &[
    "id",
    "ethnic_group_id",
    "country_id",
    "population",
    "percentage_in_country",
    "percentage_in_region",
    "percentage_in_africa",
];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Region,
        EntityKind::Country,
        EntityKind::EthnicGroup,
        EntityKind::Presence,
    ];

    /// Database table name.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Region => "african_regions",
            EntityKind::Country => "countries",
            EntityKind::EthnicGroup => "ethnic_groups",
            EntityKind::Presence => "ethnic_group_presence",
        }
    }

    /// Column matched by `update_*` contributions.
    pub fn key_field(self) -> &'static str {
        match self {
            EntityKind::Region => "code",
            EntityKind::Country => "slug",
            EntityKind::EthnicGroup => "slug",
            EntityKind::Presence => "id",
        }
    }

    /// Columns a contribution payload may write.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Region => REGION_COLUMNS,
            EntityKind::Country => COUNTRY_COLUMNS,
            EntityKind::EthnicGroup => ETHNIC_GROUP_COLUMNS,
            EntityKind::Presence => PRESENCE_COLUMNS,
        }
    }

    /// Columns that may never hold null.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Region => &["code", "name_fr"],
            EntityKind::Country | EntityKind::EthnicGroup => &["slug", "name_fr"],
            EntityKind::Presence => &["ethnic_group_id", "country_id"],
        }
    }

    /// Columns that together must be unique across the table.
    ///
    /// Mirrors the `uq_*` constraints in the migrations. A presence row is
    /// unique per (ethnic group, country) pair.
    pub fn unique_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Region => &["code"],
            EntityKind::Country | EntityKind::EthnicGroup => &["slug"],
            EntityKind::Presence => &["ethnic_group_id", "country_id"],
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}
