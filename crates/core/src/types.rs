/// Contribution primary keys are PostgreSQL UUIDs generated by the store.
pub type ContributionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A free-form entity row as submitted by contributors (column name to value).
pub type EntityRow = serde_json::Map<String, serde_json::Value>;
