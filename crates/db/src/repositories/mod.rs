//! Repository layer: one zero-sized struct per table family, each taking a
//! `&PgPool` and returning raw `sqlx` results.

pub mod contribution_repo;
pub mod entity_repo;

pub use contribution_repo::ContributionRepo;
pub use entity_repo::EntityRepo;
