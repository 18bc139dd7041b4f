//! Domain logic for the Africa demographics contribution pipeline.
//!
//! Everything here is free of HTTP and SQL concerns: submission validation,
//! contribution status rules, merge planning and dispatch, and the moderation
//! orchestrator. Storage is reached through the traits in [`store`], which the
//! `atlas-db` crate implements for PostgreSQL and [`memory`] implements
//! in-process.

pub mod contribution;
pub mod entity;
pub mod error;
pub mod intake;
pub mod memory;
pub mod merge;
pub mod moderation;
pub mod store;
pub mod types;
pub mod validation;
