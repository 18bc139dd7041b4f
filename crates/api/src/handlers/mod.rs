//! Request handlers. Each submodule maps one resource onto the core
//! services held in [`crate::state::AppState`] and converts errors via
//! [`crate::error::AppError`].

pub mod auth;
pub mod contribution;
pub mod moderation;
