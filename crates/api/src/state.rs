use std::sync::Arc;

use atlas_core::intake::ContributionIntake;
use atlas_core::merge::MergeDispatcher;
use atlas_core::moderation::ModerationService;
use atlas_core::store::{ContributionStore, EntityWriter};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the services hold their stores behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub intake: ContributionIntake,
    pub moderation: ModerationService,
    /// Present only when running against PostgreSQL; used by `/health`.
    pub pool: Option<atlas_db::DbPool>,
}

impl AppState {
    /// Wire the services over the chosen stores.
    pub fn new(
        config: ServerConfig,
        contributions: Arc<dyn ContributionStore>,
        entities: Arc<dyn EntityWriter>,
        pool: Option<atlas_db::DbPool>,
    ) -> Self {
        let dispatcher = MergeDispatcher::new(entities);
        Self {
            config: Arc::new(config),
            intake: ContributionIntake::new(Arc::clone(&contributions)),
            moderation: ModerationService::new(contributions, dispatcher),
            pool,
        }
    }
}
