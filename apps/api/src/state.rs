use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::intake::coordinator::IntakeCoordinator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The intake pipeline with its collaborators (object store, scoring
    /// client) wired in at startup.
    pub intake: Arc<IntakeCoordinator>,
    pub config: Config,
}
