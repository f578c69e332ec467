pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::intake::handlers as intake_handlers;
use crate::mappings::handlers as mapping_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job board webhook (path is registered with the board, do not move)
        .route(
            "/webhook-intake",
            post(intake_handlers::handle_webhook).get(intake_handlers::handle_webhook_info),
        )
        // Operational read surfaces
        .route(
            "/api/v1/webhook-logs",
            get(intake_handlers::handle_recent_logs),
        )
        .route(
            "/api/v1/webhook-logs/stats",
            get(intake_handlers::handle_log_stats),
        )
        .route(
            "/api/v1/webhook-logs/:delivery_id",
            get(intake_handlers::handle_logs_by_delivery),
        )
        .route(
            "/api/v1/applications/:id",
            get(intake_handlers::handle_get_application),
        )
        // Job mapping maintenance
        .route(
            "/api/v1/job-mappings",
            get(mapping_handlers::handle_list_mappings)
                .put(mapping_handlers::handle_upsert_mapping),
        )
        .with_state(state)
}
