use axum::{routing::get, routing::post, Router};

use crate::app_state::AppState;

pub mod analyze;
pub mod health;
pub mod metrics;

/// API routes, without the middleware stack and the metrics endpoint.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/analyze", post(analyze::submit_analysis))
        .route("/results/{job_id}", get(analyze::get_results))
        .with_state(state)
}
