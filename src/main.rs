use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use board_panel::app_state::AppState;
use board_panel::config::AppConfig;
use board_panel::routes;
use board_panel::services::{
    crew::CrewClient,
    job_store::JobStore,
    orchestrator::Orchestrator,
    rate_limiter::RateLimiter,
    retry::RetryPolicy,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing board-panel server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("analysis_jobs_total", "Total analysis jobs submitted");
    metrics::describe_counter!("analysis_jobs_completed", "Total analysis jobs completed");
    metrics::describe_counter!("analysis_jobs_failed", "Total analysis jobs that failed");
    metrics::describe_counter!(
        "analysis_rate_limited_retries_total",
        "Backend retries caused by rate-limit or quota rejections"
    );
    metrics::describe_histogram!(
        "analysis_processing_seconds",
        "Time to run an analysis job to a terminal state"
    );
    metrics::describe_histogram!(
        "analysis_weaknesses_extracted",
        "Weaknesses extracted per category per job"
    );

    // Initialize the LLM backend
    tracing::info!(model = %config.groq_model, "Initializing advisor backend");
    let backend = CrewClient::new(&config).expect("Failed to initialize LLM backend client");

    let limiter = RateLimiter::new(config.rate_limit_requests, config.rate_limit_window());
    let policy = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        base_delay: config.retry_base_delay(),
    };

    let orchestrator = Orchestrator::new(
        Arc::new(JobStore::new()),
        Arc::new(limiter),
        Arc::new(backend),
        policy,
    );
    let state = AppState::new(orchestrator);

    let app = Router::new()
        .merge(routes::api_router(state))
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit

    tracing::info!("Starting board-panel on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
