use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::ApiState;

pub fn create_router(state: Arc<ApiState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout));

    Router::new()
        .route("/api/providers", get(handlers::list_providers))
        .route("/api/providers/select", post(handlers::select_provider))
        .route("/api/providers/fallback", get(handlers::fallback_provider))
        .route("/api/messages", post(handlers::record_message))
        .route("/api/integrations", post(handlers::create_integration))
        .route(
            "/api/integrations/:integration_id/active",
            post(handlers::set_integration_active),
        )
        .route(
            "/api/environments/:environment_id/integrations",
            get(handlers::list_integrations),
        )
        .route(
            "/api/environments/:environment_id/usage",
            get(handlers::environment_usage),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(middleware)
}
