//! Router construction.

use super::handlers::{
    handle_broadcast, handle_intent, handle_metrics, handle_publish, handle_topics, health_check,
};
use super::AppState;
use crate::domain::HubConfig;
use crate::ports::inbound::HubApi;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the hub router.
///
/// Intent forms and publish bodies get separate size limits; a publish body
/// over `limits.max_payload_bytes` is answered with 413.
pub fn build_router(hub: Arc<dyn HubApi>, config: &HubConfig) -> Router {
    let state = AppState {
        hub,
        default_content_type: config.distribution.default_content_type.clone(),
    };

    let form_limit = DefaultBodyLimit::max(config.limits.max_form_bytes);
    let payload_limit = DefaultBodyLimit::max(config.limits.max_payload_bytes);

    let middleware = ServiceBuilder::new().layer(TraceLayer::new_for_http());

    Router::new()
        .route(
            "/",
            get(handle_intent)
                .post(handle_intent)
                .layer(form_limit),
        )
        .route("/publish", post(handle_publish).layer(payload_limit))
        .route("/publish/all", post(handle_broadcast).layer(payload_limit))
        .route("/health", get(health_check))
        .route("/metrics", get(handle_metrics))
        .route("/topics", get(handle_topics))
        .layer(middleware)
        .with_state(state)
}
