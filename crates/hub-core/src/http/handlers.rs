//! Request handlers.

use super::AppState;
use crate::domain::{Content, HubError, Intent};
use crate::ports::outbound::params;
use axum::body::Bytes;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

/// `hub.*` fields of an intent, from the form body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct IntentForm {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.topic")]
    pub topic: Option<String>,
    #[serde(rename = "hub.callback")]
    pub callback: Option<String>,
    #[serde(rename = "hub.secret")]
    pub secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishQuery {
    #[serde(rename = "hub.topic")]
    pub topic: Option<String>,
}

/// `GET /` and `POST /`: verify a subscribe or unsubscribe intent.
///
/// Answers only after the handshake has finished and the registry change,
/// if any, is visible.
pub async fn handle_intent(
    State(state): State<AppState>,
    form: Result<Form<IntentForm>, FormRejection>,
) -> Result<impl IntoResponse, HubError> {
    let Form(form) = form.map_err(|e| HubError::InvalidRequest(e.body_text()))?;
    let intent = Intent::parse(
        form.mode.as_deref(),
        form.topic.as_deref(),
        form.callback.as_deref(),
        form.secret.as_deref(),
    )?;
    debug!(mode = %intent.mode, topic = %intent.topic, "Intent received");

    let subscription = state.hub.verify_intent(intent.clone()).await?;

    Ok(Json(serde_json::json!({
        "mode": intent.mode.as_str(),
        "topic": subscription.topic,
        "callback": subscription.callback,
    })))
}

/// `POST /publish?hub.topic=..`: fan the body out to the topic's subscribers.
///
/// Deliveries continue after the response has been sent.
pub async fn handle_publish(
    State(state): State<AppState>,
    query: Result<Query<PublishQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HubError> {
    let Query(query) = query.map_err(|e| HubError::InvalidRequest(e.body_text()))?;
    let topic = query
        .topic
        .filter(|topic| !topic.is_empty())
        .ok_or_else(|| HubError::missing(params::TOPIC))?;

    let content = Content::new(body, content_type(&headers, &state.default_content_type));
    let subscribers = state.hub.subscriber_count(&topic);
    info!(topic = %topic, subscribers, bytes = content.len(), "Publish accepted");

    let hub = state.hub.clone();
    let spawned_topic = topic.clone();
    tokio::spawn(async move {
        hub.publish(&spawned_topic, content).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "topic": topic,
            "subscribers": subscribers,
        })),
    ))
}

/// `POST /publish/all`: fan the body out to every topic.
pub async fn handle_broadcast(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content = Content::new(body, content_type(&headers, &state.default_content_type));
    let topics = state.hub.topics();
    let subscribers: usize = topics.iter().map(|t| t.subscribers).sum();
    info!(topics = topics.len(), subscribers, "Broadcast accepted");

    let hub = state.hub.clone();
    tokio::spawn(async move {
        hub.broadcast(content).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "topics": topics.len(),
            "subscribers": subscribers,
        })),
    )
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "callback-hub",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.metrics_snapshot())
}

pub async fn handle_topics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.topics())
}

/// Declared media type of the publish request, or the configured default.
fn content_type(headers: &HeaderMap, default: &str) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}
